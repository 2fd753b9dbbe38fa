//! Queries the dashboard runs over the augmented table: filter, sort, top-N
//! and the column choices each tab makes. Every function returns a new table.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::metrics::{GROWTH_COLUMN, PER_CAPITA_COLUMN};
use crate::numeric::to_number;
use crate::pipeline::Augmented;
use crate::roles::Role;
use crate::table::{Cell, Table};

/// Selector entry meaning "no filter".
pub const ALL_FILTER: &str = "(Todos)";

/// Sorted distinct labels of a column, missing values excluded.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .map(|c| {
            c.cells
                .iter()
                .filter_map(Cell::as_label)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

/// Options offered by the filter selector: [`ALL_FILTER`] then the distinct values.
pub fn filter_options(table: &Table, column: Option<&str>) -> Vec<String> {
    let mut options = vec![ALL_FILTER.to_string()];
    if let Some(column) = column {
        options.extend(distinct_values(table, column));
    }
    options
}

/// Rows whose label in `column` equals `value`.
pub fn filter_equals(table: &Table, column: &str, value: &str) -> Table {
    let Some(col) = table.column(column) else {
        return table.take_rows(&[]);
    };
    let indices: Vec<usize> = col
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_label().as_deref() == Some(value))
        .map(|(i, _)| i)
        .collect();
    table.take_rows(&indices)
}

/// Apply an optional selection; `None` or [`ALL_FILTER`] keeps every row.
pub fn apply_filter(table: &Table, column: Option<&str>, selection: Option<&str>) -> Table {
    match (column, selection) {
        (Some(column), Some(value)) if value != ALL_FILTER => filter_equals(table, column, value),
        _ => table.clone(),
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

fn sort_key(cell: &Cell) -> SortKey {
    if let Some(n) = to_number(cell) {
        return SortKey::Number(n);
    }
    match cell.as_label() {
        Some(label) if !label.trim().is_empty() => SortKey::Text(label),
        _ => SortKey::Missing,
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, descending: bool) -> Ordering {
    let directed = |o: Ordering| if descending { o.reverse() } else { o };
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => directed(x.total_cmp(y)),
        (SortKey::Text(x), SortKey::Text(y)) => directed(x.cmp(y)),
        (SortKey::Number(_), _) => Ordering::Less,
        (_, SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(_), SortKey::Missing) => Ordering::Less,
        (SortKey::Missing, SortKey::Text(_)) => Ordering::Greater,
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
    }
}

/// Stable sort by one column. Numbers come first, then text, missing values last
/// in either direction. An unknown column leaves the order unchanged.
pub fn sort_by(table: &Table, column: &str, descending: bool) -> Table {
    let Some(col) = table.column(column) else {
        return table.clone();
    };
    let keys: Vec<SortKey> = col.cells.iter().map(sort_key).collect();
    let mut indices: Vec<usize> = (0..table.height()).collect();
    indices.sort_by(|&a, &b| compare_keys(&keys[a], &keys[b], descending));
    table.take_rows(&indices)
}

pub fn sort_descending(table: &Table, column: &str) -> Table {
    sort_by(table, column, true)
}

pub fn top_n(table: &Table, n: usize) -> Table {
    table.head(n)
}

/// Metric the ranking tab sorts by: total score, else execution percent, else PIM.
pub fn ranking_metric(augmented: &Augmented) -> Option<(Role, &str)> {
    augmented.roles.first_of(&[
        Role::TotalScore,
        Role::ExecutionPercent,
        Role::ModifiedBudget,
    ])
}

/// Column used to label rows: entity, else rank, else the first column.
pub fn label_column(augmented: &Augmented) -> Option<String> {
    augmented
        .roles
        .first_of(&[Role::Entity, Role::Rank])
        .map(|(_, header)| header.to_string())
        .or_else(|| augmented.table.headers().into_iter().next())
}

/// Sorted top-N rows for the ranking tab.
pub fn ranking(augmented: &Augmented, data: &Table, n: usize) -> Table {
    match ranking_metric(augmented) {
        Some((_, metric)) => top_n(&sort_descending(data, metric), n),
        None => top_n(data, n),
    }
}

/// Columns of the exploratory tab, in display order and without duplicates.
/// Falls back to the first eight columns when none of them exist.
pub fn exploratory_columns(augmented: &Augmented, data: &Table) -> Vec<String> {
    let label = label_column(augmented);
    let candidates = [
        label.as_deref(),
        augmented.column(Role::Rank),
        augmented.column(Role::TotalScore),
        augmented.column(Role::Population),
        Some(PER_CAPITA_COLUMN),
        Some(GROWTH_COLUMN),
    ];
    let mut columns: Vec<String> = Vec::new();
    for name in candidates.into_iter().flatten() {
        if data.contains(name) && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    if columns.is_empty() {
        columns = data.headers().into_iter().take(8).collect();
    }
    columns
}

/// Exploratory table: selected columns sorted ascending by rank when present
/// (otherwise by the first selected column), limited to `limit` rows.
pub fn exploratory(augmented: &Augmented, data: &Table, limit: usize) -> Table {
    let columns = exploratory_columns(augmented, data);
    let names: Vec<&str> = columns.iter().map(String::as_str).collect();
    let selected = data.select(&names);
    let sort_col = augmented
        .column(Role::Rank)
        .filter(|rank| columns.iter().any(|c| c == rank))
        .map(str::to_string)
        .or_else(|| columns.first().cloned());
    let sorted = match sort_col {
        Some(col) => sort_by(&selected, &col, false),
        None => selected,
    };
    top_n(&sorted, limit)
}

/// Columns of the PIA vs PIM table; empty when either budget role is missing.
pub fn comparison_columns(augmented: &Augmented) -> Vec<String> {
    let (Some(pia), Some(pim)) = (
        augmented.column(Role::InitialBudget),
        augmented.column(Role::ModifiedBudget),
    ) else {
        return Vec::new();
    };
    let mut columns: Vec<String> = Vec::new();
    let label = label_column(augmented);
    for name in [
        label.as_deref(),
        Some(pia),
        Some(pim),
        Some(GROWTH_COLUMN),
        Some(PER_CAPITA_COLUMN),
    ]
    .into_iter()
    .flatten()
    {
        if augmented.table.contains(name) && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

/// `"crec_pim_vs_pia"` → `"Crec Pim Vs Pia"`.
pub fn to_title(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
