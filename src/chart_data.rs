//! Prepare chart data from the view table: pick label/value columns, coerce to
//! numbers and drop rows with missing values.

use crate::numeric::{numeric_column, to_number};
use crate::table::Table;
use std::collections::BTreeMap;

const CHART_ROW_LIMIT: usize = 10_000;

/// One bar per row: (label, value). Rows with a missing value are skipped.
pub fn bar_series(table: &Table, label_column: &str, value_column: &str) -> Vec<(String, f64)> {
    let (Some(labels), Some(values)) = (table.column(label_column), table.column(value_column))
    else {
        return Vec::new();
    };
    labels
        .cells
        .iter()
        .zip(&values.cells)
        .filter_map(|(label, value)| {
            to_number(value).map(|v| (label.as_label().unwrap_or_default(), v))
        })
        .take(CHART_ROW_LIMIT)
        .collect()
}

/// PIA/PIM pair per entity, keeping entities where at least one amount is present.
pub struct BudgetPair {
    pub label: String,
    pub initial: Option<f64>,
    pub modified: Option<f64>,
}

pub fn budget_pairs(
    table: &Table,
    label_column: &str,
    initial_column: &str,
    modified_column: &str,
    limit: usize,
) -> Vec<BudgetPair> {
    let Some(labels) = table.column(label_column) else {
        return Vec::new();
    };
    let initial = numeric_column(table, initial_column).unwrap_or_default();
    let modified = numeric_column(table, modified_column).unwrap_or_default();
    labels
        .cells
        .iter()
        .enumerate()
        .map(|(i, label)| BudgetPair {
            label: label.as_label().unwrap_or_default(),
            initial: initial.get(i).copied().flatten(),
            modified: modified.get(i).copied().flatten(),
        })
        .filter(|p| p.initial.is_some() || p.modified.is_some())
        .take(limit)
        .collect()
}

/// Label for rows whose group cell is empty.
pub const UNGROUPED_LABEL: &str = "(Sin tipo)";

/// Scatter points sharing one group value, plotted as one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// (x, y) points for rows where both columns are numeric, split by the value
/// of `group_column`. Groups are ordered by label. Without a group column all
/// points land in a single "(Todos)" group.
pub fn scatter_groups(
    table: &Table,
    x_column: &str,
    y_column: &str,
    group_column: Option<&str>,
) -> Vec<ScatterGroup> {
    let (Some(xs), Some(ys)) = (
        numeric_column(table, x_column),
        numeric_column(table, y_column),
    ) else {
        return Vec::new();
    };
    let groups = group_column.and_then(|name| table.column(name));
    let mut by_label: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    xs.into_iter()
        .zip(ys)
        .enumerate()
        .filter_map(|(i, (x, y))| Some((i, (x?, y?))))
        .take(CHART_ROW_LIMIT)
        .for_each(|(i, point)| {
            let label = match groups {
                Some(column) => column
                    .cells
                    .get(i)
                    .and_then(|cell| cell.as_label())
                    .unwrap_or_else(|| UNGROUPED_LABEL.to_string()),
                None => "(Todos)".to_string(),
            };
            by_label.entry(label).or_default().push(point);
        });
    by_label
        .into_iter()
        .map(|(label, points)| ScatterGroup { label, points })
        .collect()
}

/// Min/max over x and y, widened when degenerate so axes always have a span.
pub fn bounds(points: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    if points.is_empty() {
        return None;
    }
    let fold = |sel: fn(&(f64, f64)) -> f64| {
        points
            .iter()
            .map(sel)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    };
    let widen = |(lo, hi): (f64, f64)| {
        if (hi - lo).abs() < f64::EPSILON {
            [lo - 1.0, hi + 1.0]
        } else {
            [lo, hi]
        }
    };
    Some((widen(fold(|p| p.0)), widen(fold(|p| p.1))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table() -> Table {
        Table::from_rows(
            ["Entidad", "PIA", "PIM"],
            vec![
                vec![Cell::from("A"), Cell::from(10.0), Cell::from(12.0)],
                vec![Cell::from("B"), Cell::Empty, Cell::from("x")],
                vec![Cell::from("C"), Cell::from(5.0), Cell::Empty],
            ],
        )
    }

    #[test]
    fn test_bar_series_skips_missing() {
        assert_eq!(
            bar_series(&table(), "Entidad", "PIA"),
            vec![("A".to_string(), 10.0), ("C".to_string(), 5.0)]
        );
        assert!(bar_series(&table(), "Entidad", "nope").is_empty());
    }

    #[test]
    fn test_budget_pairs() {
        let pairs = budget_pairs(&table(), "Entidad", "PIA", "PIM", 15);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].label, "C");
        assert_eq!(pairs[1].modified, None);
    }

    #[test]
    fn test_scatter_points_and_bounds() {
        let groups = scatter_groups(&table(), "PIM", "PIA", None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].points, vec![(12.0, 10.0)]);
        let (x, y) = bounds(&groups[0].points).unwrap();
        assert_eq!(x, [11.0, 13.0]);
        assert_eq!(y, [9.0, 11.0]);
        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn test_scatter_groups_split_by_type() {
        let table = Table::from_rows(
            ["Tipo", "PIM", "Avance"],
            vec![
                vec![Cell::from("Local"), Cell::from(10.0), Cell::from(80.0)],
                vec![Cell::from("Regional"), Cell::from(20.0), Cell::from(90.0)],
                vec![Cell::Empty, Cell::from(30.0), Cell::from(70.0)],
                vec![Cell::from("Local"), Cell::from(40.0), Cell::from(60.0)],
                vec![Cell::from("Regional"), Cell::Empty, Cell::from(50.0)],
            ],
        );
        let groups = scatter_groups(&table, "PIM", "Avance", Some("Tipo"));
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["(Sin tipo)", "Local", "Regional"]);
        assert_eq!(groups[1].points, vec![(10.0, 80.0), (40.0, 60.0)]);
        assert_eq!(groups[2].points, vec![(20.0, 90.0)]);

        assert!(scatter_groups(&table, "PIM", "nope", Some("Tipo")).is_empty());
    }
}
