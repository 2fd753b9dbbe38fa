//! Derived budget metrics.
//!
//! Both columns are always materialized so the views can reference them
//! unconditionally: when a prerequisite role is unresolved the column exists
//! and every value is missing.

use crate::numeric::numeric_or_missing;
use crate::roles::{ResolvedRoles, Role};
use crate::table::{Cell, Table};

/// Growth of the modified budget over the initial budget, in percent.
pub const GROWTH_COLUMN: &str = "Crec_PIM_vs_PIA_%";
/// Modified budget per inhabitant.
pub const PER_CAPITA_COLUMN: &str = "PIM_per_cápita";

/// `(pim / pia - 1) * 100` when `pia > 0` and `pim` is present.
pub fn growth_ratio(pia: Option<f64>, pim: Option<f64>) -> Option<f64> {
    match (pia, pim) {
        (Some(pia), Some(pim)) if pia > 0.0 => Some((pim / pia - 1.0) * 100.0),
        _ => None,
    }
}

/// `pim / population` when `population > 0` and `pim` is present.
pub fn per_capita(pim: Option<f64>, population: Option<f64>) -> Option<f64> {
    match (pim, population) {
        (Some(pim), Some(pop)) if pop > 0.0 => Some(pim / pop),
        _ => None,
    }
}

fn combine(
    table: &Table,
    left: Option<&str>,
    right: Option<&str>,
    f: impl Fn(Option<f64>, Option<f64>) -> Option<f64>,
) -> Vec<Cell> {
    if left.is_none() || right.is_none() {
        return vec![Cell::Empty; table.height()];
    }
    let l = numeric_or_missing(table, left);
    let r = numeric_or_missing(table, right);
    l.into_iter()
        .zip(r)
        .map(|(a, b)| Cell::from_number(f(a, b)))
        .collect()
}

/// Growth ratio cells for every row.
pub fn growth_column(table: &Table, roles: &ResolvedRoles) -> Vec<Cell> {
    combine(
        table,
        roles.get(Role::InitialBudget),
        roles.get(Role::ModifiedBudget),
        growth_ratio,
    )
}

/// Per-capita cells for every row.
pub fn per_capita_column(table: &Table, roles: &ResolvedRoles) -> Vec<Cell> {
    combine(
        table,
        roles.get(Role::ModifiedBudget),
        roles.get(Role::Population),
        per_capita,
    )
}

/// Append (or overwrite) both derived columns on a working table.
pub fn derive_metrics(mut table: Table, roles: &ResolvedRoles) -> Table {
    let growth = growth_column(&table, roles);
    let per_capita = per_capita_column(&table, roles);
    table.set_column(GROWTH_COLUMN, growth);
    table.set_column(PER_CAPITA_COLUMN, per_capita);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_ratio() {
        assert_eq!(growth_ratio(Some(100.0), Some(150.0)), Some(50.0));
        assert_eq!(growth_ratio(Some(0.0), Some(150.0)), None);
        assert_eq!(growth_ratio(Some(-5.0), Some(150.0)), None);
        assert_eq!(growth_ratio(Some(100.0), None), None);
        assert_eq!(growth_ratio(None, Some(1.0)), None);
    }

    #[test]
    fn test_per_capita() {
        assert_eq!(per_capita(Some(200000.0), Some(1000.0)), Some(200.0));
        assert_eq!(per_capita(Some(200000.0), Some(0.0)), None);
        assert_eq!(per_capita(None, Some(10.0)), None);
    }

    #[test]
    fn test_unresolved_role_gives_all_missing_column() {
        let table = Table::from_rows(
            ["PIM"],
            vec![vec![Cell::from(1.0)], vec![Cell::from(2.0)]],
        );
        let mut roles = ResolvedRoles::default();
        roles.insert(Role::ModifiedBudget, "PIM");
        let out = derive_metrics(table, &roles);
        assert_eq!(
            out.column(GROWTH_COLUMN).map(|c| c.cells.clone()),
            Some(vec![Cell::Empty, Cell::Empty])
        );
        assert!(out.contains(PER_CAPITA_COLUMN));
    }

    #[test]
    fn test_bad_cells_become_missing() {
        let table = Table::from_rows(
            ["PIA", "PIM"],
            vec![
                vec![Cell::from(100.0), Cell::from("abc")],
                vec![Cell::from("100"), Cell::from(110.0)],
            ],
        );
        let mut roles = ResolvedRoles::default();
        roles.insert(Role::InitialBudget, "PIA");
        roles.insert(Role::ModifiedBudget, "PIM");
        let cells = growth_column(&table, &roles);
        assert_eq!(cells[0], Cell::Empty);
        match cells[1] {
            Cell::Number(v) => assert!((v - 10.0).abs() < 1e-9),
            ref other => panic!("expected number, got {:?}", other),
        }
    }
}
