//! Numeric coercion of raw cells. Never fails: anything that is not a finite
//! number becomes `None`.

use crate::table::{Cell, Table};

/// Coerce one cell to a number.
pub fn to_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Coerce every cell of a slice.
pub fn coerce(cells: &[Cell]) -> Vec<Option<f64>> {
    cells.iter().map(to_number).collect()
}

/// Coerce a named column. Unknown column yields `None`.
pub fn numeric_column(table: &Table, name: &str) -> Option<Vec<Option<f64>>> {
    table.column(name).map(|c| coerce(&c.cells))
}

/// Coerce an optional (role-resolved) column; an unresolved column is all-missing.
pub fn numeric_or_missing(table: &Table, name: Option<&str>) -> Vec<Option<f64>> {
    name.and_then(|n| numeric_column(table, n))
        .unwrap_or_else(|| vec![None; table.height()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_variants() {
        assert_eq!(to_number(&Cell::Number(1.5)), Some(1.5));
        assert_eq!(to_number(&Cell::from(" 42 ")), Some(42.0));
        assert_eq!(to_number(&Cell::from("1,200")), None);
        assert_eq!(to_number(&Cell::from("n/a")), None);
        assert_eq!(to_number(&Cell::from("")), None);
        assert_eq!(to_number(&Cell::from("NaN")), None);
        assert_eq!(to_number(&Cell::Number(f64::INFINITY)), None);
        assert_eq!(to_number(&Cell::Bool(true)), None);
        assert_eq!(to_number(&Cell::Empty), None);
    }

    #[test]
    fn test_coerce_marks_exactly_bad_positions_missing() {
        let cells = vec![
            Cell::from(1.0),
            Cell::Empty,
            Cell::from("3.25"),
            Cell::from("x"),
            Cell::from(-4.0),
        ];
        assert_eq!(
            coerce(&cells),
            vec![Some(1.0), None, Some(3.25), None, Some(-4.0)]
        );
    }

    #[test]
    fn test_numeric_or_missing_for_unresolved_role() {
        let t = Table::from_rows(["a"], vec![vec![Cell::from(1.0)], vec![Cell::Empty]]);
        assert_eq!(numeric_or_missing(&t, None), vec![None, None]);
        assert_eq!(numeric_or_missing(&t, Some("a")), vec![Some(1.0), None]);
        assert_eq!(numeric_or_missing(&t, Some("zzz")), vec![None, None]);
    }
}
