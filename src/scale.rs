//! Percentage scale detection.
//!
//! Execution percent is stored as 0-100 in some workbooks and as a 0-1 fraction
//! in others. A short sample of the column decides which; fractions are
//! rescaled so the views always see 0-100.

use crate::numeric::coerce;
use crate::table::{Cell, Table};

pub const DEFAULT_SAMPLE_SIZE: usize = 30;
pub const DEFAULT_FRACTION_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOptions {
    /// Number of leading non-missing values inspected.
    pub sample_size: usize,
    /// Share of sampled values inside `[0, 1]` that must be exceeded.
    pub fraction_threshold: f64,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            fraction_threshold: DEFAULT_FRACTION_THRESHOLD,
        }
    }
}

/// True when the leading sample looks like fractions.
pub fn looks_fractional(values: &[Option<f64>], options: &ScaleOptions) -> bool {
    let sample: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .take(options.sample_size)
        .collect();
    if sample.is_empty() {
        return false;
    }
    let inside = sample.iter().filter(|v| (0.0..=1.0).contains(*v)).count();
    (inside as f64 / sample.len() as f64) > options.fraction_threshold
}

/// Rescale `column` by 100 when it looks fractional. Returns the table and
/// whether it was rescaled. An unknown column leaves the table untouched.
pub fn normalize_percent(mut table: Table, column: &str, options: &ScaleOptions) -> (Table, bool) {
    let Some(values) = table.column(column).map(|c| coerce(&c.cells)) else {
        return (table, false);
    };
    if !looks_fractional(&values, options) {
        return (table, false);
    }
    let scaled: Vec<Cell> = values
        .into_iter()
        .map(|v| Cell::from_number(v.map(|x| x * 100.0)))
        .collect();
    table.set_column(column, scaled);
    (table, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> Table {
        Table::from_rows(
            ["Avance"],
            values.iter().map(|v| vec![Cell::from(*v)]).collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_mostly_fractions_rescaled() {
        // 25 of 30 in [0, 1] is 83%.
        let mut values = vec![0.5; 25];
        values.extend([50.0; 5]);
        let (out, scaled) = normalize_percent(column(&values), "Avance", &ScaleOptions::default());
        assert!(scaled);
        assert_eq!(out.cell(0, "Avance"), Some(&Cell::Number(50.0)));
        assert_eq!(out.cell(29, "Avance"), Some(&Cell::Number(5000.0)));
    }

    #[test]
    fn test_half_fractions_unchanged() {
        let mut values = vec![0.5; 15];
        values.extend([50.0; 15]);
        let table = column(&values);
        let (out, scaled) = normalize_percent(table.clone(), "Avance", &ScaleOptions::default());
        assert!(!scaled);
        assert_eq!(out, table);
    }

    #[test]
    fn test_exactly_threshold_is_not_enough() {
        let mut values = vec![1.0; 7];
        values.extend([80.0; 3]);
        assert!(!looks_fractional(
            &values.into_iter().map(Some).collect::<Vec<_>>(),
            &ScaleOptions::default()
        ));
    }

    #[test]
    fn test_sample_skips_missing_and_stops_at_limit() {
        let mut values: Vec<Option<f64>> = vec![None; 10];
        values.extend(std::iter::repeat(Some(0.9)).take(30));
        values.extend(std::iter::repeat(Some(90.0)).take(100));
        assert!(looks_fractional(&values, &ScaleOptions::default()));
    }

    #[test]
    fn test_empty_sample_unchanged() {
        let table = Table::from_rows(["Avance"], vec![vec![Cell::from("n/a")], vec![Cell::Empty]]);
        let (_, scaled) = normalize_percent(table, "Avance", &ScaleOptions::default());
        assert!(!scaled);
    }

    #[test]
    fn test_text_cells_become_missing_when_rescaled() {
        let table = Table::from_rows(
            ["Avance"],
            vec![
                vec![Cell::from(0.25)],
                vec![Cell::from("-")],
                vec![Cell::from("0.5")],
            ],
        );
        let (out, scaled) = normalize_percent(table, "Avance", &ScaleOptions::default());
        assert!(scaled);
        assert_eq!(out.cell(1, "Avance"), Some(&Cell::Empty));
        assert_eq!(out.cell(2, "Avance"), Some(&Cell::Number(50.0)));
    }
}
