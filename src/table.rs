//! In-memory tabular data: ordered named columns of untyped cells.
//!
//! A [`Table`] is what the loader produces and what every later stage reads.
//! Stages never mutate a table they were handed by reference; they build a new
//! one (see [`crate::pipeline`]).

use std::fmt;

/// A raw spreadsheet value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Cell for an optional number; `None` becomes [`Cell::Empty`].
    pub fn from_number(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    /// Text used for grouping and labels. Whole numbers render without a fraction.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        Cell::from_number(value)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// Column-oriented table. Every column holds exactly `height` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from columns, padding short columns with [`Cell::Empty`].
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let height = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        for column in &mut columns {
            column.cells.resize(height, Cell::Empty);
        }
        Self { columns, height }
    }

    /// Build from a header row and data rows. Headers are trimmed; rows shorter
    /// than the header are padded, extra trailing cells are dropped.
    pub fn from_rows<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = Vec<Cell>>,
    {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column::new(h.as_ref().trim(), Vec::new()))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.cells.push(cells.next().unwrap_or_default());
            }
        }
        Self::from_columns(columns)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of the column with exactly this name. With duplicate names the
    /// last one wins, matching the header index in [`crate::roles`].
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().rposition(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        self.column(name).and_then(|c| c.cells.get(row))
    }

    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    /// Append a column, or replace the cells of an existing column with the
    /// same name. Short inputs are padded with empties.
    pub fn set_column(&mut self, name: &str, mut cells: Vec<Cell>) {
        cells.resize(self.height, Cell::Empty);
        match self.position(name) {
            Some(i) => self.columns[i].cells = cells,
            None => self.columns.push(Column::new(name, cells)),
        }
    }

    /// New table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    indices.iter().map(|&i| c.cells[i].clone()).collect(),
                )
            })
            .collect();
        Table {
            columns,
            height: indices.len(),
        }
    }

    /// New table with only the named columns, in the given order. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Table {
        let columns = names
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect();
        Table {
            columns,
            height: self.height,
        }
    }

    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..self.height.min(n)).collect();
        self.take_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            [" Name ", "PIA"],
            vec![
                vec![Cell::from("A"), Cell::from(10.0)],
                vec![Cell::from("B")],
            ],
        )
    }

    #[test]
    fn test_from_rows_trims_headers_and_pads() {
        let t = sample();
        assert_eq!(t.headers(), vec!["Name", "PIA"]);
        assert_eq!(t.height(), 2);
        assert_eq!(t.cell(1, "PIA"), Some(&Cell::Empty));
    }

    #[test]
    fn test_set_column_appends_then_replaces() {
        let mut t = sample();
        t.set_column("X", vec![Cell::from(1.0)]);
        assert_eq!(t.width(), 3);
        assert_eq!(t.cell(1, "X"), Some(&Cell::Empty));
        t.set_column("X", vec![Cell::from(2.0), Cell::from(3.0)]);
        assert_eq!(t.width(), 3);
        assert_eq!(t.cell(1, "X"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_take_rows_and_select() {
        let t = sample();
        let picked = t.take_rows(&[1, 0]);
        assert_eq!(picked.cell(0, "Name"), Some(&Cell::from("B")));
        let only = t.select(&["PIA", "missing"]);
        assert_eq!(only.headers(), vec!["PIA"]);
        assert_eq!(only.height(), 2);
    }

    #[test]
    fn test_label_formats_whole_numbers() {
        assert_eq!(Cell::Number(3.0).as_label().as_deref(), Some("3"));
        assert_eq!(Cell::Number(2.5).as_label().as_deref(), Some("2.5"));
        assert_eq!(Cell::Empty.as_label(), None);
    }
}
