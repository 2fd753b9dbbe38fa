//! Export the current view as delimited text.

use color_eyre::Result;
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::numeric::to_number;
use crate::table::{Cell, Column, Table};
use crate::CompressionFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub include_header: bool,
    pub compression: Option<CompressionFormat>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
            compression: None,
        }
    }
}

fn unique_name(name: &str, seen: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut n = 1;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{}_{}", name, n);
        n += 1;
    }
    candidate
}

fn column_to_series(name: &str, column: &Column) -> Series {
    let present = || column.cells.iter().filter(|c| !c.is_empty());
    if present().all(|c| matches!(c, Cell::Number(_))) {
        let v: Vec<Option<f64>> = column.cells.iter().map(to_number).collect();
        Series::new(name.into(), v)
    } else if present().all(|c| matches!(c, Cell::Bool(_))) {
        let v: Vec<Option<bool>> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        Series::new(name.into(), v)
    } else {
        let v: Vec<Option<String>> = column.cells.iter().map(Cell::as_label).collect();
        Series::new(name.into(), v)
    }
}

/// Convert to a DataFrame. Numeric-only columns become Float64, boolean-only
/// columns Boolean, everything else String. Duplicate names get a `_n` suffix.
pub fn to_dataframe(table: &Table) -> DataFrame {
    let mut seen = HashSet::new();
    table
        .columns()
        .iter()
        .map(|c| column_to_series(&unique_name(&c.name, &mut seen), c))
        .collect()
}

/// Write the table as delimited text to any writer.
pub fn write_delimited<W: Write>(table: &Table, writer: W, options: &ExportOptions) -> Result<()> {
    let mut df = to_dataframe(table);
    CsvWriter::new(writer)
        .with_separator(options.delimiter)
        .include_header(options.include_header)
        .finish(&mut df)?;
    Ok(())
}

/// Path actually written: the compression extension is appended when missing.
pub fn output_path(path: &Path, compression: Option<CompressionFormat>) -> PathBuf {
    match compression {
        Some(c) if CompressionFormat::from_extension(path) != Some(c) => {
            let mut s = path.as_os_str().to_os_string();
            s.push(".");
            s.push(c.extension());
            PathBuf::from(s)
        }
        _ => path.to_path_buf(),
    }
}

/// Write the table to a file, optionally compressed. Returns the path written.
pub fn export_table(table: &Table, path: &Path, options: &ExportOptions) -> Result<PathBuf> {
    let path = output_path(path, options.compression);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;
    match options.compression {
        Some(compression) => {
            let writer: Box<dyn Write> = match compression {
                CompressionFormat::Gzip => Box::new(flate2::write::GzEncoder::new(
                    file,
                    flate2::Compression::default(),
                )),
                CompressionFormat::Zstd => Box::new(zstd::Encoder::new(file, 0)?.auto_finish()),
                CompressionFormat::Bzip2 => Box::new(bzip2::write::BzEncoder::new(
                    file,
                    bzip2::Compression::default(),
                )),
                CompressionFormat::Xz => Box::new(xz2::write::XzEncoder::new(
                    file, 6, // compression level
                )),
            };
            write_delimited(table, writer, options)?;
        }
        None => write_delimited(table, BufWriter::new(file), options)?,
    }
    info!(path = %path.display(), rows = table.height(), "exported view");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn table() -> Table {
        Table::from_rows(
            ["Entidad", "PIM", "Entidad"],
            vec![
                vec![Cell::from("Lima"), Cell::from(10.0), Cell::from("x")],
                vec![Cell::from("Cusco"), Cell::Empty, Cell::from("y")],
            ],
        )
    }

    #[test]
    fn test_to_dataframe_types_and_names() {
        let df = to_dataframe(&table());
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Entidad", "PIM", "Entidad_1"]);
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("PIM").unwrap().dtype(),
            &polars::prelude::DataType::Float64
        );
    }

    #[test]
    fn test_write_delimited_with_semicolon() {
        let mut buf = Vec::new();
        let options = ExportOptions {
            delimiter: b';',
            ..ExportOptions::default()
        };
        write_delimited(&table(), &mut buf, &options).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Entidad;PIM;Entidad_1"));
        assert!(lines.next().unwrap().starts_with("Lima;10"));
        assert!(lines.next().unwrap().starts_with("Cusco;;y"));
    }

    #[test]
    fn test_without_header() {
        let mut buf = Vec::new();
        let options = ExportOptions {
            include_header: false,
            ..ExportOptions::default()
        };
        write_delimited(&table(), &mut buf, &options).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("Lima,"));
    }

    #[test]
    fn test_output_path_appends_extension() {
        assert_eq!(
            output_path(Path::new("out.csv"), Some(CompressionFormat::Gzip)),
            PathBuf::from("out.csv.gz")
        );
        assert_eq!(
            output_path(Path::new("out.csv.gz"), Some(CompressionFormat::Gzip)),
            PathBuf::from("out.csv.gz")
        );
        assert_eq!(output_path(Path::new("out.csv"), None), PathBuf::from("out.csv"));
    }

    #[test]
    fn test_export_gzip_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            compression: Some(CompressionFormat::Gzip),
            ..ExportOptions::default()
        };
        let written = export_table(&table(), &dir.path().join("view.csv"), &options).unwrap();
        assert!(written.ends_with("view.csv.gz"));
        let mut text = String::new();
        flate2::read::GzDecoder::new(File::open(&written).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.starts_with("Entidad,PIM,Entidad_1"));
    }
}
