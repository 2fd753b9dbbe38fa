//! Spreadsheet loading.
//!
//! Reads the first (or a chosen) worksheet of an Excel workbook into a
//! [`Table`] with trimmed headers. A workbook comes either from a path or from
//! bytes already in memory (the path prompt on the no-data screen reads the
//! file itself so a replaced file is picked up by content).

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TableCache;
use crate::table::{Cell, Table};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Excel: {name}: {source}")]
    Workbook {
        name: String,
        #[source]
        source: calamine::Error,
    },
    #[error("Excel file has no worksheets: {0}")]
    NoWorksheets(String),
    #[error("Excel: no sheet '{sheet}' in {name}")]
    SheetNotFound { name: String, sheet: String },
    #[error("no data source configured")]
    NoSource,
}

/// Where a table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Upload { name: String, bytes: Arc<[u8]> },
}

impl DataSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DataSource::Path(path.into())
    }

    pub fn upload(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        DataSource::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file into memory and treat it as an upload.
    pub fn upload_from_file(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::upload(name, bytes))
    }

    pub fn name(&self) -> String {
        match self {
            DataSource::Path(p) => p.display().to_string(),
            DataSource::Upload { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Upload { name, .. } => write!(f, "upload: {}", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// 0-based sheet index or sheet name. First sheet when `None`.
    pub sheet: Option<String>,
}

impl LoadOptions {
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// Read a source without caching.
pub fn read_table(source: &DataSource, options: &LoadOptions) -> Result<Table, LoadError> {
    let name = source.name();
    match source {
        DataSource::Path(path) => {
            if !path.exists() {
                return Err(LoadError::NotFound(path.clone()));
            }
            let workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
                name: name.clone(),
                source,
            })?;
            read_workbook(workbook, &name, options)
        }
        DataSource::Upload { bytes, .. } => {
            let cursor = Cursor::new(bytes.to_vec());
            let workbook =
                open_workbook_auto_from_rs(cursor).map_err(|source| LoadError::Workbook {
                    name: name.clone(),
                    source,
                })?;
            read_workbook(workbook, &name, options)
        }
    }
}

fn read_workbook<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    name: &str,
    options: &LoadOptions,
) -> Result<Table, LoadError> {
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::NoWorksheets(name.to_string()));
    }
    let not_found = |sheet: &str| LoadError::SheetNotFound {
        name: name.to_string(),
        sheet: sheet.to_string(),
    };
    let sheet = match options.sheet.as_deref() {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => sheet_names.get(idx).cloned().ok_or_else(|| not_found(sel))?,
            Err(_) => sheet_names
                .iter()
                .find(|s| s.as_str() == sel)
                .cloned()
                .ok_or_else(|| not_found(sel))?,
        },
        None => sheet_names[0].clone(),
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| LoadError::Workbook {
            name: name.to_string(),
            source,
        })?;
    let table = table_from_range(&range);
    debug!(
        source = name,
        sheet = %sheet,
        rows = table.height(),
        columns = table.width(),
        "read worksheet"
    );
    Ok(table)
}

/// Convert a worksheet range to a table; the first row holds the headers.
pub fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Table::empty();
    };
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = match cell_from_data(cell) {
                Cell::Empty => String::new(),
                other => other.to_string(),
            };
            if text.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                text
            }
        })
        .collect();
    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Table::from_rows(headers, body)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Try each path in order through the cache; the first one that loads wins.
/// When none loads, the last error is returned.
pub fn load_first_available(
    paths: &[PathBuf],
    options: &LoadOptions,
    cache: &mut TableCache,
) -> Result<(Arc<Table>, DataSource), LoadError> {
    let mut last_err = LoadError::NoSource;
    for path in paths {
        let source = DataSource::Path(path.clone());
        match cache.load(&source, options) {
            Ok(table) => {
                info!(source = %source, rows = table.height(), "loaded data");
                return Ok((table, source));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load");
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Lines describing the contents of `roots`, shown when nothing could be loaded.
pub fn diagnostic_listing(roots: &[&Path]) -> Vec<String> {
    let mut out = Vec::new();
    for root in roots {
        match std::fs::read_dir(root) {
            Ok(entries) => {
                let display = root
                    .canonicalize()
                    .unwrap_or_else(|_| root.to_path_buf());
                out.push(format!("{}/", display.display()));
                let mut names: Vec<String> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                names.sort();
                out.extend(names.into_iter().map(|n| format!(" ├─ {}", n)));
            }
            Err(_) => out.push(format!("(missing directory) {}", root.display())),
        }
    }
    out
}
