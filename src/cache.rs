use color_eyre::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::source::{read_table, DataSource, LoadError, LoadOptions};
use crate::table::Table;

/// Registry of known cache files
const CACHE_FILES: &[&str] = &["budgetui.log"];

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a CacheManager with a custom cache directory (primarily for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// Ensure the cache directory exists
    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Clear all registered cache files
    pub fn clear_all(&self) -> Result<()> {
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    eprintln!("Warning: Could not remove cache file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }
}

/// Identity of a load: where the bytes come from plus the options used to read them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// A file on disk. Modification time and size are part of the key so an
    /// edited file is read again.
    Path {
        path: PathBuf,
        modified: Option<SystemTime>,
        len: u64,
        options: LoadOptions,
    },
    /// In-memory bytes, keyed by content digest.
    Upload {
        name: String,
        digest: String,
        options: LoadOptions,
    },
}

impl SourceKey {
    pub fn for_source(source: &DataSource, options: &LoadOptions) -> Result<Self, LoadError> {
        match source {
            DataSource::Path(path) => {
                let meta = fs::metadata(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        LoadError::NotFound(path.clone())
                    } else {
                        LoadError::Io {
                            path: path.clone(),
                            source: e,
                        }
                    }
                })?;
                Ok(SourceKey::Path {
                    path: path.clone(),
                    modified: meta.modified().ok(),
                    len: meta.len(),
                    options: options.clone(),
                })
            }
            DataSource::Upload { name, bytes } => Ok(SourceKey::Upload {
                name: name.clone(),
                digest: blake3::hash(bytes).to_hex().to_string(),
                options: options.clone(),
            }),
        }
    }
}

/// Memoizes parsed tables by [`SourceKey`]. Tables are shared read-only;
/// callers clone before transforming.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<SourceKey, Arc<Table>>,
    reads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for this source, reading it on a miss.
    /// Failed reads are not cached.
    pub fn load(&mut self, source: &DataSource, options: &LoadOptions) -> Result<Arc<Table>, LoadError> {
        let key = SourceKey::for_source(source, options)?;
        if let Some(table) = self.entries.get(&key) {
            debug!(source = %source, "table cache hit");
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(read_table(source, options)?);
        self.reads += 1;
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Insert an already parsed table.
    pub fn insert(&mut self, key: SourceKey, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.entries.insert(key, Arc::clone(&table));
        table
    }

    /// Number of reads that missed the cache.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_upload_key_is_content_addressed() {
        let options = LoadOptions::default();
        let a = SourceKey::for_source(&DataSource::upload("a.xlsx", b"abc".to_vec()), &options).unwrap();
        let b = SourceKey::for_source(&DataSource::upload("a.xlsx", b"abc".to_vec()), &options).unwrap();
        let c = SourceKey::for_source(&DataSource::upload("a.xlsx", b"abd".to_vec()), &options).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sheet_option_is_part_of_key() {
        let source = DataSource::upload("a.xlsx", b"abc".to_vec());
        let first = SourceKey::for_source(&source, &LoadOptions::default()).unwrap();
        let second =
            SourceKey::for_source(&source, &LoadOptions::default().with_sheet("1")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_path_key_is_not_found() {
        let err = SourceKey::for_source(
            &DataSource::path("no/such/file.xlsx"),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_cached_entry_served_without_reading() {
        let mut cache = TableCache::new();
        let source = DataSource::upload("data.xlsx", b"not really excel".to_vec());
        let options = LoadOptions::default();
        let key = SourceKey::for_source(&source, &options).unwrap();
        cache.insert(key, Table::from_rows(["a"], vec![vec![Cell::from(1.0)]]));

        // The bytes are not a workbook, so only a cache hit can succeed.
        let table = cache.load(&source, &options).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(cache.reads(), 0);
    }

    #[test]
    fn test_failed_read_not_cached() {
        let mut cache = TableCache::new();
        let source = DataSource::upload("bad.xlsx", b"garbage".to_vec());
        assert!(cache.load(&source, &LoadOptions::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_all_removes_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheManager::with_dir(dir.path().to_path_buf());
        manager.ensure_cache_dir().unwrap();
        std::fs::write(manager.cache_file("budgetui.log"), "x").unwrap();
        manager.clear_all().unwrap();
        assert!(!manager.cache_file("budgetui.log").exists());
    }
}
