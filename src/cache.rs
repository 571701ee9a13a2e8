//! Caller-owned table cache.
//!
//! Uploaded tables are keyed by a digest of their file name and content so
//! that re-uploading the same file reuses the parsed table and any options
//! saved for it. The pipeline never sees the cache; callers look tables up
//! here and pass them in.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::data::loader::load_table;
use crate::data::model::Table;
use crate::export::{delimited, ExportSource};
use crate::options::SavedOptions;

/// Content digest identifying a cached table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CachedTable {
    pub file_name: String,
    pub table: Arc<Table>,
    pub options: Option<SavedOptions>,
}

/// In-memory cache, optionally backed by a directory holding
/// `<key>.csv` and `<key>_options.json` files.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<CacheKey, CachedTable>,
    order: Vec<CacheKey>,
    dir: Option<PathBuf>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that also writes through to `dir`, creating it if needed.
    pub fn persistent(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
        Ok(Self {
            dir: Some(dir),
            ..Self::default()
        })
    }

    /// Add a table and return its key. Inserting the same file name and
    /// content again returns the existing key and keeps saved options.
    pub fn insert(&mut self, file_name: &str, table: Table) -> Result<CacheKey> {
        let csv = delimited::encode(ExportSource::Flat(&table)).context("encoding table for cache")?;
        let key = digest(file_name, &csv);

        if self.entries.contains_key(&key) {
            debug!("cache hit for {file_name} ({key})");
            return Ok(key);
        }

        if let Some(path) = self.table_path(&key) {
            if !path.exists() {
                std::fs::write(&path, &csv)
                    .with_context(|| format!("writing cached table {}", path.display()))?;
            }
        }
        let options = self.read_options(&key)?;

        debug!("cached {file_name} as {key}");
        self.entries.insert(
            key.clone(),
            CachedTable {
                file_name: file_name.to_string(),
                table: Arc::new(table),
                options,
            },
        );
        self.order.push(key.clone());
        Ok(key)
    }

    /// Look a table up, falling back to the cache directory on a miss.
    /// The file name is not stored on disk, so a table revived from disk
    /// carries its key as its name.
    pub fn get(&mut self, key: &CacheKey) -> Result<Option<Arc<Table>>> {
        if let Some(entry) = self.entries.get(key) {
            return Ok(Some(Arc::clone(&entry.table)));
        }
        let Some(path) = self.table_path(key) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read(&path)
            .with_context(|| format!("reading cached table {}", path.display()))?;
        let table = Arc::new(
            load_table(&raw).with_context(|| format!("parsing cached table {}", path.display()))?,
        );
        let options = self.read_options(key)?;
        self.entries.insert(
            key.clone(),
            CachedTable {
                file_name: key.to_string(),
                table: Arc::clone(&table),
                options,
            },
        );
        self.order.push(key.clone());
        Ok(Some(table))
    }

    pub fn file_name(&self, key: &CacheKey) -> Option<&str> {
        self.entries.get(key).map(|e| e.file_name.as_str())
    }

    pub fn options(&self, key: &CacheKey) -> Option<&SavedOptions> {
        self.entries.get(key).and_then(|e| e.options.as_ref())
    }

    /// Remember options for a cached table. Returns `false` if the key is
    /// unknown.
    pub fn save_options(&mut self, key: &CacheKey, options: SavedOptions) -> Result<bool> {
        let path = self.options_path(key);
        let Some(entry) = self.entries.get_mut(key) else {
            warn!("cannot save options: no cached table for {key}");
            return Ok(false);
        };
        if let Some(path) = path {
            options.save(&path)?;
        }
        entry.options = Some(options);
        Ok(true)
    }

    /// Cached entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&CacheKey, &CachedTable)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|e| (k, e)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn table_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{key}.csv")))
    }

    fn options_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{key}_options.json")))
    }

    fn read_options(&self, key: &CacheKey) -> Result<Option<SavedOptions>> {
        match self.options_path(key) {
            Some(path) if path.exists() => SavedOptions::load(&path).map(Some),
            _ => Ok(None),
        }
    }
}

/// 64-bit FNV-1a over the file name, a NUL separator and the CSV text.
/// Keys name files on disk, so the algorithm must not change.
fn digest(file_name: &str, csv: &[u8]) -> CacheKey {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = file_name
        .as_bytes()
        .iter()
        .chain(&[0u8])
        .chain(csv)
        .fold(OFFSET_BASIS, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME));
    CacheKey(format!("{hash:016x}"))
}
