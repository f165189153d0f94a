//! Memoized dataset cache keyed by source path.

use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::loader::{self, LoadError};

/// Process-lifetime memoization of loaded datasets.
///
/// Owned by the application and passed where needed rather than living in
/// module-level state. Entries are shared read-only (`Arc<DataFrame>`) and
/// never mutated after insertion; a failed load leaves no entry behind.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<DataFrame>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached frame for a path, if present.
    pub fn get(&self, path: &Path) -> Option<Arc<DataFrame>> {
        self.entries.get(path).map(Arc::clone)
    }

    /// Return the cached frame for `path`, loading (and caching) it on the
    /// first call. Errors are not cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<DataFrame>, LoadError> {
        if let Some(df) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(df));
        }
        let df = Arc::new(loader::load_dataset(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&df));
        Ok(df)
    }

    /// Insert an already-loaded frame (used by the async load path).
    pub fn insert(&mut self, path: PathBuf, df: DataFrame) -> Arc<DataFrame> {
        let df = Arc::new(df);
        self.entries.insert(path, Arc::clone(&df));
        df
    }

    /// Drop the entry for a path so the next access re-reads the file.
    pub fn invalidate(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            log::debug!("invalidated cache entry for {}", path.display());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_repeated_load_returns_cached_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "Departamento,Valor\nAntioquia,10.0\n");

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "Departamento,Valor\nAntioquia,10.0\n");

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        cache.invalidate(&path);
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.height(), second.height());
    }

    #[test]
    fn test_failed_load_caches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such.csv");

        let mut cache = DatasetCache::new();
        assert!(cache.get_or_load(&missing).is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&missing).is_none());
    }
}
