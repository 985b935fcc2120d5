use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File contents read during one bump operation, keyed by path.
///
/// Discovery and mutation read the same manifests; the cache keeps them
/// from being read twice and sees its own writes. Owned by a single run
/// and cleared between runs.
#[derive(Debug, Default)]
pub struct ManifestCache {
    contents: HashMap<PathBuf, String>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the file contents, reading from disk on first access
    pub fn read(&mut self, path: &Path) -> Result<&str> {
        let content = match self.contents.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::trace!(path = %path.display(), "reading manifest");
                entry.insert(fs::read_to_string(path)?)
            }
        };
        Ok(content.as_str())
    }

    /// Write new contents to disk and remember them
    pub fn write(&mut self, path: &Path, content: String) -> Result<()> {
        fs::write(path, &content)?;
        self.contents.insert(path.to_path_buf(), content);
        Ok(())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.contents.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn clear(&mut self) {
        self.contents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_is_cached_until_cleared() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "1.0.0").unwrap();

        let mut cache = ManifestCache::new();
        assert_eq!(cache.read(&path).unwrap(), "1.0.0");

        fs::write(&path, "2.0.0").unwrap();
        assert_eq!(cache.read(&path).unwrap(), "1.0.0");

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.read(&path).unwrap(), "2.0.0");
    }

    #[test]
    fn test_write_updates_disk_and_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "1.0.0").unwrap();

        let mut cache = ManifestCache::new();
        cache.write(&path, "3.0.0".to_string()).unwrap();

        assert!(cache.contains(&path));
        assert_eq!(cache.read(&path).unwrap(), "3.0.0");
        assert_eq!(fs::read_to_string(&path).unwrap(), "3.0.0");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut cache = ManifestCache::new();
        let err = cache.read(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("I/O error"));
        assert_eq!(cache.len(), 0);
    }
}
