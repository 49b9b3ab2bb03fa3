use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Durable storage for named cache records as JSON files.
///
/// Records are written atomically (temp file + rename) so a crash
/// mid-write leaves the previous record intact. Loads never fail the
/// caller: a missing or corrupt record reads as `None` and the cache
/// starts cold.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    cache_dir: PathBuf,
}

impl CacheStorage {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.record_path(name);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(record = name, error = %e, "Failed to read cache record");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(data) => Some(data),
            Err(e) => {
                // A corrupt record cold-starts the cache rather than failing the app
                debug!(record = name, error = %e, "Failed to parse cache record");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.record_path(name);
        let temp_path = self.cache_dir.join(format!("{}.json.tmp", name));

        let contents = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize cache record: {}", name))?;

        std::fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write cache record: {}", name))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace cache record: {}", name))?;

        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.record_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache record: {}", name))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, CacheStorage) {
        let temp = TempDir::new().expect("temp dir");
        let storage = CacheStorage::new(temp.path().to_path_buf()).expect("storage");
        (temp, storage)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_temp, storage) = storage();
        storage.save("numbers", &vec![1, 2, 3]).expect("save");

        let loaded: Option<Vec<i32>> = storage.load("numbers");
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_load_missing_record() {
        let (_temp, storage) = storage();
        let loaded: Option<Vec<i32>> = storage.load("absent");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_record_loads_as_none() {
        let (temp, storage) = storage();
        std::fs::write(temp.path().join("broken.json"), "{not json").expect("write");

        let loaded: Option<Vec<i32>> = storage.load("broken");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_replaces_existing_record() {
        let (temp, storage) = storage();
        storage.save("numbers", &vec![1]).expect("save");
        storage.save("numbers", &vec![2, 3]).expect("save again");

        let loaded: Option<Vec<i32>> = storage.load("numbers");
        assert_eq!(loaded, Some(vec![2, 3]));

        // No temp file left behind after the rename
        assert!(!temp.path().join("numbers.json.tmp").exists());
    }

    #[test]
    fn test_remove_record() {
        let (_temp, storage) = storage();
        storage.save("numbers", &vec![1]).expect("save");
        storage.remove("numbers").expect("remove");

        let loaded: Option<Vec<i32>> = storage.load("numbers");
        assert!(loaded.is_none());

        // Removing an absent record is fine
        storage.remove("numbers").expect("remove again");
    }
}
