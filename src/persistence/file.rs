//! JSON file backend for native builds

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// All keys live in one JSON object, rewritten on every `set`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// An unreadable or corrupt file starts the store empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(entries) => {
                    log::info!("Loaded progress store {}", path.display());
                    entries
                }
                Err(e) => {
                    log::warn!("Corrupt progress store {}: {} - starting fresh", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => {
                log::info!("No progress store at {}, starting fresh", path.display());
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("block_runner_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::open(&path);
        assert!(store.get("gems").is_none());
        store.set("gems", "42").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("gems").as_deref(), Some("42"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileStore::open(&path);
        assert!(store.get("gems").is_none());
        let _ = std::fs::remove_file(&path);
    }
}
