//! File-backed key-value store.
//!
//! The engine treats the store as the browser's `localStorage`: small
//! string pairs, durable across runs. Here that is a flat JSON object in
//! a state file, re-read on every access so concurrent invocations see
//! each other's writes.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use mercadito_engine::snapshot::KeyValueStore;

const STATE_FILE_VAR: &str = "MERCADITO_STATE_FILE";
const DEFAULT_STATE_FILE: &str = ".mercadito-state.json";

/// Key-value store persisted as a JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `MERCADITO_STATE_FILE`, or the default state
    /// file in the current directory.
    #[must_use]
    pub fn from_env() -> Self {
        let path = std::env::var(STATE_FILE_VAR)
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);
        Self { path }
    }

    #[cfg(test)]
    fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        // A corrupt state file reads as empty; the next write replaces it.
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn save(&self, map: &BTreeMap<String, String>) {
        match serde_json::to_string_pretty(map) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    warn!(path = %self.path.display(), error = %e, "state file write failed");
                }
            }
            Err(e) => warn!(error = %e, "state serialization failed"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());
        self.save(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.load();
        if map.remove(key).is_some() {
            self.save(&map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileStore {
        let mut path = std::env::temp_dir();
        path.push(format!("mercadito-store-test-{name}-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        FileStore::at(path)
    }

    #[test]
    fn test_set_get_remove_round_trip() {
        let store = temp_store("round-trip");
        assert_eq!(store.get("token"), None);

        store.set("token", "abc");
        assert_eq!(store.get("token"), Some("abc".to_string()));

        store.remove("token");
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let store = temp_store("corrupt");
        fs::write(&store.path, "not json").unwrap();
        assert_eq!(store.get("anything"), None);

        store.set("k", "v");
        assert_eq!(store.get("k"), Some("v".to_string()));
    }
}
