//! Incrementality sidecar (spec §4.7): a JSON file mapping indexed path to
//! (mtime, size), rewritten atomically on commit so a crash mid-build never
//! leaves a state file pointing at documents that were never upserted.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
struct Fingerprint {
    mtime: i64,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexState {
    entries: HashMap<String, Fingerprint>,
}

impl IndexState {
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn needs_reindex(&self, path: &str, mtime: i64, size: u64) -> bool {
        self.entries.get(path) != Some(&Fingerprint { mtime, size })
    }

    pub fn record(&mut self, path: &str, mtime: i64, size: u64) {
        self.entries.insert(path.to_string(), Fingerprint { mtime, size });
    }

    pub fn forget(&mut self, path: &str) {
        self.entries.remove(path);
    }

    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self)?;
        let tmp_path = sibling_tmp_path(path);
        std::fs::write(&tmp_path, rendered)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = IndexState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.needs_reindex("any/path.jsonl", 1, 1));
    }

    #[test]
    fn unchanged_fingerprint_does_not_need_reindex() {
        let mut state = IndexState::default();
        state.record("a.jsonl", 100, 500);
        assert!(!state.needs_reindex("a.jsonl", 100, 500));
        assert!(state.needs_reindex("a.jsonl", 100, 501));
        assert!(state.needs_reindex("a.jsonl", 101, 500));
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut state = IndexState::default();
        state.record("a.jsonl", 100, 500);
        state.save_atomic(&path).unwrap();

        let reloaded = IndexState::load(&path).unwrap();
        assert!(!reloaded.needs_reindex("a.jsonl", 100, 500));
    }
}
