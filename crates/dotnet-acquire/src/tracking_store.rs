//! Persisted install-id → state map (spec.md §6's key/value state-store
//! external interface), backed by one JSON file written with the teacher's
//! atomic-write-then-rename pattern. An in-memory mirror under a `Mutex`
//! avoids re-reading the file on every lookup within a process.

use dotnet_types::{AcquireError, InstallId, InstallState, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

pub struct TrackingStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, InstallState>>,
}

impl TrackingStore {
    /// Load (or initialize empty) the store at `path`.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn get(&self, id: InstallId) -> Option<InstallState> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(&id.to_hex()).cloned()
    }

    pub fn set(&self, id: InstallId, state: InstallState) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.insert(id.to_hex(), state);
        }
        self.persist()
    }

    pub fn remove(&self, id: InstallId) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.remove(&id.to_hex());
        }
        self.persist()
    }

    /// Drop every entry. Used by `uninstall_all` (spec.md §8 property 7).
    pub fn clear(&self) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.clear();
        }
        self.persist()
    }

    /// spec.md §8 property 1: at most one of `installing`/`installed` is set
    /// for a given id at any observable moment — true by construction here,
    /// since `InstallState` is a single enum value per key, never both.
    #[cfg(test)]
    pub fn has_any_installing_or_installed(&self) -> bool {
        !self.entries.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    /// Every tracked install id and its state, for `list()` (spec.md §4.7).
    pub fn all(&self) -> Vec<(InstallId, InstallState)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|(hex, state)| Some((InstallId::from_hex(hex)?, state.clone())))
            .collect()
    }

    fn persist(&self) -> Result<()> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let raw = serde_json::to_vec_pretty(&*entries).map_err(AcquireError::from)?;
        dotnet_index::storage::atomic_write_bytes(&self.path, &raw).map_err(AcquireError::from)
    }
}
