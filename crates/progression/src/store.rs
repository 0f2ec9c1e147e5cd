//! Persistence backends for progression state.
//!
//! The ledger talks to a `ProgressionStore`; what sits behind it is a
//! deployment choice. The JSON file store writes atomically
//! (temp-then-rename) so a crash mid-save never corrupts the record.

use crate::model::{ProgressionState, XpTransaction};
use hatchling_core::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Everything a store persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedProgression {
    pub state: Option<ProgressionState>,
    #[serde(default)]
    pub history: Vec<XpTransaction>,
}

/// Storage seam for the ledger.
pub trait ProgressionStore: Send + Sync {
    fn name(&self) -> &str;

    /// Load the persisted record, `None` state on first run.
    fn load(&self) -> Result<PersistedProgression, LedgerError>;

    /// Persist the full record.
    fn save(&self, record: &PersistedProgression) -> Result<(), LedgerError>;
}

/// Keeps everything in memory. Used in tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: std::sync::Mutex<PersistedProgression>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<PersistedProgression, LedgerError> {
        Ok(self.record.lock().expect("store lock poisoned").clone())
    }

    fn save(&self, record: &PersistedProgression) -> Result<(), LedgerError> {
        *self.record.lock().expect("store lock poisoned") = record.clone();
        Ok(())
    }
}

/// JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProgressionStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    fn load(&self) -> Result<PersistedProgression, LedgerError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No progression file yet, starting fresh");
            return Ok(PersistedProgression::default());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| LedgerError::Store(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| LedgerError::Store(format!("parse {}: {e}", self.path.display())))
    }

    fn save(&self, record: &PersistedProgression) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Store(format!("mkdir {}: {e}", parent.display())))?;
        }

        let raw = serde_json::to_string_pretty(record)
            .map_err(|e| LedgerError::Store(format!("serialize progression: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .map_err(|e| LedgerError::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| LedgerError::Store(format!("rename to {}: {e}", self.path.display())))?;
        Ok(())
    }
}
