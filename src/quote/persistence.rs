//! Storage adapters for quote carts.
//!
//! A store reads its record once when opened and writes it after every
//! mutation. Records are plain JSON with no schema version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::models::QuoteState;

/// Fixed name every cart record is stored under
pub const STORE_NAME: &str = "quote-storage";

/// Storage key for one cart session
pub fn storage_key(session_id: &str) -> String {
    format!("{}/{}", STORE_NAME, session_id)
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Durable home for serialized quote state
pub trait QuotePersistence: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<QuoteState>, PersistenceError>;

    fn save(&self, key: &str, state: &QuoteState) -> Result<(), PersistenceError>;
}

/// In-process storage, serializing through JSON like the file adapter
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuotePersistence for MemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<QuoteState>, PersistenceError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, state: &QuoteState) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(state)?;
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), raw);
        Ok(())
    }
}

/// One pretty-printed JSON file per key under a root directory
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    root: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key.split('/').all(|segment| {
                !segment.is_empty()
                    && segment != "."
                    && segment != ".."
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            });
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl QuotePersistence for JsonFilePersistence {
    fn load(&self, key: &str) -> Result<Option<QuoteState>, PersistenceError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, key: &str, state: &QuoteState) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
