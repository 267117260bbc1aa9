//! Persistence of the flow collection in a single JSON slot.
//!
//! The app talks to a [`FlowStore`] so tests can swap the file for memory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::flows::{FlowRecord, seed_flows};

/// Name of the slot file under the app's config directory.
pub const SLOT_FILE: &str = "flows.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored flows are malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored flow #{index} is invalid")]
    InvalidRecord { index: usize },

    #[error("storage slot is unavailable after a panic while it was in use")]
    Unavailable,
}

/// Storage port for the flow collection.
pub trait FlowStore {
    /// Read the slot. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<FlowRecord>>, StorageError>;

    /// Overwrite the slot with `records`.
    fn save(&mut self, records: &[FlowRecord]) -> Result<(), StorageError>;
}

fn decode(contents: &str) -> Result<Vec<FlowRecord>, StorageError> {
    let records: Vec<FlowRecord> = serde_json::from_str(contents)?;
    if let Some(index) = records.iter().position(|r| !r.is_valid()) {
        return Err(StorageError::InvalidRecord { index });
    }
    Ok(records)
}

/// Load the persisted flows, falling back to the seed set when the slot is
/// empty or cannot be read.
pub fn load_or_seed(store: &dyn FlowStore) -> Vec<FlowRecord> {
    match store.load() {
        Ok(Some(records)) => {
            tracing::info!("Loaded {} flows from storage", records.len());
            records
        }
        Ok(None) => {
            tracing::info!("No saved flows, starting from defaults");
            seed_flows()
        }
        Err(e) => {
            tracing::warn!("Ignoring saved flows ({}), starting from defaults", e);
            seed_flows()
        }
    }
}

/// JSON file slot, by default `<config_dir>/sankey-native/flows.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot in the platform config directory, if one can be determined.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|mut p| {
            p.push("sankey-native");
            p.push(SLOT_FILE);
            Self::new(p)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl FlowStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<FlowRecord>>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => decode(&contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, records: &[FlowRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        tracing::debug!("Saved {} flows to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// In-memory slot holding the serialized JSON text.
///
/// Clones share the same slot, so a test can keep a handle while the app owns
/// the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose slot already holds `contents`.
    #[cfg(test)]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Raw JSON currently in the slot.
    fn contents(&self) -> Result<Option<String>, StorageError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| StorageError::Unavailable)
    }
}

impl FlowStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<FlowRecord>>, StorageError> {
        match self.contents()? {
            Some(contents) => decode(&contents).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, records: &[FlowRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        let mut slot = self.slot.lock().map_err(|_| StorageError::Unavailable)?;
        *slot = Some(json);
        Ok(())
    }
}
