use tracing::{debug, info, warn};

use crate::error::PersistenceError;

use super::store::KeyValueStore;
use super::types::Snapshot;

const STATE_KEY: &str = "state";
const TIMESTAMP_KEY: &str = "timestamp";

/// Saves, loads and clears the wizard snapshot under a key prefix.
///
/// Every operation returns a typed result; store failures and malformed
/// data never escape as panics.
pub struct PersistenceAdapter {
    store: Box<dyn KeyValueStore + Send>,
    prefix: String,
}

impl PersistenceAdapter {
    pub fn new(store: Box<dyn KeyValueStore + Send>, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn state_key(&self) -> String {
        format!("{}{}", self.prefix, STATE_KEY)
    }

    pub fn timestamp_key(&self) -> String {
        format!("{}{}", self.prefix, TIMESTAMP_KEY)
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        self.store
            .set(&self.state_key(), &json)
            .map_err(PersistenceError::Storage)?;
        self.store
            .set(
                &self.timestamp_key(),
                &snapshot.timestamp.timestamp_millis().to_string(),
            )
            .map_err(PersistenceError::Storage)?;

        debug!(
            "Saved snapshot at {} ({} bytes)",
            snapshot.current_screen,
            json.len()
        );
        Ok(())
    }

    /// Load the last snapshot, if any.
    ///
    /// # Errors
    /// `Corrupt` when the stored JSON cannot be parsed; `Storage` when the
    /// store itself fails.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let Some(json) = self
            .store
            .get(&self.state_key())
            .map_err(PersistenceError::Storage)?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<Snapshot>(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("Stored snapshot is unreadable: {}", e);
                Err(PersistenceError::Corrupt(e.to_string()))
            }
        }
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store
            .remove(&self.state_key())
            .map_err(PersistenceError::Storage)?;
        self.store
            .remove(&self.timestamp_key())
            .map_err(PersistenceError::Storage)?;
        info!("Cleared persisted snapshot");
        Ok(())
    }

    /// Epoch milliseconds of the last save, if recorded.
    pub fn last_saved_millis(&self) -> Result<Option<i64>, PersistenceError> {
        let raw = self
            .store
            .get(&self.timestamp_key())
            .map_err(PersistenceError::Storage)?;
        Ok(raw.and_then(|v| v.parse::<i64>().ok()))
    }
}
