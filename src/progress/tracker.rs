//! Progress store bound to its storage backend
//!
//! Every mutation is followed by a save, so callers never persist manually.

use super::exchange::{self, LevelRow};
use super::{ProgressKey, ProgressRecord, ProgressStore, ProgressSummary};
use crate::error::ImportError;
use crate::platform::storage::KeyValueStore;

pub struct ProgressTracker {
    storage: Box<dyn KeyValueStore>,
    store: ProgressStore,
}

impl ProgressTracker {
    /// Load progress from `storage` (empty on absence or corruption)
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let store = ProgressStore::load(storage.as_ref());
        Self { storage, store }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn record(&self, key: &ProgressKey) -> Option<&ProgressRecord> {
        self.store.record(key)
    }

    fn save(&mut self) {
        self.store.save(self.storage.as_mut());
    }

    /// Returns the stored (best) stars
    pub fn record_completion(&mut self, key: &ProgressKey, earned: u8) -> u8 {
        let stars = self.store.record_completion(key, earned);
        self.save();
        stars
    }

    pub fn record_hint(&mut self, key: &ProgressKey) -> u32 {
        let hints = self.store.record_hint(key);
        self.save();
        hints
    }

    pub fn record_skip(&mut self, key: &ProgressKey) {
        self.store.record_skip(key);
        self.save();
    }

    pub fn reset_hints(&mut self, key: &ProgressKey) {
        self.store.reset_hints(key);
        self.save();
    }

    /// Merge an exported JSON document. On error nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        let incoming = exchange::import_json(json)?;
        log::info!(
            "Importing {} levels, {} attempts",
            incoming.levels.len(),
            incoming.attempts
        );
        self.store.merge(incoming);
        self.save();
        Ok(())
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        exchange::export_json(&self.store)
    }

    pub fn export_csv(&self) -> String {
        exchange::to_csv(&self.store)
    }

    pub fn rows(&self) -> Vec<LevelRow> {
        exchange::level_rows(&self.store)
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_store(&self.store)
    }

    /// Reset everything, removing the stored document
    pub fn clear(&mut self) {
        self.store.clear();
        if let Err(e) = self.storage.remove(ProgressStore::STORAGE_KEY) {
            log::warn!("Failed to clear stored progress: {e}");
        }
        log::info!("Progress cleared");
    }

    /// Reset level data, keeping attempts
    pub fn clear_levels(&mut self) {
        self.store.clear_levels();
        self.save();
        log::info!("Level progress cleared");
    }
}
