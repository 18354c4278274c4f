//! Per-pattern progress
//!
//! Tracks plays, best stars and hints per pattern plus a global attempt
//! counter. Stored locally as a single JSON document under
//! [`ProgressStore::STORAGE_KEY`].

pub mod exchange;
pub mod summary;
pub mod tracker;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::MAX_STARS;
use crate::platform::storage::KeyValueStore;

pub use exchange::{LevelRow, parse_csv, to_csv};
pub use summary::ProgressSummary;
pub use tracker::ProgressTracker;

/// Composite key `grid{N}_id{patternId}`, case-sensitive
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressKey(String);

impl ProgressKey {
    pub fn new(grid: u32, pattern_id: &str) -> Self {
        Self(format!("grid{grid}_id{pattern_id}"))
    }

    /// Wrap an arbitrary stored key without checking its shape
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(grid, pattern id)` when the key has the standard shape.
    ///
    /// Grids with leading zeros (`grid03_...`) do not rebuild to the same
    /// key, so they are treated as free-form.
    pub fn parse(&self) -> Option<(u32, &str)> {
        let rest = self.0.strip_prefix("grid")?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || (digits > 1 && rest.starts_with('0')) {
            return None;
        }
        let grid = rest[..digits].parse().ok()?;
        let id = rest[digits..].strip_prefix("_id")?;
        if id.is_empty() {
            return None;
        }
        Some((grid, id))
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Null and missing fields both read as the default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Statistics for one pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub plays: u32,
    /// Best rating ever earned, 0..=3
    #[serde(deserialize_with = "null_as_default")]
    pub stars: u8,
    /// Hints used since the pattern was last advanced past
    #[serde(deserialize_with = "null_as_default")]
    pub hints: u32,
}

/// All persisted progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressStore {
    #[serde(deserialize_with = "null_as_default")]
    pub levels: BTreeMap<ProgressKey, ProgressRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub attempts: u32,
}

impl ProgressStore {
    /// Storage key for the serialized store
    pub const STORAGE_KEY: &'static str = "tangram_progress";

    pub fn new() -> Self {
        Self::default()
    }

    /// Load from storage. Missing or corrupt data yields an empty store.
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<ProgressStore>(&json) {
                Ok(mut store) => {
                    store.clamp_stars();
                    log::info!("Loaded progress for {} patterns", store.levels.len());
                    store
                }
                Err(e) => {
                    log::warn!("Stored progress is corrupt, starting fresh: {e}");
                    Self::new()
                }
            },
            Ok(None) => {
                log::info!("No stored progress, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Progress storage unavailable: {e}");
                Self::new()
            }
        }
    }

    /// Persist the whole store. Failures are logged and dropped.
    pub fn save(&self, storage: &mut dyn KeyValueStore) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize progress: {e}");
                return;
            }
        };
        match storage.set(Self::STORAGE_KEY, &json) {
            Ok(()) => log::debug!("Progress saved ({} patterns)", self.levels.len()),
            Err(e) => log::warn!("Failed to save progress: {e}"),
        }
    }

    pub fn record(&self, key: &ProgressKey) -> Option<&ProgressRecord> {
        self.levels.get(key)
    }

    fn entry(&mut self, key: &ProgressKey) -> &mut ProgressRecord {
        self.levels.entry(key.clone()).or_default()
    }

    /// Count a completed play. Stars only ever go up. Returns the stored stars.
    pub fn record_completion(&mut self, key: &ProgressKey, earned: u8) -> u8 {
        let record = self.entry(key);
        record.plays = record.plays.saturating_add(1);
        record.stars = record.stars.max(earned.min(MAX_STARS));
        let stars = record.stars;
        self.attempts = self.attempts.saturating_add(1);
        stars
    }

    /// Count a hint. Returns the pattern's hint total.
    pub fn record_hint(&mut self, key: &ProgressKey) -> u32 {
        let record = self.entry(key);
        record.hints = record.hints.saturating_add(1);
        record.hints
    }

    /// Count a skipped (failed) play without touching stars
    pub fn record_skip(&mut self, key: &ProgressKey) {
        let record = self.entry(key);
        record.plays = record.plays.saturating_add(1);
    }

    /// Zero the hint counter of an existing record
    pub fn reset_hints(&mut self, key: &ProgressKey) {
        if let Some(record) = self.levels.get_mut(key) {
            record.hints = 0;
        }
    }

    /// Fold in an imported store.
    ///
    /// Incoming records replace existing ones with the same key wholesale;
    /// they are not combined. Attempts are summed.
    pub fn merge(&mut self, mut incoming: ProgressStore) {
        incoming.clamp_stars();
        self.attempts = self.attempts.saturating_add(incoming.attempts);
        self.levels.extend(incoming.levels);
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Drop level data, keeping the attempt counter
    pub fn clear_levels(&mut self) {
        self.levels.clear();
    }

    fn clamp_stars(&mut self) {
        for record in self.levels.values_mut() {
            record.stars = record.stars.min(MAX_STARS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;
    use crate::error::StorageError;
    use proptest::prelude::*;

    fn key(s: &str) -> ProgressKey {
        ProgressKey::from_raw(s)
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Rejected("quota exceeded".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_key_format_and_parse() {
        let k = ProgressKey::new(4, "7b");
        assert_eq!(k.as_str(), "grid4_id7b");
        assert_eq!(k.parse(), Some((4, "7b")));
        assert_eq!(ProgressKey::new(12, "x_id").parse(), Some((12, "x_id")));
        assert_eq!(key("grid_idx").parse(), None);
        assert_eq!(key("grid3_id").parse(), None);
        assert_eq!(key("Grid3_ida").parse(), None);
        assert_eq!(key("free-form").parse(), None);
        assert_eq!(key("grid03_idx").parse(), None);
        assert_eq!(key("grid0_idx").parse(), Some((0, "x")));
    }

    #[test]
    fn test_stars_never_decrease() {
        let mut store = ProgressStore::new();
        let k = key("grid3_ida1");
        assert_eq!(store.record_completion(&k, 2), 2);
        assert_eq!(store.record_completion(&k, 3), 3);
        assert_eq!(store.record_completion(&k, 1), 3);
        let r = store.record(&k).unwrap();
        assert_eq!(r.plays, 3);
        assert_eq!(r.stars, 3);
        assert_eq!(store.attempts, 3);
    }

    #[test]
    fn test_skip_counts_play_only() {
        let mut store = ProgressStore::new();
        let k = key("grid3_idz");
        store.record_skip(&k);
        assert_eq!(store.record(&k), Some(&ProgressRecord { plays: 1, stars: 0, hints: 0 }));
        assert_eq!(store.attempts, 0);
    }

    #[test]
    fn test_hints_and_reset() {
        let mut store = ProgressStore::new();
        let k = key("grid2_idh");
        assert_eq!(store.record_hint(&k), 1);
        assert_eq!(store.record_hint(&k), 2);
        store.reset_hints(&k);
        assert_eq!(store.record(&k).unwrap().hints, 0);

        // Reset on an unknown key does not create one
        store.reset_hints(&key("grid2_idnone"));
        assert_eq!(store.levels.len(), 1);
    }

    #[test]
    fn test_merge_overwrites_levels_and_sums_attempts() {
        let mut store = ProgressStore::new();
        store.levels.insert(key("a"), ProgressRecord { plays: 9, stars: 3, hints: 0 });
        store.levels.insert(key("b"), ProgressRecord { plays: 1, stars: 1, hints: 1 });
        store.attempts = 10;

        let mut incoming = ProgressStore::new();
        incoming.levels.insert(key("a"), ProgressRecord { plays: 1, stars: 1, hints: 2 });
        incoming.levels.insert(key("c"), ProgressRecord { plays: 2, stars: 2, hints: 0 });
        incoming.attempts = 5;

        store.merge(incoming);
        // Overwritten, not maxed
        assert_eq!(store.record(&key("a")), Some(&ProgressRecord { plays: 1, stars: 1, hints: 2 }));
        assert_eq!(store.record(&key("b")).unwrap().plays, 1);
        assert_eq!(store.record(&key("c")).unwrap().stars, 2);
        assert_eq!(store.attempts, 15);
    }

    #[test]
    fn test_clear_variants() {
        let mut store = ProgressStore::new();
        store.record_completion(&key("a"), 3);
        store.clear_levels();
        assert!(store.levels.is_empty());
        assert_eq!(store.attempts, 1);

        store.record_completion(&key("a"), 3);
        store.clear();
        assert_eq!(store, ProgressStore::new());
    }

    #[test]
    fn test_load_save_round_trip() {
        let mut storage = MemoryStore::new();
        let mut store = ProgressStore::new();
        store.record_completion(&key("grid3_ida1"), 3);
        store.save(&mut storage);
        assert_eq!(ProgressStore::load(&storage), store);
    }

    #[test]
    fn test_load_defaults_on_missing_or_corrupt() {
        let mut storage = MemoryStore::new();
        assert_eq!(ProgressStore::load(&storage), ProgressStore::new());
        storage.set(ProgressStore::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(ProgressStore::load(&storage), ProgressStore::new());
        assert_eq!(ProgressStore::load(&BrokenStore), ProgressStore::new());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut store = ProgressStore::new();
        store.record_hint(&key("a"));
        store.save(&mut BrokenStore);
        assert_eq!(store.record(&key("a")).unwrap().hints, 1);
    }

    #[test]
    fn test_load_tolerates_missing_and_null_fields() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                ProgressStore::STORAGE_KEY,
                r#"{"levels": {"grid3_idq": {"plays": 2, "hints": null}}}"#,
            )
            .unwrap();
        let store = ProgressStore::load(&storage);
        assert_eq!(store.attempts, 0);
        assert_eq!(
            store.record(&key("grid3_idq")),
            Some(&ProgressRecord { plays: 2, stars: 0, hints: 0 })
        );
    }

    #[test]
    fn test_loaded_stars_are_capped() {
        let mut storage = MemoryStore::new();
        storage
            .set(ProgressStore::STORAGE_KEY, r#"{"levels": {"k": {"stars": 9}}, "attempts": 1}"#)
            .unwrap();
        assert_eq!(ProgressStore::load(&storage).record(&key("k")).unwrap().stars, 3);
    }

    fn record_strategy() -> impl Strategy<Value = ProgressRecord> {
        (0u32..100, 0u8..=MAX_STARS, 0u32..10)
            .prop_map(|(plays, stars, hints)| ProgressRecord { plays, stars, hints })
    }

    fn store_strategy() -> impl Strategy<Value = ProgressStore> {
        (
            prop::collection::btree_map("grid[1-5]_id[a-d]", record_strategy(), 0..8),
            0u32..1000,
        )
            .prop_map(|(levels, attempts)| ProgressStore {
                levels: levels
                    .into_iter()
                    .map(|(k, r)| (ProgressKey::from_raw(k), r))
                    .collect(),
                attempts,
            })
    }

    proptest! {
        #[test]
        fn prop_merge_overwrites_and_sums(
            existing in store_strategy(),
            incoming in store_strategy(),
        ) {
            let mut merged = existing.clone();
            merged.merge(incoming.clone());

            prop_assert_eq!(merged.attempts, existing.attempts + incoming.attempts);
            for (k, r) in &incoming.levels {
                prop_assert_eq!(merged.record(k), Some(r));
            }
            for (k, r) in &existing.levels {
                if !incoming.levels.contains_key(k) {
                    prop_assert_eq!(merged.record(k), Some(r));
                }
            }
            let union: std::collections::BTreeSet<_> =
                existing.levels.keys().chain(incoming.levels.keys()).collect();
            prop_assert_eq!(merged.levels.len(), union.len());
        }

        #[test]
        fn prop_export_import_into_fresh_store(store in store_strategy()) {
            let json = exchange::export_json(&store).unwrap();
            let mut fresh = ProgressStore::new();
            fresh.merge(exchange::import_json(&json).unwrap());
            prop_assert_eq!(fresh, store);
        }

        #[test]
        fn prop_stars_never_decrease(
            completions in prop::collection::vec((0usize..3, 0u8..6), 0..30)
        ) {
            let keys = [key("grid3_ida"), key("grid3_idb"), key("grid4_ida")];
            let mut store = ProgressStore::new();
            let mut best = [0u8; 3];
            for (i, earned) in completions {
                let before = store.record(&keys[i]).map_or(0, |r| r.stars);
                let stored = store.record_completion(&keys[i], earned);
                best[i] = best[i].max(earned.min(MAX_STARS));
                prop_assert!(stored >= before);
                prop_assert_eq!(stored, best[i]);
            }
        }
    }
}
