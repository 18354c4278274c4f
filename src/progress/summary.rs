//! Dashboard summary figures

use super::ProgressStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub total_plays: u64,
    pub total_stars: u64,
    /// Patterns with at least one star
    pub patterns_completed: usize,
    pub attempts: u32,
    pub stored_patterns: usize,
    pub average_stars: f64,
}

impl ProgressSummary {
    pub fn from_store(store: &ProgressStore) -> Self {
        let records = store.levels.values();
        let total_plays: u64 = records.clone().map(|r| u64::from(r.plays)).sum();
        let total_stars: u64 = records.clone().map(|r| u64::from(r.stars)).sum();
        let patterns_completed = records.filter(|r| r.stars > 0).count();
        let stored_patterns = store.levels.len();
        let average_stars = if stored_patterns == 0 {
            0.0
        } else {
            total_stars as f64 / stored_patterns as f64
        };
        Self {
            total_plays,
            total_stars,
            patterns_completed,
            attempts: store.attempts,
            stored_patterns,
            average_stars,
        }
    }

    /// Average stars as shown on the dashboard ("0" with no data)
    pub fn average_label(&self) -> String {
        if self.stored_patterns == 0 {
            "0".to_string()
        } else {
            format!("{:.2}", self.average_stars)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressKey, ProgressRecord};

    #[test]
    fn test_summary_counts() {
        let mut store = ProgressStore::new();
        store.levels.insert(
            ProgressKey::new(3, "a"),
            ProgressRecord { plays: 4, stars: 3, hints: 0 },
        );
        store.levels.insert(
            ProgressKey::new(3, "b"),
            ProgressRecord { plays: 2, stars: 0, hints: 1 },
        );
        store.levels.insert(
            ProgressKey::new(4, "c"),
            ProgressRecord { plays: 1, stars: 2, hints: 0 },
        );
        store.attempts = 5;

        let s = ProgressSummary::from_store(&store);
        assert_eq!(s.total_plays, 7);
        assert_eq!(s.total_stars, 5);
        assert_eq!(s.patterns_completed, 2);
        assert_eq!(s.attempts, 5);
        assert_eq!(s.stored_patterns, 3);
        assert_eq!(s.average_label(), "1.67");
    }

    #[test]
    fn test_empty_summary() {
        let s = ProgressSummary::from_store(&ProgressStore::new());
        assert_eq!(s.total_plays, 0);
        assert_eq!(s.average_label(), "0");
    }
}
