//! Persisted high score
//!
//! A single `{"highScore": N}` record, loaded once at startup and rewritten
//! whenever a session score beats it.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// High score record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    #[serde(rename = "highScore")]
    pub high_score: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "duet_highscore";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session score; returns true if it set a new high score
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Load from storage (missing or corrupt → 0)
    pub fn load(storage: &dyn Storage) -> Self {
        let hs: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        log::info!("High score loaded: {}", hs.high_score);
        hs
    }

    /// Write to storage
    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save(storage, Self::STORAGE_KEY, self) {
            log::info!("High score saved: {}", self.high_score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&HighScore { high_score: 7 }).unwrap();
        assert_eq!(json, r#"{"highScore":7}"#);
    }

    #[test]
    fn test_submit_only_on_strictly_greater() {
        let mut hs = HighScore { high_score: 10 };
        assert!(!hs.submit(10));
        assert!(!hs.submit(3));
        assert!(hs.submit(11));
        assert_eq!(hs.high_score, 11);
    }

    #[test]
    fn test_corrupt_storage_defaults_to_zero() {
        let mut storage = MemoryStorage::new();
        storage.set(HighScore::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(HighScore::load(&storage).high_score, 0);
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        HighScore { high_score: 42 }.save(&mut storage);
        assert_eq!(HighScore::load(&storage).high_score, 42);
    }

    proptest! {
        #[test]
        fn prop_high_score_never_decreases(scores in proptest::collection::vec(0u64..1000, 0..50)) {
            let mut hs = HighScore::new();
            let mut prev = 0;
            for s in scores {
                let updated = hs.submit(s);
                prop_assert_eq!(updated, s > prev);
                prop_assert!(hs.high_score >= prev);
                prev = hs.high_score;
            }
        }
    }
}
