use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

use crate::*;

/// Key the best score lives under in a key/value store.
pub const BEST_SCORE_KEY: &str = "ascend:best-score";

/// Fastest completed round. Fewer mistakes break ties on time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub time: u32,
    pub mistakes: u32,
}

impl BestScore {
    pub const fn new(time: u32, mistakes: u32) -> Self {
        Self { time, mistakes }
    }

    /// Whether this result should replace `current`.
    pub fn beats(&self, current: Option<&BestScore>) -> bool {
        match current {
            None => true,
            Some(best) => {
                self.time < best.time || (self.time == best.time && self.mistakes < best.mistakes)
            }
        }
    }
}

/// Read/write access to the single persisted best-score record.
pub trait ScoreStore {
    fn load(&self) -> core::result::Result<Option<BestScore>, StoreError>;
    fn save(&mut self, score: &BestScore) -> core::result::Result<(), StoreError>;
}

/// String key/value storage, e.g. browser local storage.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> core::result::Result<(), StoreError>;
}

/// Stores the best score as `{"time":..,"mistakes":..}` JSON under [`BEST_SCORE_KEY`].
#[derive(Clone, Debug, Default)]
pub struct KeyValueScoreStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> KeyValueScoreStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: KeyValueBackend> ScoreStore for KeyValueScoreStore<B> {
    fn load(&self) -> core::result::Result<Option<BestScore>, StoreError> {
        let Some(raw) = self.backend.get(BEST_SCORE_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    fn save(&mut self, score: &BestScore) -> core::result::Result<(), StoreError> {
        let raw =
            serde_json::to_string(score).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        self.backend.set(BEST_SCORE_KEY, raw)
    }
}

/// In-process backend, forgets everything on drop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> core::result::Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

pub type MemoryScoreStore = KeyValueScoreStore<MemoryBackend>;

/// A store that is never reachable.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullStore;

impl ScoreStore for NullStore {
    fn load(&self) -> core::result::Result<Option<BestScore>, StoreError> {
        Err(StoreError::Unavailable("no score store configured".to_string()))
    }

    fn save(&mut self, _score: &BestScore) -> core::result::Result<(), StoreError> {
        Err(StoreError::Unavailable("no score store configured".to_string()))
    }
}
