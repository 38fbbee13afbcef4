use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{KvError, KvResult};
use crate::traits::KvStore;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Optionally emulates the backing store's
/// per-key write rate limit: with a write interval set, a second `put` or
/// `delete` of the same key inside the interval fails with
/// [`KvError::RateLimited`].
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    write_interval: Option<Duration>,
    last_write: Mutex<HashMap<String, Instant>>,
}

impl InMemoryKvStore {
    /// Create a new empty store without a write rate limit.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            write_interval: None,
            last_write: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store that rejects writes to a key more often than once per
    /// `interval`.
    pub fn with_write_interval(interval: Duration) -> Self {
        Self {
            write_interval: Some(interval),
            ..Self::new()
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of every stored key.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn check_rate(&self, key: &str) -> KvResult<()> {
        let Some(interval) = self.write_interval else {
            return Ok(());
        };
        let mut last = self
            .last_write
            .lock()
            .map_err(|e| KvError::Backend(format!("lock poisoned: {e}")))?;
        let now = Instant::now();
        if let Some(previous) = last.get(key) {
            if now.duration_since(*previous) < interval {
                return Err(KvError::RateLimited {
                    key: key.to_string(),
                });
            }
        }
        last.insert(key.to_string(), now);
        Ok(())
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let map = self
            .entries
            .read()
            .map_err(|e| KvError::Backend(format!("lock poisoned: {e}")))?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.check_rate(key)?;
        let mut map = self
            .entries
            .write()
            .map_err(|e| KvError::Backend(format!("lock poisoned: {e}")))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.check_rate(key)?;
        let mut map = self
            .entries
            .write()
            .map_err(|e| KvError::Backend(format!("lock poisoned: {e}")))?;
        map.remove(key);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("key_count", &self.len())
            .field("write_interval", &self.write_interval)
            .finish()
    }
}
