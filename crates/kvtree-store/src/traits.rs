use async_trait::async_trait;

use crate::error::KvResult;

/// A flat, single-key string store.
///
/// This is the whole contract a kvtree needs from its backend:
/// - keys are independent; there are no multi-key transactions
/// - writes to the same key are serialized by the store, but may be
///   rate-limited, surfacing as a retryable [`KvError`](crate::KvError)
/// - deleting a missing key is not an error
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a key. Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Create or overwrite a key.
    async fn put(&self, key: &str, value: &str) -> KvResult<()>;

    /// Remove a key.
    async fn delete(&self, key: &str) -> KvResult<()>;
}
