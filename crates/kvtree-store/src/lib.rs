//! Flat key-value storage underneath a kvtree.
//!
//! The backing store is deliberately primitive: single-key `get`, `put` and
//! `delete` on string keys, no multi-key transactions, and a per-key write
//! rate limit of roughly one write per second. This crate defines that
//! contract and the pieces every tree operation needs on top of it.
//!
//! # Components
//!
//! - [`KvStore`] -- the backing store contract
//! - [`KvError`] -- store errors, classified into retryable and fatal
//! - [`KeyDeriver`] -- maps a segment path to `prefix-hash-suffix` keys
//! - [`RetryPolicy`] / [`with_retry`] -- exponential backoff with jitter
//!
//! # Backends
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding,
//!   with an optional per-key write interval emulating the rate limit
//! - [`FileKvStore`] -- a single JSON file, rewritten atomically on every
//!   mutation
//! - [`FaultyKvStore`] -- wraps another store and injects failures

pub mod error;
pub mod fault;
pub mod file;
pub mod keys;
pub mod memory;
pub mod retry;
pub mod traits;

pub use error::{KvError, KvResult};
pub use fault::{Fault, FaultyKvStore, KvOp};
pub use file::FileKvStore;
pub use keys::{KeyDeriver, RecordKind};
pub use memory::InMemoryKvStore;
pub use retry::{with_retry, RetryPolicy};
pub use traits::KvStore;
