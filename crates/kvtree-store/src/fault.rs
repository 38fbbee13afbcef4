//! Fault injection for exercising retry and partial-failure paths.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{KvError, KvResult};
use crate::traits::KvStore;

/// A store operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KvOp {
    Get,
    Put,
    Delete,
}

impl KvOp {
    fn index(self) -> usize {
        match self {
            Self::Get => 0,
            Self::Put => 1,
            Self::Delete => 2,
        }
    }
}

impl fmt::Display for KvOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
        })
    }
}

/// A failure to inject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Rate limit on the key (retryable).
    RateLimited,
    /// A status code from the store (retryable for 429 and 5xx).
    Status(u16),
    /// Network failure (retryable).
    Network,
    /// Timeout (retryable).
    Timeout,
    /// Unclassified store failure (fatal).
    Backend(String),
}

impl Fault {
    fn to_error(&self, op: KvOp, key: &str) -> KvError {
        match self {
            Self::RateLimited => KvError::RateLimited {
                key: key.to_string(),
            },
            Self::Status(status) => KvError::status(*status, format!("injected on {op} {key}")),
            Self::Network => KvError::Network(format!("injected on {op} {key}")),
            Self::Timeout => KvError::Timeout(format!("injected on {op} {key}")),
            Self::Backend(message) => KvError::Backend(message.clone()),
        }
    }
}

struct KeyFault {
    op: KvOp,
    key: String,
    fault: Fault,
}

/// Wraps a [`KvStore`] and fails selected calls.
///
/// Two kinds of faults can be armed:
/// - [`fail_next`](Self::fail_next): the next `n` calls of an operation fail,
///   on any key;
/// - [`fail_key`](Self::fail_key): every call of an operation on one key
///   fails until [`heal`](Self::heal) is called.
///
/// Calls are counted per operation, including failed ones.
pub struct FaultyKvStore<S> {
    inner: S,
    queued: Mutex<VecDeque<(KvOp, Fault)>>,
    sticky: Mutex<Vec<KeyFault>>,
    calls: [AtomicUsize; 3],
}

impl<S: KvStore> FaultyKvStore<S> {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queued: Mutex::new(VecDeque::new()),
            sticky: Mutex::new(Vec::new()),
            calls: [AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)],
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail the next `times` calls of `op` with `fault`.
    pub fn fail_next(&self, op: KvOp, fault: Fault, times: usize) {
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..times {
            queued.push_back((op, fault.clone()));
        }
    }

    /// Fail every `op` on `key` with `fault` until healed.
    pub fn fail_key(&self, op: KvOp, key: impl Into<String>, fault: Fault) {
        self.sticky
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(KeyFault {
                op,
                key: key.into(),
                fault,
            });
    }

    /// Disarm every fault.
    pub fn heal(&self) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.sticky
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of calls of `op` seen so far.
    pub fn calls(&self, op: KvOp) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Reset all call counters.
    pub fn reset_calls(&self) {
        for counter in &self.calls {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn check(&self, op: KvOp, key: &str) -> KvResult<()> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);

        {
            let sticky = self.sticky.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(armed) = sticky.iter().find(|f| f.op == op && f.key == key) {
                return Err(armed.fault.to_error(op, key));
            }
        }

        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = queued.iter().position(|(queued_op, _)| *queued_op == op) {
            if let Some((_, fault)) = queued.remove(pos) {
                return Err(fault.to_error(op, key));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<S: KvStore> KvStore for FaultyKvStore<S> {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.check(KvOp::Get, key)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.check(KvOp::Put, key)?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.check(KvOp::Delete, key)?;
        self.inner.delete(key).await
    }
}

impl<S> fmt::Debug for FaultyKvStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultyKvStore")
            .field("gets", &self.calls[0].load(Ordering::SeqCst))
            .field("puts", &self.calls[1].load(Ordering::SeqCst))
            .field("deletes", &self.calls[2].load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKvStore;

    #[tokio::test]
    async fn next_faults_are_consumed_in_order() {
        let store = FaultyKvStore::new(InMemoryKvStore::new());
        store.fail_next(KvOp::Put, Fault::Timeout, 2);

        assert!(matches!(store.put("k", "v").await, Err(KvError::Timeout(_))));
        // Gets are unaffected by put faults.
        assert!(store.get("k").await.unwrap().is_none());
        assert!(matches!(store.put("k", "v").await, Err(KvError::Timeout(_))));
        store.put("k", "v").await.unwrap();

        assert_eq!(store.calls(KvOp::Put), 3);
        assert_eq!(store.calls(KvOp::Get), 1);
        assert_eq!(store.inner().get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn key_faults_stick_until_healed() {
        let store = FaultyKvStore::new(InMemoryKvStore::new());
        store.fail_key(KvOp::Delete, "k", Fault::Backend("denied".into()));

        for _ in 0..3 {
            assert!(matches!(store.delete("k").await, Err(KvError::Backend(_))));
        }
        store.delete("other").await.unwrap();

        store.heal();
        store.delete("k").await.unwrap();
        assert_eq!(store.calls(KvOp::Delete), 5);

        store.reset_calls();
        assert_eq!(store.calls(KvOp::Delete), 0);
    }

    #[tokio::test]
    async fn status_faults_classify() {
        let store = FaultyKvStore::new(InMemoryKvStore::new());
        store.fail_next(KvOp::Get, Fault::Status(503), 1);
        store.fail_next(KvOp::Get, Fault::Status(403), 1);

        assert!(store.get("k").await.unwrap_err().is_retryable());
        assert!(!store.get("k").await.unwrap_err().is_retryable());
    }
}
