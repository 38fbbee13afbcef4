//! A path-addressed tree stored in a flat key-value store.
//!
//! The backing store only offers single-key `get`/`put`/`delete`, with no
//! transactions and a per-key write rate limit. This crate simulates a tree
//! on top of it: every node is three independent entries (value, children,
//! parent) keyed by a hash of the node's full path, and every tree operation
//! is an ordered sequence of retried single-key calls.
//!
//! # Layers
//!
//! - [`NodeStore`] -- one node's records: existence, create, value get/set,
//!   child-list maintenance
//! - [`KvTree`] -- the exposed operations, including recursive delete, move,
//!   traversal, find, stats, batch create, and import/export
//!
//! # Consistency
//!
//! There is no atomicity across keys. A multi-step operation that fails
//! partway leaves the partial state in place and reports the failure; only
//! [`KvTree::move_node`] attempts a best-effort cleanup of its partial copy.
//! Concurrent writers to the same parent can lose child-list updates.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kvtree_engine::{KvTree, TreeConfig};
//! use kvtree_store::InMemoryKvStore;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tree = KvTree::new(Arc::new(InMemoryKvStore::new()), TreeConfig::default());
//! tree.initialize_root().await.unwrap();
//!
//! let docs = tree.parse_path("docs");
//! tree.create_node(&docs, &json!({"title": "Docs"})).await.unwrap();
//! assert_eq!(tree.get_children(&[]).await.unwrap(), vec!["docs"]);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod ops;
pub mod store;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use config::TreeConfig;
pub use error::{MovePhase, TreeError, TreeResult};
pub use node::{canonical_json, display_path, NodeSnapshot, NodeSpec};
pub use ops::exchange::ExportedNode;
pub use ops::stats::TreeStats;
pub use ops::traverse::{TraversalStrategy, TraverseOptions, Visit};
pub use store::NodeStore;
pub use tree::KvTree;
