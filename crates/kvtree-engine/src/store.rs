//! Single-node primitives.
//!
//! A node at path `P` is stored as:
//!
//! | Key | Payload |
//! |-----|---------|
//! | `prefix-hash(P)-value` | canonical JSON of the value |
//! | `prefix-hash(P)-children` | JSON array of child segments |
//! | `prefix-hash(P)-parent` | JSON array of the parent's segments (non-root) |
//!
//! Only the value record decides existence. The parent record is written for
//! external inspection and never read here.

use std::sync::Arc;

use kvtree_store::{with_retry, KeyDeriver, KvStore, RecordKind, RetryPolicy};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{TreeError, TreeResult};
use crate::node::{canonical_json, display_path, NodeSnapshot};

/// CRUD on individual nodes over a flat [`KvStore`].
///
/// Every store call is wrapped in [`with_retry`]. Multi-record writes are
/// ordered but not atomic: a failure between them leaves the records already
/// written in place.
pub struct NodeStore {
    kv: Arc<dyn KvStore>,
    keys: KeyDeriver,
    retry: RetryPolicy,
}

impl NodeStore {
    pub fn new(kv: Arc<dyn KvStore>, keys: KeyDeriver, retry: RetryPolicy) -> Self {
        Self { kv, keys, retry }
    }

    pub fn keys(&self) -> &KeyDeriver {
        &self.keys
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether the node's value record can be read.
    ///
    /// Any read failure, including an exhausted retry, reports `false`.
    pub async fn node_exists(&self, path: &[String]) -> bool {
        let key = self.keys.key(path, RecordKind::Value);
        matches!(self.read(&key).await, Ok(Some(_)))
    }

    /// Create the root if it does not exist yet. Returns `true` if it was
    /// created by this call.
    pub async fn initialize_root(&self) -> TreeResult<bool> {
        if self.node_exists(&[]).await {
            return Ok(false);
        }
        self.write_root(&Value::Null).await?;
        info!(prefix = self.keys.prefix(), "initialized tree root");
        Ok(true)
    }

    /// Create a node.
    ///
    /// The root can only be created while absent. Any other node needs an
    /// existing parent; its records are written in the order value, parent,
    /// children, and finally the parent's child list gains the new segment.
    /// Creating over an existing non-root node replaces its value and resets
    /// its child list.
    pub async fn create_node(&self, path: &[String], value: &Value) -> TreeResult<()> {
        let Some((key, parent)) = path.split_last() else {
            if self.node_exists(&[]).await {
                return Err(TreeError::already_exists(path));
            }
            return self.write_root(value).await;
        };

        if !self.node_exists(parent).await {
            return Err(TreeError::parent_missing(path));
        }

        self.write(&self.keys.key(path, RecordKind::Value), &canonical_json(value))
            .await?;
        self.write(&self.keys.key(path, RecordKind::Parent), &encode_list(parent))
            .await?;
        self.write(&self.keys.key(path, RecordKind::Children), "[]")
            .await?;
        self.add_child_to_parent(parent, key).await?;

        debug!(path = %display_path(path), "created node");
        Ok(())
    }

    pub async fn get_value(&self, path: &[String]) -> TreeResult<Value> {
        let key = self.keys.key(path, RecordKind::Value);
        match self.read(&key).await? {
            Some(text) => decode(&key, &text),
            None => Err(TreeError::not_found(path)),
        }
    }

    /// Overwrite an existing node's value.
    pub async fn set_value(&self, path: &[String], value: &Value) -> TreeResult<()> {
        if !self.node_exists(path).await {
            return Err(TreeError::not_found(path));
        }
        self.write(&self.keys.key(path, RecordKind::Value), &canonical_json(value))
            .await?;
        debug!(path = %display_path(path), "updated node value");
        Ok(())
    }

    pub async fn get_children(&self, path: &[String]) -> TreeResult<Vec<String>> {
        let key = self.keys.key(path, RecordKind::Children);
        match self.read(&key).await? {
            Some(text) => decode(&key, &text),
            None => Err(TreeError::not_found(path)),
        }
    }

    /// Value and children of a node.
    pub async fn get_node(&self, path: &[String]) -> TreeResult<NodeSnapshot> {
        let value = self.get_value(path).await?;
        let children = self.get_children(path).await?;
        Ok(NodeSnapshot {
            path: path.to_vec(),
            value,
            children,
        })
    }

    /// Append `child` to the parent's child list unless already present.
    ///
    /// Read-modify-write without compare-and-swap: two concurrent callers on
    /// the same parent can lose one update.
    pub async fn add_child_to_parent(&self, parent: &[String], child: &str) -> TreeResult<()> {
        let mut children = self.get_children(parent).await?;
        if children.iter().any(|existing| existing == child) {
            return Ok(());
        }
        children.push(child.to_string());
        self.write(
            &self.keys.key(parent, RecordKind::Children),
            &encode_list(&children),
        )
        .await
    }

    /// Remove `child` from the parent's child list if present. Same race as
    /// [`add_child_to_parent`](Self::add_child_to_parent).
    pub async fn remove_child_from_parent(&self, parent: &[String], child: &str) -> TreeResult<()> {
        let mut children = self.get_children(parent).await?;
        let before = children.len();
        children.retain(|existing| existing != child);
        if children.len() == before {
            return Ok(());
        }
        self.write(
            &self.keys.key(parent, RecordKind::Children),
            &encode_list(&children),
        )
        .await
    }

    /// Child list of a node, treating a missing record as empty.
    pub(crate) async fn children_or_empty(&self, path: &[String]) -> TreeResult<Vec<String>> {
        match self.get_children(path).await {
            Err(TreeError::NotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Delete all of a node's records. Does not touch the parent's list.
    pub(crate) async fn delete_records(&self, path: &[String]) -> TreeResult<()> {
        for kind in RecordKind::ALL {
            self.remove(&self.keys.key(path, kind)).await?;
        }
        debug!(path = %display_path(path), "deleted node records");
        Ok(())
    }

    async fn write_root(&self, value: &Value) -> TreeResult<()> {
        let root: [String; 0] = [];
        self.write(&self.keys.key(&root, RecordKind::Value), &canonical_json(value))
            .await?;
        self.write(&self.keys.key(&root, RecordKind::Children), "[]")
            .await
    }

    async fn read(&self, key: &str) -> TreeResult<Option<String>> {
        let context = format!("get {key}");
        Ok(with_retry(&context, &self.retry, || async { self.kv.get(key).await }).await?)
    }

    async fn write(&self, key: &str, value: &str) -> TreeResult<()> {
        let context = format!("put {key}");
        Ok(with_retry(&context, &self.retry, || async { self.kv.put(key, value).await }).await?)
    }

    async fn remove(&self, key: &str) -> TreeResult<()> {
        let context = format!("delete {key}");
        Ok(with_retry(&context, &self.retry, || async { self.kv.delete(key).await }).await?)
    }
}

impl std::fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStore")
            .field("prefix", &self.keys.prefix())
            .field("retry", &self.retry)
            .finish()
    }
}

fn encode_list(items: &[String]) -> String {
    canonical_json(&Value::from(items.to_vec()))
}

fn decode<T: DeserializeOwned>(key: &str, text: &str) -> TreeResult<T> {
    serde_json::from_str(text).map_err(|e| TreeError::CorruptRecord {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{faulty_tree, memory_tree, p};
    use kvtree_store::{Fault, KvOp};
    use serde_json::json;

    #[tokio::test]
    async fn initialize_root_is_idempotent() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        assert!(!nodes.node_exists(&[]).await);
        assert!(nodes.initialize_root().await.unwrap());
        assert!(!nodes.initialize_root().await.unwrap());
        assert_eq!(nodes.get_value(&[]).await.unwrap(), Value::Null);
        assert!(nodes.get_children(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn root_has_no_parent_record() {
        let (kv, tree) = memory_tree();
        tree.nodes().initialize_root().await.unwrap();
        assert_eq!(kv.len(), 2);
        let root: [String; 0] = [];
        let parent_key = tree.nodes().keys().key(&root, RecordKind::Parent);
        assert!(!kv.keys().contains(&parent_key));
    }

    #[tokio::test]
    async fn create_writes_three_records_and_links_parent() {
        let (kv, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        nodes.create_node(&p(&["a"]), &json!("v")).await.unwrap();

        assert!(nodes.node_exists(&p(&["a"])).await);
        assert_eq!(nodes.get_value(&p(&["a"])).await.unwrap(), json!("v"));
        assert_eq!(nodes.get_children(&[]).await.unwrap(), vec!["a"]);
        assert!(nodes.get_children(&p(&["a"])).await.unwrap().is_empty());
        assert_eq!(kv.len(), 5);

        let parent_key = nodes.keys().key(&p(&["a"]), RecordKind::Parent);
        assert_eq!(kv.get(&parent_key).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn create_root_twice_fails() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.create_node(&[], &json!({"root": true})).await.unwrap();
        let err = nodes.create_node(&[], &json!(1)).await.unwrap_err();
        assert!(matches!(err, TreeError::AlreadyExists { .. }));
        assert_eq!(nodes.get_value(&[]).await.unwrap(), json!({"root": true}));
    }

    #[tokio::test]
    async fn create_without_parent_fails() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        let err = nodes.create_node(&p(&["a", "b"]), &json!(1)).await.unwrap_err();
        assert!(matches!(err, TreeError::ParentMissing { .. }));
        assert!(!nodes.node_exists(&p(&["a", "b"])).await);
    }

    #[tokio::test]
    async fn child_list_is_deduplicated() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        nodes.create_node(&p(&["a"]), &json!(1)).await.unwrap();
        nodes.create_node(&p(&["a"]), &json!(2)).await.unwrap();
        nodes.add_child_to_parent(&[], "a").await.unwrap();

        assert_eq!(nodes.get_children(&[]).await.unwrap(), vec!["a"]);
        assert_eq!(nodes.get_value(&p(&["a"])).await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn remove_child_from_parent_keeps_others() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        for key in ["a", "b", "c"] {
            nodes.create_node(&p(&[key]), &Value::Null).await.unwrap();
        }
        nodes.remove_child_from_parent(&[], "b").await.unwrap();
        nodes.remove_child_from_parent(&[], "missing").await.unwrap();
        assert_eq!(nodes.get_children(&[]).await.unwrap(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn get_and_set_missing_node() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        assert!(nodes.get_value(&p(&["x"])).await.unwrap_err().is_not_found());
        assert!(nodes.get_children(&p(&["x"])).await.unwrap_err().is_not_found());
        assert!(nodes.set_value(&p(&["x"]), &json!(1)).await.unwrap_err().is_not_found());
        assert!(!nodes.node_exists(&p(&["x"])).await);
    }

    #[tokio::test]
    async fn set_value_overwrites() {
        let (_, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        nodes.create_node(&p(&["a"]), &json!({"v": 1})).await.unwrap();
        nodes.set_value(&p(&["a"]), &json!([1, 2, 3])).await.unwrap();
        assert_eq!(nodes.get_value(&p(&["a"])).await.unwrap(), json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn corrupt_value_record_is_reported() {
        let (kv, tree) = memory_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        nodes.create_node(&p(&["a"]), &json!(1)).await.unwrap();
        let key = nodes.keys().key(&p(&["a"]), RecordKind::Value);
        kv.put(&key, "{oops").await.unwrap();

        let err = nodes.get_value(&p(&["a"])).await.unwrap_err();
        assert!(matches!(err, TreeError::CorruptRecord { .. }));
        // Existence only looks at presence.
        assert!(nodes.node_exists(&p(&["a"])).await);
    }

    #[tokio::test]
    async fn node_exists_swallows_errors() {
        let (kv, tree) = faulty_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();

        kv.fail_next(KvOp::Get, Fault::Backend("denied".into()), 1);
        assert!(!nodes.node_exists(&[]).await);
        assert!(nodes.node_exists(&[]).await);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (kv, tree) = faulty_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        kv.reset_calls();

        kv.fail_next(KvOp::Put, Fault::RateLimited, 2);
        nodes.set_value(&[], &json!("after retry")).await.unwrap();
        assert_eq!(kv.calls(KvOp::Put), 3);
        assert_eq!(nodes.get_value(&[]).await.unwrap(), json!("after retry"));
    }

    #[tokio::test]
    async fn exhausted_retries_surface() {
        let (kv, tree) = faulty_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        kv.reset_calls();

        let root: [String; 0] = [];
        let key = nodes.keys().key(&root, RecordKind::Value);
        kv.fail_key(KvOp::Get, key, Fault::Status(503));
        let err = nodes.get_value(&[]).await.unwrap_err();
        assert!(matches!(err, TreeError::RetryExhausted { attempts: 5, .. }));
        assert_eq!(kv.calls(KvOp::Get), 5);
    }

    #[tokio::test]
    async fn fatal_store_errors_pass_through() {
        let (kv, tree) = faulty_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();
        kv.reset_calls();

        kv.fail_next(KvOp::Put, Fault::Status(400), 1);
        let err = nodes.set_value(&[], &json!(1)).await.unwrap_err();
        assert!(matches!(err, TreeError::Store(_)));
        assert_eq!(kv.calls(KvOp::Put), 1);
    }

    #[tokio::test]
    async fn partial_create_leaves_value_without_link() {
        let (kv, tree) = faulty_tree();
        let nodes = tree.nodes();
        nodes.initialize_root().await.unwrap();

        let root: [String; 0] = [];
        let root_children = nodes.keys().key(&root, RecordKind::Children);
        kv.fail_key(KvOp::Put, root_children, Fault::Backend("denied".into()));

        let err = nodes.create_node(&p(&["a"]), &json!(1)).await.unwrap_err();
        assert!(matches!(err, TreeError::Store(_)));
        assert!(nodes.node_exists(&p(&["a"])).await);
        assert!(nodes.get_children(&[]).await.unwrap().is_empty());
    }
}
