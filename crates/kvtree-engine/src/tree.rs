use std::sync::Arc;

use kvtree_path::{create_path, parse_path};
use kvtree_store::KvStore;
use serde_json::Value;

use crate::config::TreeConfig;
use crate::error::TreeResult;
use crate::node::NodeSnapshot;
use crate::store::NodeStore;

/// A tree stored in a flat key-value store.
///
/// All operations take segment paths; the empty slice is the root. Use
/// [`parse_path`](Self::parse_path) to turn a typed path string into
/// segments with the configured escape schemes.
///
/// Tree-wide operations live in [`crate::ops`]: delete, move, traversal,
/// find, stats, batch create, import and export.
pub struct KvTree {
    nodes: NodeStore,
    config: TreeConfig,
}

impl KvTree {
    pub fn new(kv: Arc<dyn KvStore>, config: TreeConfig) -> Self {
        let nodes = NodeStore::new(kv, config.key_deriver(), config.retry_policy());
        Self { nodes, config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The node-level primitives this tree is built on.
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// Split a path string into segments using the configured escapes.
    pub fn parse_path(&self, input: &str) -> Vec<String> {
        parse_path(input, &self.config.escapes)
    }

    /// Render segments as a path string using the configured escapes.
    pub fn format_path(&self, path: &[String]) -> String {
        create_path(path, &self.config.escapes)
    }

    // ---- Node operations ----

    /// Create the root if absent. Returns `true` if this call created it.
    pub async fn initialize_root(&self) -> TreeResult<bool> {
        self.nodes.initialize_root().await
    }

    /// Whether the node exists. Read failures report `false`.
    pub async fn node_exists(&self, path: &[String]) -> bool {
        self.nodes.node_exists(path).await
    }

    pub async fn create_node(&self, path: &[String], value: &Value) -> TreeResult<()> {
        self.nodes.create_node(path, value).await
    }

    pub async fn get_value(&self, path: &[String]) -> TreeResult<Value> {
        self.nodes.get_value(path).await
    }

    pub async fn set_value(&self, path: &[String], value: &Value) -> TreeResult<()> {
        self.nodes.set_value(path, value).await
    }

    pub async fn get_children(&self, path: &[String]) -> TreeResult<Vec<String>> {
        self.nodes.get_children(path).await
    }

    pub async fn get_node(&self, path: &[String]) -> TreeResult<NodeSnapshot> {
        self.nodes.get_node(path).await
    }
}

impl std::fmt::Debug for KvTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvTree")
            .field("nodes", &self.nodes)
            .field("escapes", &self.config.escapes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_tree, p};
    use kvtree_path::EscapeSchemes;
    use kvtree_store::InMemoryKvStore;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_read_back() {
        let (_, tree) = memory_tree();
        tree.initialize_root().await.unwrap();
        tree.create_node(&p(&["a"]), &json!("v")).await.unwrap();

        assert!(tree.node_exists(&p(&["a"])).await);
        assert_eq!(tree.get_value(&p(&["a"])).await.unwrap(), json!("v"));
        assert!(tree.get_children(&[]).await.unwrap().contains(&"a".to_string()));

        let node = tree.get_node(&p(&["a"])).await.unwrap();
        assert_eq!(node.path, p(&["a"]));
        assert!(node.is_leaf());
    }

    #[tokio::test]
    async fn parsed_paths_address_nodes() {
        let (_, tree) = memory_tree();
        tree.initialize_root().await.unwrap();
        let path = tree.parse_path("a\\/b");
        assert_eq!(path, vec!["a/b"]);
        tree.create_node(&path, &json!(1)).await.unwrap();

        // "a/b" as one segment is not the path a -> b.
        assert!(!tree.node_exists(&p(&["a", "b"])).await);
        assert_eq!(tree.format_path(&path), "a\\/b");
    }

    #[test]
    fn escapes_follow_config() {
        let config = TreeConfig {
            escapes: EscapeSchemes::none(),
            ..TreeConfig::default()
        };
        let tree = KvTree::new(Arc::new(InMemoryKvStore::new()), config);
        assert_eq!(tree.parse_path("a%2Fb"), vec!["a%2Fb"]);
    }

    #[tokio::test]
    async fn prefixes_isolate_trees_in_one_store() {
        let kv = Arc::new(InMemoryKvStore::new());
        let one = KvTree::new(kv.clone(), TreeConfig { prefix: "one".into(), ..TreeConfig::default() });
        let two = KvTree::new(kv.clone(), TreeConfig { prefix: "two".into(), ..TreeConfig::default() });

        one.initialize_root().await.unwrap();
        one.create_node(&p(&["a"]), &json!(1)).await.unwrap();
        assert!(!two.node_exists(&[]).await);
        assert!(two.initialize_root().await.unwrap());
        assert!(two.get_children(&[]).await.unwrap().is_empty());
        assert!(kv.keys().iter().all(|k| k.starts_with("one-") || k.starts_with("two-")));
    }
}
