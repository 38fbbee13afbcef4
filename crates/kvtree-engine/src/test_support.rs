use std::sync::Arc;

use kvtree_store::{FaultyKvStore, InMemoryKvStore};
use serde_json::json;

use crate::config::TreeConfig;
use crate::tree::KvTree;

/// Default configuration with millisecond retry delays.
pub(crate) fn fast_config() -> TreeConfig {
    TreeConfig {
        base_retry_delay_ms: 1,
        max_retry_delay_ms: 5,
        ..TreeConfig::default()
    }
}

pub(crate) fn memory_tree() -> (Arc<InMemoryKvStore>, KvTree) {
    let kv = Arc::new(InMemoryKvStore::new());
    let tree = KvTree::new(kv.clone(), fast_config());
    (kv, tree)
}

pub(crate) fn faulty_tree() -> (Arc<FaultyKvStore<InMemoryKvStore>>, KvTree) {
    let kv = Arc::new(FaultyKvStore::new(InMemoryKvStore::new()));
    let tree = KvTree::new(kv.clone(), fast_config());
    (kv, tree)
}

pub(crate) fn p(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

/// Populate a tree with three levels:
///
/// ```text
/// /            root
/// ├── a        {"n": "a"}
/// │   ├── b    "b"
/// │   │   └── d  4
/// │   └── c    "c"
/// └── e        null
/// ```
pub(crate) async fn seed(tree: &KvTree) {
    tree.initialize_root().await.unwrap();
    tree.set_value(&[], &json!("root")).await.unwrap();
    tree.create_node(&p(&["a"]), &json!({"n": "a"})).await.unwrap();
    tree.create_node(&p(&["a", "b"]), &json!("b")).await.unwrap();
    tree.create_node(&p(&["a", "c"]), &json!("c")).await.unwrap();
    tree.create_node(&p(&["a", "b", "d"]), &json!(4)).await.unwrap();
    tree.create_node(&p(&["e"]), &serde_json::Value::Null).await.unwrap();
}
