//! Node snapshots and value encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node as read from the store at one moment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// The node's full path; empty for the root.
    pub path: Vec<String>,
    /// The stored value; `Value::Null` when created without one.
    pub value: Value,
    /// Child segment names in insertion order.
    pub children: Vec<String>,
}

impl NodeSnapshot {
    /// The node's own segment, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Path of the named child.
    pub fn child_path(&self, child: &str) -> Vec<String> {
        child_path(&self.path, child)
    }
}

/// A node to create in a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub path: Vec<String>,
    #[serde(default)]
    pub value: Value,
}

impl NodeSpec {
    pub fn new(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// Serialize a value deterministically.
///
/// `serde_json` keeps object keys in a sorted map (the `preserve_order`
/// feature is not enabled in this workspace), so equal values always produce
/// identical bytes, with keys sorted at every nesting level.
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}

/// Human-readable rendering of a path for logs and errors: `/a/b`, or `/`
/// for the root. Not an escaped path; use `kvtree_path::create_path` for that.
pub fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

pub(crate) fn child_path(parent: &[String], child: &str) -> Vec<String> {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(child.to_string());
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let a = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonical_json(&a), r#"{"a":{"c":3,"d":2},"b":1}"#);
        assert_eq!(canonical_json(&json!([3, 1, 2])), "[3,1,2]");
        assert_eq!(canonical_json(&json!("v")), "\"v\"");
        assert_eq!(canonical_json(&Value::Null), "null");
    }

    #[test]
    fn equal_values_serialize_identically() {
        let one: Value = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let two: Value = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        assert_eq!(canonical_json(&one), canonical_json(&two));
    }

    #[test]
    fn snapshot_helpers() {
        let node = NodeSnapshot {
            path: vec!["a".into(), "b".into()],
            value: json!(1),
            children: vec![],
        };
        assert_eq!(node.key(), Some("b"));
        assert!(node.is_leaf());
        assert_eq!(node.child_path("c"), vec!["a", "b", "c"]);

        let root = NodeSnapshot {
            path: vec![],
            value: Value::Null,
            children: vec!["a".into()],
        };
        assert_eq!(root.key(), None);
        assert!(!root.is_leaf());
    }

    #[test]
    fn display_paths() {
        assert_eq!(display_path(&[]), "/");
        assert_eq!(display_path(&["a".to_string(), "b".to_string()]), "/a/b");
    }
}
