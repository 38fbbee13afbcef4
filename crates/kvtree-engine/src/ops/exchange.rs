//! Whole-subtree export to a nested value, and import back.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::TreeResult;
use crate::node::child_path;
use crate::tree::KvTree;

/// A node and its descendants as one serializable value.
///
/// ```json
/// {"value": "root", "children": {"a": {"value": 1}}}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedNode {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, ExportedNode>,
}

impl ExportedNode {
    pub fn leaf(value: Value) -> Self {
        Self {
            value,
            children: BTreeMap::new(),
        }
    }

    /// Number of nodes including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(ExportedNode::node_count)
            .sum::<usize>()
    }
}

type ExportFuture<'a> = Pin<Box<dyn Future<Output = TreeResult<ExportedNode>> + Send + 'a>>;

impl KvTree {
    /// Read the subtree at `start` into memory.
    pub async fn export_tree(&self, start: &[String]) -> TreeResult<ExportedNode> {
        self.export_at(start.to_vec()).await
    }

    fn export_at(&self, path: Vec<String>) -> ExportFuture<'_> {
        Box::pin(async move {
            let node = self.get_node(&path).await?;
            let mut children = BTreeMap::new();
            for child in node.children {
                let exported = self.export_at(child_path(&path, &child)).await?;
                children.insert(child, exported);
            }
            Ok(ExportedNode {
                value: node.value,
                children,
            })
        })
    }

    /// Write an exported tree into this tree, rooted at the root.
    ///
    /// The root is created if absent and its value replaced. Every other
    /// node is written parent first, siblings in key order: a node that
    /// already exists only has its value replaced and keeps its children, a
    /// missing one is created. Nodes absent from `data` are left alone.
    /// Returns the number of nodes written.
    pub async fn import_tree(&self, data: &ExportedNode) -> TreeResult<usize> {
        self.initialize_root().await?;
        self.set_value(&[], &data.value).await?;

        let mut written = 1;
        let mut pending: Vec<(Vec<String>, &ExportedNode)> = vec![(Vec::new(), data)];
        while let Some((path, node)) = pending.pop() {
            for (key, child) in &node.children {
                let path = child_path(&path, key);
                if self.node_exists(&path).await {
                    self.set_value(&path, &child.value).await?;
                } else {
                    self.create_node(&path, &child.value).await?;
                }
                written += 1;
                pending.push((path, child));
            }
        }

        info!(nodes = written, "imported tree");
        Ok(written)
    }
}
