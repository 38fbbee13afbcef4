use serde::Serialize;

use crate::error::TreeResult;
use crate::node::canonical_json;
use crate::ops::traverse::{TraverseOptions, Visit};
use crate::tree::KvTree;

/// Shape and size of a subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub node_count: usize,
    /// Nodes with an empty child list.
    pub leaf_count: usize,
    pub internal_node_count: usize,
    /// Deepest level reached, relative to the start node (depth 0).
    pub max_depth: usize,
    /// Sum of the serialized value lengths in bytes. Approximate: record
    /// keys and child lists are not counted.
    pub total_size: usize,
}

impl KvTree {
    pub async fn get_stats(&self, start: &[String]) -> TreeResult<TreeStats> {
        let mut stats = TreeStats::default();
        self.traverse(start, &TraverseOptions::default(), |node, depth| {
            stats.node_count += 1;
            if node.is_leaf() {
                stats.leaf_count += 1;
            }
            stats.max_depth = stats.max_depth.max(depth);
            stats.total_size += canonical_json(&node.value).len();
            Visit::Continue
        })
        .await?;
        stats.internal_node_count = stats.node_count - stats.leaf_count;
        Ok(stats)
    }
}
