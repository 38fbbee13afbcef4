use std::collections::VecDeque;

use tracing::info;

use crate::error::{TreeError, TreeResult};
use crate::node::{child_path, display_path};
use crate::tree::KvTree;

impl KvTree {
    /// Delete a node and its whole subtree. Returns the number of nodes
    /// removed.
    ///
    /// Descendants are collected breadth-first and deleted deepest first, so
    /// an interrupted delete never leaves a child without its parent. The
    /// parent's child list is updated last.
    pub async fn delete_node(&self, path: &[String]) -> TreeResult<usize> {
        let Some((key, parent)) = path.split_last() else {
            return Err(TreeError::InvalidOperation(
                "cannot delete the root node".into(),
            ));
        };
        if !self.node_exists(path).await {
            return Err(TreeError::not_found(path));
        }

        let order = self.collect_subtree(path).await?;
        for node in order.iter().rev() {
            self.nodes().delete_records(node).await?;
        }
        self.nodes().remove_child_from_parent(parent, key).await?;

        info!(path = %display_path(path), removed = order.len(), "deleted subtree");
        Ok(order.len())
    }

    /// Paths of `start` and all its descendants in breadth-first order.
    pub(crate) async fn collect_subtree(&self, start: &[String]) -> TreeResult<Vec<Vec<String>>> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start.to_vec()]);
        while let Some(path) = queue.pop_front() {
            for child in self.nodes().children_or_empty(&path).await? {
                queue.push_back(child_path(&path, &child));
            }
            order.push(path);
        }
        Ok(order)
    }
}
