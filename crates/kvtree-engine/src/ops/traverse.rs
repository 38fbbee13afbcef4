//! Depth-first and breadth-first walks with pruning and a depth limit.
//!
//! Traversal keeps its own stack or queue instead of recursing, so deep trees
//! cannot overflow the async call stack. Each visited node is one
//! `get_value` plus one `get_children`.

use std::collections::VecDeque;

use crate::error::TreeResult;
use crate::node::NodeSnapshot;
use crate::tree::KvTree;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalStrategy {
    /// Pre-order; children in stored order.
    #[default]
    DepthFirst,
    /// Level by level; children in stored order.
    BreadthFirst,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraverseOptions {
    pub strategy: TraversalStrategy,
    /// Nodes deeper than this (relative to the start, which is depth 0) are
    /// not visited.
    pub max_depth: Option<usize>,
    /// Accepted for compatibility; every node is visited either way.
    pub include_internal: bool,
}

impl Default for TraverseOptions {
    fn default() -> Self {
        Self {
            strategy: TraversalStrategy::DepthFirst,
            max_depth: None,
            include_internal: true,
        }
    }
}

impl TraverseOptions {
    pub fn breadth_first() -> Self {
        Self {
            strategy: TraversalStrategy::BreadthFirst,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// What the walk does after a visitor returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Skip this node's descendants.
    Prune,
}

impl From<bool> for Visit {
    /// `true` continues, `false` prunes.
    fn from(descend: bool) -> Self {
        if descend {
            Visit::Continue
        } else {
            Visit::Prune
        }
    }
}

impl KvTree {
    /// Walk the subtree at `start`, calling `visitor` with each node and its
    /// depth relative to `start`.
    ///
    /// A child that is listed but has no value record is skipped along with
    /// its descendants. A node whose value exists but whose children record
    /// is missing fails the walk with [`NotFound`](crate::TreeError::NotFound), as does any
    /// other read failure.
    pub async fn traverse<F>(
        &self,
        start: &[String],
        options: &TraverseOptions,
        mut visitor: F,
    ) -> TreeResult<()>
    where
        F: FnMut(&NodeSnapshot, usize) -> Visit,
    {
        let mut pending = VecDeque::from([(start.to_vec(), 0usize)]);

        loop {
            let next = match options.strategy {
                TraversalStrategy::DepthFirst => pending.pop_back(),
                TraversalStrategy::BreadthFirst => pending.pop_front(),
            };
            let Some((path, depth)) = next else {
                break;
            };

            let value = match self.get_value(&path).await {
                Ok(value) => value,
                Err(e) if e.is_not_found() && depth > 0 => continue,
                Err(e) => return Err(e),
            };
            let children = self.get_children(&path).await?;
            let node = NodeSnapshot {
                path,
                value,
                children,
            };

            if visitor(&node, depth) == Visit::Prune {
                continue;
            }
            if options.max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            let children = node.children.iter().map(|c| (node.child_path(c), depth + 1));
            match options.strategy {
                // Reversed so the first child is popped first.
                TraversalStrategy::DepthFirst => {
                    for entry in children.rev() {
                        pending.push_back(entry);
                    }
                }
                TraversalStrategy::BreadthFirst => pending.extend(children),
            }
        }
        Ok(())
    }

    /// All nodes in the subtree at `start`, in depth-first order, for which
    /// `predicate` holds.
    pub async fn find_nodes<F>(&self, start: &[String], mut predicate: F) -> TreeResult<Vec<NodeSnapshot>>
    where
        F: FnMut(&NodeSnapshot) -> bool,
    {
        let mut found = Vec::new();
        self.traverse(start, &TraverseOptions::default(), |node, _| {
            if predicate(node) {
                found.push(node.clone());
            }
            Visit::Continue
        })
        .await?;
        Ok(found)
    }
}
