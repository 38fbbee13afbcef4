use std::collections::VecDeque;

use tracing::{info, warn};

use crate::error::{MovePhase, TreeError, TreeResult};
use crate::node::{child_path, display_path};
use crate::tree::KvTree;

impl KvTree {
    /// Move the subtree at `source` under `target_parent` as `new_key`.
    /// Returns the new path.
    ///
    /// Keys are derived from full paths, so a move is a copy of every node
    /// followed by a recursive delete of the source. If the copy fails, the
    /// partial destination is deleted on a best-effort basis and the error
    /// is reported as [`TreeError::MoveFailed`] in [`MovePhase::Copy`]. If
    /// removing the source fails, the complete copy is kept and both
    /// subtrees exist.
    pub async fn move_node(
        &self,
        source: &[String],
        target_parent: &[String],
        new_key: &str,
    ) -> TreeResult<Vec<String>> {
        if source.is_empty() {
            return Err(TreeError::InvalidOperation("cannot move the root node".into()));
        }
        if new_key.is_empty() {
            return Err(TreeError::InvalidOperation("new key must not be empty".into()));
        }
        if target_parent.starts_with(source) {
            return Err(TreeError::InvalidOperation(format!(
                "cannot move {} into its own subtree",
                display_path(source)
            )));
        }
        if !self.node_exists(source).await {
            return Err(TreeError::not_found(source));
        }
        if !self.node_exists(target_parent).await {
            return Err(TreeError::parent_missing(target_parent));
        }
        let destination = child_path(target_parent, new_key);
        if self.node_exists(&destination).await {
            return Err(TreeError::already_exists(&destination));
        }

        if let Err(err) = self.copy_subtree(source, &destination).await {
            let cleanup = match self.delete_node(&destination).await {
                Ok(_) => None,
                Err(e) if e.is_not_found() => None,
                Err(e) => {
                    warn!(
                        path = %display_path(&destination),
                        error = %e,
                        "failed to clean up partial move"
                    );
                    Some(Box::new(e))
                }
            };
            return Err(TreeError::MoveFailed {
                from: display_path(source),
                to: display_path(&destination),
                phase: MovePhase::Copy,
                source: Box::new(err),
                cleanup,
            });
        }

        if let Err(err) = self.delete_node(source).await {
            return Err(TreeError::MoveFailed {
                from: display_path(source),
                to: display_path(&destination),
                phase: MovePhase::RemoveSource,
                source: Box::new(err),
                cleanup: None,
            });
        }

        info!(
            from = %display_path(source),
            to = %display_path(&destination),
            "moved subtree"
        );
        Ok(destination)
    }

    /// Recreate every node under `source` at the same relative position
    /// under `destination`, parents before children.
    async fn copy_subtree(&self, source: &[String], destination: &[String]) -> TreeResult<()> {
        let mut queue = VecDeque::from([(source.to_vec(), destination.to_vec())]);
        while let Some((from, to)) = queue.pop_front() {
            let value = self.get_value(&from).await?;
            self.create_node(&to, &value).await?;
            for child in self.nodes().children_or_empty(&from).await? {
                queue.push_back((child_path(&from, &child), child_path(&to, &child)));
            }
        }
        Ok(())
    }
}
