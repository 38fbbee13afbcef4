use tracing::debug;

use crate::error::TreeResult;
use crate::node::NodeSpec;
use crate::tree::KvTree;

impl KvTree {
    /// Create many nodes, shallowest first. Returns how many were created.
    ///
    /// Specs are stably sorted by path length, so a parent listed anywhere
    /// in the batch is created before its children. A child whose parent is
    /// neither in the batch nor in the tree fails with
    /// [`ParentMissing`](crate::TreeError::ParentMissing); nodes created
    /// before the failure stay.
    pub async fn batch_create_nodes(&self, mut specs: Vec<NodeSpec>) -> TreeResult<usize> {
        specs.sort_by_key(|spec| spec.path.len());
        for spec in &specs {
            self.create_node(&spec.path, &spec.value).await?;
        }
        debug!(count = specs.len(), "batch created nodes");
        Ok(specs.len())
    }
}
