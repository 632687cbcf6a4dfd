//! Browsing the remote tree.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::fs::node::RemoteNode;
use crate::fs::tree::TreeEvent;
use crate::session::Explorer;

impl Explorer {
    /// List the children of a folder, or of the space root when `parent` is `None`.
    ///
    /// Results are cached until the next refresh. Files have no children.
    ///
    /// # Example
    /// ```no_run
    /// # use spacefs::{Config, Explorer};
    /// # async fn example() -> spacefs::Result<()> {
    /// let mut explorer = Explorer::new(Config::from_env())?;
    /// for node in explorer.list_children(None).await? {
    ///     println!("{} {}", node.id, node.path);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_children(
        &mut self,
        parent: Option<&Arc<RemoteNode>>,
    ) -> Result<Vec<Arc<RemoteNode>>> {
        let cli = Arc::clone(self.cli());
        let result = self.tree.list_children(cli.as_ref(), parent).await;
        self.surface("List folder", result)
    }

    /// Parent of `node`, or `None` for top-level nodes.
    pub fn get_parent(&self, node: &RemoteNode) -> Option<Arc<RemoteNode>> {
        self.tree.get_parent(node)
    }

    /// Look up a cached node by id.
    pub fn cached_node(&self, id: &str) -> Option<Arc<RemoteNode>> {
        self.tree.cache().get(id)
    }

    /// Drop every cached listing for the current space.
    pub fn refresh(&mut self) {
        let space = self.space().clone();
        self.tree.refresh(space);
    }

    /// Receive a [`TreeEvent`] whenever the cache is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.tree.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::mock::{Reply, ScriptedCli};
    use crate::session::explorer::testing::harness;
    use serde_json::json;

    #[tokio::test]
    async fn test_listing_failure_is_surfaced() {
        let mut h = harness(ScriptedCli::new(|_| Reply::Fail("offline".to_string())), true);
        assert!(h.explorer.list_children(None).await.is_err());
        assert_eq!(h.prompter.errors(), vec!["List folder failed: offline"]);
    }

    #[tokio::test]
    async fn test_refresh_relists() {
        let mut h = harness(
            ScriptedCli::new(|_| Reply::Json(json!([{"id": 5, "name": "a", "type": "directory"}]))),
            true,
        );
        let root = h.explorer.list_children(None).await.unwrap();
        assert!(h.explorer.cached_node("5").is_some());
        assert!(h.explorer.get_parent(&root[0]).is_none());

        h.explorer.refresh();
        assert!(h.explorer.cached_node("5").is_none());
        h.explorer.list_children(None).await.unwrap();
        assert_eq!(h.cli.calls_for("ls").len(), 2);
    }
}
