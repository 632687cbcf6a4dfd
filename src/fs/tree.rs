//! Lazily populated tree over the remote store.
//!
//! Children are fetched on first expansion and memoised until the next
//! [`TreeProvider::refresh`], which drops the whole cache. There is no
//! incremental patching: the remote side exposes no change tokens to diff
//! against, so every view is rebuilt from a fresh listing.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::cache::NodeCache;
use super::node::RemoteNode;
use super::operations::utils::remote_dirname;
use crate::cli::args::{CliArgs, LS};
use crate::cli::CliBackend;
use crate::error::{Result, SpaceFsError};
use crate::space::Space;

/// Change notification emitted by the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The cache was dropped; every expanded view must be re-listed.
    Refreshed { space: Space },
}

#[derive(Debug)]
pub struct TreeProvider {
    cache: NodeCache,
    space: Space,
    events: broadcast::Sender<TreeEvent>,
}

impl TreeProvider {
    pub fn new(space: Space) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            cache: NodeCache::new(),
            space,
            events,
        }
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.events.subscribe()
    }

    /// Children of `parent`, or of the root when `parent` is `None`.
    ///
    /// Files have no children and never hit the CLI.
    pub async fn list_children(
        &mut self,
        cli: &dyn CliBackend,
        parent: Option<&Arc<RemoteNode>>,
    ) -> Result<Vec<Arc<RemoteNode>>> {
        if let Some(parent) = parent {
            if parent.is_file() {
                return Ok(Vec::new());
            }
        }

        let parent_id = parent.map(|p| p.id.as_str());
        if let Some(children) = self.cache.children(parent_id) {
            return Ok(children);
        }

        let nodes: Vec<Arc<RemoteNode>> = fetch_listing(cli, &self.space, parent)
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();
        self.cache.insert_children(parent_id, &nodes);
        Ok(nodes)
    }

    /// Parent of `node`.
    ///
    /// The stored back-reference is authoritative. Only when it is missing
    /// (or no longer alive) is the parent looked up in the cache by path.
    pub fn get_parent(&self, node: &RemoteNode) -> Option<Arc<RemoteNode>> {
        if let Some(parent) = node.parent() {
            return Some(parent);
        }

        let parent_path = remote_dirname(&node.path);
        if parent_path == "/" {
            return None;
        }
        debug!(path = %node.path, "resolving parent by path");
        self.cache.find_by_path(&parent_path)
    }

    /// Drop the whole cache, switch to `space`, and notify subscribers.
    pub fn refresh(&mut self, space: Space) {
        debug!(%space, cached = self.cache.len(), "refreshing tree");
        self.cache.clear();
        self.space = space.clone();
        let _ = self.events.send(TreeEvent::Refreshed { space });
    }
}

/// List one remote directory (or the root) through the CLI.
pub(crate) async fn fetch_listing(
    cli: &dyn CliBackend,
    space: &Space,
    parent: Option<&Arc<RemoteNode>>,
) -> Result<Vec<RemoteNode>> {
    let args = CliArgs::new(LS)
        .folder(parent.map(|p| p.id.as_str()))
        .space(space);
    let response = cli.invoke(args.into_vec()).await?;

    let items = listing_items(&response)?;
    let mut nodes = Vec::with_capacity(items.len());
    for item in items {
        match RemoteNode::from_json(item, parent) {
            Some(node) => nodes.push(node),
            None => debug!(%item, "skipping unrecognised listing entry"),
        }
    }
    Ok(nodes)
}

/// Entries of an `ls` response: a bare array, or an object wrapping one.
pub(crate) fn listing_items(response: &Value) -> Result<&[Value]> {
    if let Some(items) = response.as_array() {
        return Ok(items.as_slice());
    }
    ["items", "entries", "files"]
        .iter()
        .find_map(|key| response.get(*key).and_then(|v| v.as_array()))
        .map(Vec::as_slice)
        .ok_or_else(|| SpaceFsError::CliProtocol("expected a listing array".to_string()))
}
