//! Drag and drop onto the tree.
//!
//! A drop carries either nodes dragged within the tree, which become moves,
//! or a `text/uri-list` from the local desktop, which becomes an upload. When
//! a transfer carries both, the in-tree nodes win.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use super::upload::UploadOutcome;
use crate::cancel::CancelToken;
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::progress::ProgressCallback;
use crate::prompt::Notice;
use crate::session::Explorer;

/// MIME type of node references dragged inside the tree.
pub const TREE_MIME: &str = "application/vnd.spacefs.tree";
/// MIME type of dropped local files (RFC 2483).
pub const URI_LIST_MIME: &str = "text/uri-list";

#[derive(Debug, Clone)]
pub enum TransferItem {
    Nodes(Vec<Arc<RemoteNode>>),
    Text(String),
}

/// The typed items a drag carries, keyed by MIME type.
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    items: Vec<(String, TransferItem)>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the item for `mime`, replacing any earlier one.
    pub fn set(&mut self, mime: &str, item: TransferItem) {
        match self.items.iter_mut().find(|(m, _)| m.eq_ignore_ascii_case(mime)) {
            Some(slot) => slot.1 = item,
            None => self.items.push((mime.to_string(), item)),
        }
    }

    pub fn with(mut self, mime: &str, item: TransferItem) -> Self {
        self.set(mime, item);
        self
    }

    pub fn get(&self, mime: &str) -> Option<&TransferItem> {
        self.items
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(mime))
            .map(|(_, item)| item)
    }

    /// Drag started inside the tree.
    pub fn from_nodes(nodes: Vec<Arc<RemoteNode>>) -> Self {
        Self::new().with(TREE_MIME, TransferItem::Nodes(nodes))
    }

    /// Drag of local files from outside.
    pub fn from_uri_list(text: impl Into<String>) -> Self {
        Self::new().with(URI_LIST_MIME, TransferItem::Text(text.into()))
    }
}

/// What a drop asks for.
#[derive(Debug, Clone)]
pub enum DropPayload {
    /// Nodes from this tree, to be moved.
    Internal(Vec<Arc<RemoteNode>>),
    /// Local resources, to be uploaded.
    External(Vec<Url>),
}

impl DropPayload {
    /// Pick the payload out of a transfer. `None` when it carries nothing usable.
    pub fn from_transfer(transfer: &DataTransfer) -> Option<Self> {
        if let Some(TransferItem::Nodes(nodes)) = transfer.get(TREE_MIME) {
            if !nodes.is_empty() {
                return Some(DropPayload::Internal(nodes.clone()));
            }
        }
        if let Some(TransferItem::Text(text)) = transfer.get(URI_LIST_MIME) {
            let uris = parse_uri_list(text);
            if !uris.is_empty() {
                return Some(DropPayload::External(uris));
            }
        }
        None
    }
}

/// Parse a `text/uri-list` body: one URI per line, `#` lines are comments.
pub fn parse_uri_list(text: &str) -> Vec<Url> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Url::parse(line) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(line, "ignoring malformed URI: {}", e);
                None
            }
        })
        .collect()
}

/// Local paths for the `file:` URIs in `uris`; anything else is skipped.
pub fn local_paths(uris: &[Url]) -> Vec<PathBuf> {
    uris.iter()
        .filter_map(|uri| {
            if uri.scheme() != "file" {
                warn!(%uri, "ignoring non-file URI");
                return None;
            }
            match uri.to_file_path() {
                Ok(path) => Some(path),
                Err(()) => {
                    warn!(%uri, "URI has no local path");
                    None
                }
            }
        })
        .collect()
}

/// Result of a handled drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved { moved: usize, failed: usize },
    Uploaded(UploadOutcome),
    /// The user declined the upload.
    Declined,
    /// Nothing in the payload could be acted on.
    Ignored,
}

impl Explorer {
    /// Apply a drop onto `target` (a folder, or the space root when `None`).
    pub async fn handle_drop(
        &mut self,
        target: Option<&Arc<RemoteNode>>,
        payload: DropPayload,
        progress: ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<DropOutcome> {
        if let Some(target) = target {
            if target.is_file() {
                return self.surface(
                    "Drop",
                    Err(SpaceFsError::Validation(format!(
                        "Cannot drop onto file '{}'",
                        target.label
                    ))),
                );
            }
        }

        match payload {
            DropPayload::Internal(sources) => Ok(self.drop_nodes(target, &sources).await),
            DropPayload::External(uris) => {
                let Some((paths, destination)) = self.prepare_external_drop(target, &uris).await
                else {
                    return Ok(DropOutcome::Declined);
                };
                if paths.is_empty() {
                    return Ok(DropOutcome::Ignored);
                }
                self.upload(paths, destination, progress, cancel)
                    .await
                    .map(DropOutcome::Uploaded)
            }
        }
    }

    /// Move each source into `target`, carrying on past failures.
    async fn drop_nodes(
        &mut self,
        target: Option<&Arc<RemoteNode>>,
        sources: &[Arc<RemoteNode>],
    ) -> DropOutcome {
        let mut moved = 0;
        let mut failed = 0;
        for source in sources {
            match self.move_one(source, target.map(|t| t.as_ref())).await {
                Ok(_) => moved += 1,
                Err(e) => {
                    failed += 1;
                    warn!(source = %source.path, "move failed: {}", e);
                    self.prompter().notify(Notice::Error(
                        e.user_message(&format!("Move '{}'", source.label)),
                    ));
                }
            }
        }
        info!(moved, failed, "drop handled");
        self.refresh();
        DropOutcome::Moved { moved, failed }
    }

    /// Resolve local paths and the destination folder, and ask for
    /// confirmation. `None` when the user declines.
    pub(crate) async fn prepare_external_drop(
        &self,
        target: Option<&Arc<RemoteNode>>,
        uris: &[Url],
    ) -> Option<(Vec<PathBuf>, Option<String>)> {
        let paths = local_paths(uris);
        if paths.is_empty() {
            self.prompter().notify(Notice::Warning(
                "Nothing to upload: no local files were dropped".to_string(),
            ));
            return Some((paths, None));
        }

        let destination = self.destination_folder(target.map(|t| t.as_ref()));
        let where_to = target.map(|t| t.path.as_str()).unwrap_or("/");
        let question = format!("Upload {} item(s) to {}?", paths.len(), where_to);
        if !self.prompter().confirm(&question).await {
            return None;
        }
        Some((paths, destination))
    }
}
