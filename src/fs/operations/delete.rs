//! Recursive remote folder removal.
//!
//! The folder is first walked depth-first, listing every directory exactly
//! once, into an ordered list of steps: each directory's files and
//! subdirectories (recursively) come before the directory itself. The step
//! count is the progress total, fixed before anything is deleted, and a single
//! counter advances against it as steps complete.
//!
//! Cancellation is checked between steps only; a delete that is already in
//! flight always completes. On failure nothing is rolled back, and running
//! the removal again on the same folder converges.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::cli::args::{CliArgs, RM, RMDIR};
use crate::cli::CliBackend;
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::fs::tree::fetch_listing;
use crate::progress::{ProgressCallback, TransferProgress};
use crate::session::Explorer;
use crate::space::Space;

/// Nesting depth at which the walk gives up.
const MAX_DEPTH: usize = 100;

#[derive(Debug)]
enum DeleteStep {
    File(RemoteNode),
    Directory(Arc<RemoteNode>),
}

impl DeleteStep {
    fn label(&self) -> &str {
        match self {
            DeleteStep::File(node) => &node.path,
            DeleteStep::Directory(node) => &node.path,
        }
    }
}

/// Counts of what a finished removal deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteSummary {
    pub files: u64,
    /// Includes the removed folder itself.
    pub directories: u64,
}

/// Depth-first removal of one remote folder.
pub struct RecursiveDelete<'a> {
    cli: &'a dyn CliBackend,
    space: &'a Space,
    cancel: &'a CancelToken,
}

impl<'a> RecursiveDelete<'a> {
    pub fn new(cli: &'a dyn CliBackend, space: &'a Space, cancel: &'a CancelToken) -> Self {
        Self { cli, space, cancel }
    }

    /// Remove `folder` and everything below it.
    pub async fn run(
        &self,
        folder: Arc<RemoteNode>,
        progress: &mut ProgressCallback,
    ) -> Result<DeleteSummary> {
        if !folder.is_directory() {
            return Err(SpaceFsError::Validation(format!(
                "'{}' is not a folder",
                folder.label
            )));
        }

        let mut steps = Vec::new();
        self.plan(Arc::clone(&folder), &mut steps, 0).await?;
        let total = steps.len() as u64;
        info!(folder = %folder.path, total, "deleting folder");

        let mut summary = DeleteSummary::default();
        for (done, step) in steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(folder = %folder.path, done, total, "folder deletion cancelled");
                return Err(SpaceFsError::Cancelled);
            }

            match step {
                DeleteStep::File(node) => {
                    self.delete_file(node).await?;
                    summary.files += 1;
                }
                DeleteStep::Directory(node) => {
                    self.remove_directory(node).await?;
                    summary.directories += 1;
                }
            }
            progress(&TransferProgress::new(done as u64 + 1, total, step.label()));
        }

        info!(folder = %folder.path, files = summary.files, directories = summary.directories, "folder deleted");
        Ok(summary)
    }

    fn plan<'s>(
        &'s self,
        dir: Arc<RemoteNode>,
        steps: &'s mut Vec<DeleteStep>,
        depth: usize,
    ) -> BoxFuture<'s, Result<()>> {
        async move {
            if depth > MAX_DEPTH {
                return Err(SpaceFsError::RemoteDelete {
                    id: dir.id.clone(),
                    message: "folder nesting is too deep".to_string(),
                });
            }
            if self.cancel.is_cancelled() {
                return Err(SpaceFsError::Cancelled);
            }

            let children = fetch_listing(self.cli, self.space, Some(&dir)).await?;
            debug!(folder = %dir.path, entries = children.len(), "listed folder for deletion");
            for child in children {
                if child.is_directory() {
                    self.plan(Arc::new(child), &mut *steps, depth + 1).await?;
                } else {
                    steps.push(DeleteStep::File(child));
                }
            }
            steps.push(DeleteStep::Directory(dir));
            Ok(())
        }
        .boxed()
    }

    /// Delete one file, retrying once under its alternate id.
    async fn delete_file(&self, node: &RemoteNode) -> Result<()> {
        let primary = self.invoke_rm(&node.id).await;
        let primary_err = match primary {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        let Some(alt) = node.fallback_id() else {
            warn!(id = %node.id, path = %node.path, "file delete failed: {}", primary_err);
            return Err(SpaceFsError::RemoteDelete {
                id: node.id.clone(),
                message: primary_err.to_string(),
            });
        };

        warn!(id = %node.id, alt, "file delete failed, retrying with alternate id: {}", primary_err);
        self.invoke_rm(alt).await.map_err(|fallback_err| SpaceFsError::RemoteDelete {
            id: node.id.clone(),
            message: format!("{}; retry as {} failed: {}", primary_err, alt, fallback_err),
        })
    }

    async fn remove_directory(&self, node: &RemoteNode) -> Result<()> {
        let args = CliArgs::new(RMDIR).arg(&node.id).space(self.space);
        self.cli
            .invoke(args.into_vec())
            .await
            .map(|_| ())
            .map_err(|e| SpaceFsError::RemoteDelete {
                id: node.id.clone(),
                message: e.to_string(),
            })
    }

    async fn invoke_rm(&self, id: &str) -> Result<()> {
        let args = CliArgs::new(RM).arg(id).space(self.space);
        self.cli.invoke(args.into_vec()).await.map(|_| ())
    }
}

impl Explorer {
    /// Remove a folder and its whole subtree after confirmation.
    ///
    /// Returns `None` when the user declines. The tree is refreshed whether
    /// or not the removal succeeded, since a failure can leave it partially
    /// deleted.
    pub async fn remove_folder(
        &mut self,
        folder: &Arc<RemoteNode>,
        mut progress: ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<Option<DeleteSummary>> {
        if !folder.is_directory() {
            return self.surface(
                "Delete folder",
                Err(SpaceFsError::Validation(format!("'{}' is not a folder", folder.label))),
            );
        }
        let question = format!("Delete folder '{}' and everything in it?", folder.label);
        if !self.prompter().confirm(&question).await {
            return Ok(None);
        }

        let result = {
            let space = self.space().clone();
            let cli = Arc::clone(self.cli());
            RecursiveDelete::new(cli.as_ref(), &space, cancel)
                .run(Arc::clone(folder), &mut progress)
                .await
        };
        self.refresh();
        self.surface("Delete folder", result.map(Some))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::mock::{Reply, ScriptedCli, flag_value};
    use crate::progress::no_progress;
    use parking_lot::Mutex;
    use serde_json::json;

    /// /top (10) holds a.txt, sub/ (11) and b.txt; sub holds c.txt.
    fn tree_cli(fail_rm: &'static [&'static str]) -> ScriptedCli {
        ScriptedCli::new(move |args| match args[0].as_str() {
            "ls" => match flag_value(args, "-folder-id") {
                Some("10") => Reply::Json(json!([
                    {"id": 1, "uid": "ua", "name": "a.txt", "type": "file"},
                    {"id": 11, "name": "sub", "type": "directory"},
                    {"id": 2, "uid": "ub", "name": "b.txt", "type": "file"}
                ])),
                Some("11") => Reply::Json(json!([
                    {"id": 3, "uid": "uc", "name": "c.txt", "type": "file"}
                ])),
                _ => Reply::Json(json!([])),
            },
            "rm" if fail_rm.contains(&args[1].as_str()) => Reply::Fail("not found".to_string()),
            _ => Reply::Json(json!({"ok": true})),
        })
    }

    fn top() -> Arc<RemoteNode> {
        Arc::new(RemoteNode::directory("10", "/top"))
    }

    fn mutations(cli: &ScriptedCli) -> Vec<String> {
        cli.calls()
            .into_iter()
            .filter(|c| c[0] != "ls")
            .map(|c| format!("{} {}", c[0], c[1]))
            .collect()
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let cli = tree_cli(&[]);
        let cancel = CancelToken::new();
        let summary = RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut no_progress())
            .await
            .unwrap();

        assert_eq!(summary, DeleteSummary { files: 3, directories: 2 });
        assert_eq!(
            mutations(&cli),
            vec!["rm ua", "rm uc", "rmdir 11", "rm ub", "rmdir 10"]
        );
    }

    #[tokio::test]
    async fn test_fallback_id_rescues_delete() {
        let cli = tree_cli(&["uc"]);
        let cancel = CancelToken::new();
        RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut no_progress())
            .await
            .unwrap();

        assert_eq!(
            mutations(&cli),
            vec!["rm ua", "rm uc", "rm 3", "rmdir 11", "rm ub", "rmdir 10"]
        );
    }

    #[tokio::test]
    async fn test_both_ids_failing_aborts() {
        let cli = tree_cli(&["ua", "1"]);
        let cancel = CancelToken::new();
        let err = RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut no_progress())
            .await
            .unwrap_err();

        match err {
            SpaceFsError::RemoteDelete { id, .. } => assert_eq!(id, "ua"),
            other => panic!("unexpected error: {:?}", other),
        }
        // No sibling or parent is touched after the failure.
        assert_eq!(mutations(&cli), vec!["rm ua", "rm 1"]);
    }

    #[tokio::test]
    async fn test_progress_is_global_and_monotonic() {
        let cli = tree_cli(&[]);
        let cancel = CancelToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut progress: ProgressCallback = Box::new(move |p: &TransferProgress| {
            sink.lock().push((p.done, p.total));
        });

        RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut progress)
            .await
            .unwrap();

        let seen = seen.lock().clone();
        assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    }

    #[tokio::test]
    async fn test_cancel_between_items() {
        let cli = tree_cli(&[]);
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let mut progress: ProgressCallback = Box::new(move |p: &TransferProgress| {
            if p.done == 2 {
                trigger.cancel();
            }
        });

        let err = RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut progress)
            .await
            .unwrap_err();
        assert!(matches!(err, SpaceFsError::Cancelled));
        assert_eq!(mutations(&cli), vec!["rm ua", "rm uc"]);
    }

    #[tokio::test]
    async fn test_space_qualifier_on_every_call() {
        let cli = tree_cli(&[]);
        let cancel = CancelToken::new();
        let space = Space::Named("s1".to_string());
        RecursiveDelete::new(&cli, &space, &cancel)
            .run(top(), &mut no_progress())
            .await
            .unwrap();
        assert!(cli.calls().iter().all(|c| flag_value(c, "-space-id") == Some("s1")));
    }

    #[tokio::test]
    async fn test_rmdir_failure_is_fatal() {
        let cli = ScriptedCli::new(|args| match args[0].as_str() {
            "ls" => Reply::Json(json!([])),
            _ => Reply::Fail("directory not empty".to_string()),
        });
        let cancel = CancelToken::new();
        let err = RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(top(), &mut no_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, SpaceFsError::RemoteDelete { .. }));
    }

    #[tokio::test]
    async fn test_rejects_files() {
        let cli = tree_cli(&[]);
        let cancel = CancelToken::new();
        let file = Arc::new(RemoteNode::file("u", "/x.txt"));
        let err = RecursiveDelete::new(&cli, &Space::Home, &cancel)
            .run(file, &mut no_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, SpaceFsError::Validation(_)));
        assert!(cli.calls().is_empty());
    }
}
