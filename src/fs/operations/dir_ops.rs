//! Folder creation, file removal, moves and renames.

use std::sync::Arc;

use tracing::info;

use super::utils::{join_remote_path, move_destination, remote_dirname};
use crate::cli::args::{CliArgs, MKDIR, MV, PARENTS, RM};
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::session::Explorer;

impl Explorer {
    /// Create a folder under `parent` (the space root when `None`).
    ///
    /// A name containing `/` creates every missing intermediate folder.
    pub async fn mkdir(&mut self, parent: Option<&Arc<RemoteNode>>, name: &str) -> Result<()> {
        let name = name.trim().trim_matches('/');
        if name.is_empty() {
            return self.surface(
                "Create folder",
                Err(SpaceFsError::Validation("Folder name cannot be empty".to_string())),
            );
        }
        if let Some(parent) = parent {
            if parent.is_file() {
                return self.surface(
                    "Create folder",
                    Err(SpaceFsError::Validation(format!(
                        "'{}' is not a folder",
                        parent.label
                    ))),
                );
            }
        }

        let mut args = CliArgs::new(MKDIR).arg(name);
        if name.contains('/') {
            args = args.flag(PARENTS);
        }
        let args = args
            .folder(parent.map(|p| p.id.as_str()))
            .space(self.space());

        let result = self.cli().invoke(args.into_vec()).await.map(|_| ());
        if result.is_ok() {
            let parent_path = parent.map(|p| p.path.as_str());
            info!(path = %join_remote_path(parent_path, name), "folder created");
            self.refresh();
        }
        self.surface("Create folder", result)
    }

    /// Remove a single file after confirmation. Returns `false` if declined.
    pub async fn remove_file(&mut self, node: &RemoteNode) -> Result<bool> {
        if !node.is_file() {
            return self.surface(
                "Delete file",
                Err(SpaceFsError::Validation(format!(
                    "'{}' is a folder; delete it as a folder",
                    node.label
                ))),
            );
        }
        let question = format!("Delete '{}'?", node.label);
        if !self.prompter().confirm(&question).await {
            return Ok(false);
        }

        let args = CliArgs::new(RM).arg(&node.id).space(self.space());
        let result = self.cli().invoke(args.into_vec()).await.map(|_| true);
        if result.is_ok() {
            info!(path = %node.path, "file deleted");
            self.refresh();
        }
        self.surface("Delete file", result)
    }

    /// Move `source` into `target_dir` (the space root when `None`).
    ///
    /// Returns the new path. Moving a node to where it already is does
    /// nothing.
    pub async fn move_node(
        &mut self,
        source: &RemoteNode,
        target_dir: Option<&RemoteNode>,
    ) -> Result<String> {
        let result = self.move_one(source, target_dir).await;
        if result.is_ok() {
            self.refresh();
        }
        self.surface("Move", result)
    }

    /// Give `node` a new name in the same folder. Returns the new path.
    pub async fn rename(&mut self, node: &RemoteNode, new_name: &str) -> Result<String> {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name.contains('/') {
            return self.surface(
                "Rename",
                Err(SpaceFsError::Validation(format!("Invalid name '{}'", new_name))),
            );
        }

        let dest = join_remote_path(Some(&remote_dirname(&node.path)), new_name);
        if dest == node.path {
            return Ok(dest);
        }
        let result = self.invoke_mv(&node.path, &dest).await.map(|_| dest);
        if result.is_ok() {
            self.refresh();
        }
        self.surface("Rename", result)
    }

    /// One `mv` without refresh or notification.
    pub(crate) async fn move_one(
        &self,
        source: &RemoteNode,
        target_dir: Option<&RemoteNode>,
    ) -> Result<String> {
        if let Some(target) = target_dir {
            if target.is_file() {
                return Err(SpaceFsError::Validation(format!(
                    "Cannot move into file '{}'",
                    target.label
                )));
            }
            let nested = target.path == source.path
                || target.path.starts_with(&format!("{}/", source.path));
            if source.is_directory() && nested {
                return Err(SpaceFsError::Validation(format!(
                    "Cannot move '{}' into itself",
                    source.label
                )));
            }
        }

        let dest = move_destination(target_dir.map(|t| t.path.as_str()), &source.path);
        if dest == source.path {
            return Ok(dest);
        }
        self.invoke_mv(&source.path, &dest).await?;
        info!(from = %source.path, to = %dest, "moved");
        Ok(dest)
    }

    async fn invoke_mv(&self, from: &str, to: &str) -> Result<()> {
        let args = CliArgs::new(MV).arg(from).arg(to).space(self.space());
        self.cli().invoke(args.into_vec()).await.map(|_| ())
    }
}
