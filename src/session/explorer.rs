//! The file-operation orchestrator.
//!
//! An [`Explorer`] owns the tree cache and everything a user-facing
//! operation needs: the CLI backend, the active space, the status indicator
//! and the prompter. Operations live in `fs::operations` as further
//! `impl Explorer` blocks. Each one validates its input, asks for
//! confirmation where the action is destructive or bulk, runs the CLI,
//! refreshes the tree after a mutation, and reports a failure to the user
//! exactly once before returning it.

use std::sync::Arc;

use crate::cli::{CliBackend, CliClient};
use crate::config::Config;
use crate::error::Result;
use crate::fs::tree::TreeProvider;
use crate::prompt::{AutoConfirm, Notice, Prompter};
use crate::space::Space;
use crate::status::StatusIndicator;

pub struct Explorer {
    cli: Arc<dyn CliBackend>,
    pub(crate) tree: TreeProvider,
    config: Config,
    status: Arc<StatusIndicator>,
    prompter: Arc<dyn Prompter>,
}

impl Explorer {
    /// Locate the CLI executable and start on the home space.
    pub fn new(config: Config) -> Result<Self> {
        let client = CliClient::new(&config)?;
        Ok(Self::with_backend(Arc::new(client), config))
    }

    /// Use an already constructed backend.
    pub fn with_backend(cli: Arc<dyn CliBackend>, config: Config) -> Self {
        Self {
            cli,
            tree: TreeProvider::new(Space::Home),
            config,
            status: StatusIndicator::global(),
            prompter: Arc::new(AutoConfirm),
        }
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_status(mut self, status: Arc<StatusIndicator>) -> Self {
        self.status = status;
        self
    }

    pub fn with_space(mut self, space: Space) -> Self {
        self.tree = TreeProvider::new(space);
        self
    }

    pub fn space(&self) -> &Space {
        self.tree.space()
    }

    pub fn tree(&self) -> &TreeProvider {
        &self.tree
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cli(&self) -> &Arc<dyn CliBackend> {
        &self.cli
    }

    pub fn status(&self) -> &Arc<StatusIndicator> {
        &self.status
    }

    pub fn prompter(&self) -> &Arc<dyn Prompter> {
        &self.prompter
    }

    /// Show a failed operation's error to the user, then pass the result on.
    pub(crate) fn surface<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::warn!(operation, "{}", err);
            self.prompter.notify(Notice::Error(err.user_message(operation)));
        }
        result
    }
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("space", self.space())
            .field("cached", &self.tree.cache().len())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::harness;
    use crate::cli::mock::{Reply, ScriptedCli};
    use crate::error::SpaceFsError;
    use serde_json::json;

    #[test]
    fn test_surface_notifies_once() {
        let h = harness(ScriptedCli::new(|_| Reply::Json(json!([]))), true);
        let res: crate::error::Result<()> = h.explorer.surface(
            "Rename",
            Err(SpaceFsError::CliExecution {
                code: Some(1),
                message: "name taken".to_string(),
            }),
        );
        assert!(res.is_err());
        assert_eq!(h.prompter.errors(), vec!["Rename failed: name taken"]);

        let ok = h.explorer.surface("Rename", Ok(3));
        assert_eq!(ok.unwrap(), 3);
        assert_eq!(h.prompter.errors().len(), 1);
    }
}
