//! Space listing, creation and switching.

use crate::cli::args::{CliArgs, CREATE_SPACE, LS_SPACES};
use crate::error::{Result, SpaceFsError};
use crate::session::Explorer;
use crate::space::{Space, SpaceInfo};

impl Explorer {
    /// Spaces the account can see, as reported by `ls-spaces`.
    pub async fn list_spaces(&self) -> Result<Vec<SpaceInfo>> {
        let result = async {
            let response = self.cli().invoke(CliArgs::new(LS_SPACES).into_vec()).await?;
            SpaceInfo::parse_list(&response)
        }
        .await;
        self.surface("List spaces", result)
    }

    /// Create a space named `name`.
    pub async fn create_space(&self, name: &str) -> Result<SpaceInfo> {
        let name = name.trim();
        if name.is_empty() {
            return self.surface(
                "Create space",
                Err(SpaceFsError::Validation("Space name cannot be empty".to_string())),
            );
        }

        let result = async {
            let response = self
                .cli()
                .invoke(CliArgs::new(CREATE_SPACE).arg(name).into_vec())
                .await?;
            SpaceInfo::from_json(&response).ok_or_else(|| {
                SpaceFsError::CliProtocol("create-space returned no space id".to_string())
            })
        }
        .await;
        if let Ok(info) = &result {
            tracing::info!(id = %info.id, name = %info.name, "space created");
        }
        self.surface("Create space", result)
    }

    /// Make `space` the active space. The whole tree is re-listed.
    pub fn switch_space(&mut self, space: Space) {
        tracing::info!(from = %self.space(), to = %space, "switching space");
        self.tree.refresh(space);
    }
}
