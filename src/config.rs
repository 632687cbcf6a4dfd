//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or a missing file)
//! yields a usable configuration. Environment overrides:
//!
//! - `SPACEFS_CLI`: executable name or path
//! - `SPACEFS_WORKSPACE`: workspace root used for the fallback executable location

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpaceFsError};

pub const ENV_CLI: &str = "SPACEFS_CLI";
pub const ENV_WORKSPACE: &str = "SPACEFS_WORKSPACE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable name searched on `PATH`, or an explicit path.
    pub executable: String,
    /// Workspace root the fallback location is resolved against.
    pub workspace_root: Option<PathBuf>,
    /// Fallback location of the executable, relative to `workspace_root`.
    pub fallback_relative_path: PathBuf,
    /// Flag requesting JSON output from the CLI.
    pub json_flag: String,
    /// Forwarded to `upload-file` as `-threads`.
    pub upload_threads: Option<u32>,
    /// Forwarded to `upload-file` as `-chunksize`.
    pub upload_chunk_size: Option<u64>,
    /// Substring marking one finished file in `upload-file` output.
    pub upload_file_marker: String,
    /// Substring marking the end of the whole upload.
    pub upload_done_marker: String,
    /// Line count passed to `head` as `-n`; CLI default when unset.
    pub head_lines: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable: "spacectl".to_string(),
            workspace_root: None,
            fallback_relative_path: PathBuf::from("bin").join("spacectl"),
            json_flag: "-json".to_string(),
            upload_threads: None,
            upload_chunk_size: None,
            upload_file_marker: "Uploaded ".to_string(),
            upload_done_marker: "Upload complete".to_string(),
            head_lines: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; unreadable or malformed files are
    /// configuration errors.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                SpaceFsError::Configuration(format!("Invalid config {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(SpaceFsError::Configuration(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Defaults overlaid with the `SPACEFS_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides through a lookup function.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(cli) = lookup(ENV_CLI).filter(|v| !v.trim().is_empty()) {
            self.executable = cli;
        }
        if let Some(root) = lookup(ENV_WORKSPACE).filter(|v| !v.trim().is_empty()) {
            self.workspace_root = Some(PathBuf::from(root));
        }
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.executable, "spacectl");
        assert_eq!(config.json_flag, "-json");
        assert!(config.upload_threads.is_none());
        assert_eq!(config.upload_file_marker, "Uploaded ");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env_overrides(|key| match key {
            ENV_CLI => Some("/opt/tools/spacectl".to_string()),
            ENV_WORKSPACE => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.executable, "/opt/tools/spacectl");
        assert!(config.workspace_root.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.json")).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spacefs.json");
        std::fs::write(&path, r#"{"executable": "mycli", "upload_threads": 4}"#).unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.executable, "mycli");
        assert_eq!(config.upload_threads, Some(4));
        assert_eq!(config.json_flag, "-json");
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spacefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, SpaceFsError::Configuration(_)));
    }
}
