//! Subprocess client for the storage CLI.
//!
//! Every call spawns one independent process. JSON-mode calls read the whole
//! of stdout and parse it as JSON; streaming calls hand stdout to the caller
//! line by line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::args::is_streaming;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Result, SpaceFsError};

/// Longest stdout excerpt quoted in a protocol error.
const OUTPUT_EXCERPT_LEN: usize = 200;

/// The boundary to the external storage CLI.
#[async_trait]
pub trait CliBackend: Send + Sync {
    /// Run a JSON-mode subcommand and return its parsed stdout.
    async fn invoke(&self, args: Vec<String>) -> Result<Value>;

    /// Run a free-text subcommand, feeding each stdout line to `on_line`.
    ///
    /// Cancelling `cancel` terminates the child process and yields
    /// [`SpaceFsError::Cancelled`].
    async fn stream(
        &self,
        args: Vec<String>,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
        cancel: &CancelToken,
    ) -> Result<()>;
}

/// [`CliBackend`] backed by real subprocesses.
#[derive(Debug, Clone)]
pub struct CliClient {
    executable: PathBuf,
    json_flag: String,
}

impl CliClient {
    /// Locate the executable once and build a client.
    ///
    /// Fails with [`SpaceFsError::Configuration`] if it cannot be found.
    pub fn new(config: &Config) -> Result<Self> {
        let executable = locate_executable(config, std::env::var_os("PATH"))?;
        debug!(executable = %executable.display(), "located storage CLI");
        Ok(Self::with_executable(executable, config.json_flag.clone()))
    }

    /// Build a client around an already resolved executable.
    pub fn with_executable(executable: impl Into<PathBuf>, json_flag: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            json_flag: json_flag.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn json_args(&self, mut args: Vec<String>) -> Vec<String> {
        if !is_streaming(&args) && !args.iter().any(|a| a == &self.json_flag) {
            args.push(self.json_flag.clone());
        }
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CliBackend for CliClient {
    async fn invoke(&self, args: Vec<String>) -> Result<Value> {
        let args = self.json_args(args);
        debug!(?args, "cli invoke");

        let output = self.command(&args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let err = SpaceFsError::from_exit(output.status.code(), &stderr);
            warn!(?args, code = ?output.status.code(), "cli call failed: {}", err);
            return Err(err);
        }

        parse_json_output(&output.stdout)
    }

    async fn stream(
        &self,
        args: Vec<String>,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
        cancel: &CancelToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(SpaceFsError::Cancelled);
        }
        debug!(?args, "cli stream");

        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpaceFsError::Custom("CLI stdout was not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SpaceFsError::Custom("CLI stderr was not captured".to_string()))?;

        // stderr is drained alongside stdout; both pipes must keep moving.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        // Lines are decoded lossily; a stray non-UTF-8 byte must not end the run.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            tokio::select! {
                read = reader.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        break;
                    }
                    let line = String::from_utf8_lossy(&buf);
                    on_line(line.trim_end_matches(['\r', '\n']));
                }
                _ = cancel.cancelled() => {
                    warn!(?args, "cancelling CLI process");
                    child.start_kill()?;
                    let _ = child.wait().await;
                    return Err(SpaceFsError::Cancelled);
                }
            }
        }

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                child.start_kill()?;
                let _ = child.wait().await;
                return Err(SpaceFsError::Cancelled);
            }
        };
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let err = SpaceFsError::from_exit(status.code(), &stderr);
            warn!(?args, code = ?status.code(), "cli stream failed: {}", err);
            return Err(err);
        }
        Ok(())
    }
}

/// Parse JSON-mode stdout. Anything that is not a single JSON value is a hard error.
pub(crate) fn parse_json_output(stdout: &[u8]) -> Result<Value> {
    serde_json::from_slice(stdout).map_err(|e| {
        let text = String::from_utf8_lossy(stdout);
        let excerpt: String = text.trim().chars().take(OUTPUT_EXCERPT_LEN).collect();
        SpaceFsError::CliProtocol(format!("{} (output: {:?})", e, excerpt))
    })
}

/// Resolve the CLI executable.
///
/// An explicit path in `config.executable` is used as is. A bare name is
/// searched on `path_var` first, then at `workspace_root/fallback_relative_path`.
pub fn locate_executable(config: &Config, path_var: Option<OsString>) -> Result<PathBuf> {
    let name = Path::new(&config.executable);
    if config.executable.trim().is_empty() {
        return Err(SpaceFsError::Configuration(
            "No CLI executable configured".to_string(),
        ));
    }

    if name.components().count() > 1 {
        return find_file(name).ok_or_else(|| {
            SpaceFsError::Configuration(format!("CLI executable not found at {}", name.display()))
        });
    }

    if let Some(path_var) = path_var {
        for dir in std::env::split_paths(&path_var) {
            if let Some(found) = find_file(&dir.join(name)) {
                return Ok(found);
            }
        }
    }

    let fallback = config
        .workspace_root
        .as_ref()
        .map(|root| root.join(&config.fallback_relative_path));
    if let Some(found) = fallback.as_deref().and_then(find_file) {
        return Ok(found);
    }

    Err(SpaceFsError::Configuration(match fallback {
        Some(fallback) => format!(
            "CLI executable '{}' not found on PATH or at {}",
            config.executable,
            fallback.display()
        ),
        None => format!(
            "CLI executable '{}' not found on PATH and no workspace root is set",
            config.executable
        ),
    }))
}

fn find_file(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    let suffix = std::env::consts::EXE_SUFFIX;
    if !suffix.is_empty() {
        let mut with_suffix = candidate.as_os_str().to_os_string();
        with_suffix.push(suffix);
        let with_suffix = PathBuf::from(with_suffix);
        if with_suffix.is_file() {
            return Some(with_suffix);
        }
    }
    None
}
