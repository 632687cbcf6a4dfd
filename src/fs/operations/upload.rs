//! Bulk upload of local files and folders through the streaming
//! `upload-file` subcommand.
//!
//! The local inputs are counted first so progress has a fixed total. The CLI
//! prints free text while it works; only two markers are interpreted, one
//! printed per finished file and one printed when the whole upload is done.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::cli::args::{CliArgs, CHUNK_SIZE, THREADS, UPLOAD_FILE};
use crate::cli::CliBackend;
use crate::config::Config;
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::progress::{ProgressCallback, TransferProgress};
use crate::prompt::Notice;
use crate::session::Explorer;
use crate::space::Space;
use crate::status::{StatusGuard, StatusIndicator};

/// Tuning forwarded to the CLI. Unset values are left to the CLI's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadOptions {
    pub threads: Option<u32>,
    pub chunk_size: Option<u64>,
}

impl From<&Config> for UploadOptions {
    fn from(config: &Config) -> Self {
        Self {
            threads: config.upload_threads,
            chunk_size: config.upload_chunk_size,
        }
    }
}

/// How an upload ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The inputs held no files; the CLI was not run.
    NothingToUpload,
    Completed { files: u64 },
}

/// Count the regular files under `paths`.
///
/// Directories are walked fully. Inputs or subtrees that cannot be read are
/// logged and contribute nothing.
pub async fn count_local_files(paths: &[PathBuf]) -> Result<u64> {
    let paths = paths.to_vec();
    tokio::task::spawn_blocking(move || paths.iter().map(|p| count_path(p)).sum::<u64>())
        .await
        .map_err(|e| SpaceFsError::Custom(format!("File count task failed: {}", e)))
}

fn count_path(path: &Path) -> u64 {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %path.display(), "cannot stat upload input: {}", e);
            return 0;
        }
    };
    if metadata.is_file() {
        return 1;
    }
    if !metadata.is_dir() {
        return 0;
    }

    let mut files = 0;
    for entry in WalkDir::new(path).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files += 1,
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), "skipping unreadable entry: {}", e),
        }
    }
    files
}

/// Turns marker lines into progress against a fixed total.
#[derive(Debug)]
struct Tally<'m> {
    total: u64,
    processed: u64,
    file_marker: &'m str,
    done_marker: &'m str,
}

impl Tally<'_> {
    fn observe(&mut self, line: &str) -> Option<TransferProgress> {
        if line.contains(self.done_marker) {
            self.processed = self.total;
            return Some(TransferProgress::new(self.total, self.total, ""));
        }
        let idx = line.find(self.file_marker)?;
        self.processed = (self.processed + 1).min(self.total);
        let label = line[idx + self.file_marker.len()..].trim();
        Some(TransferProgress::new(self.processed, self.total, label))
    }
}

/// One upload run, detached from any [`Explorer`] so it can be moved onto
/// its own task.
pub struct UploadPipeline {
    cli: Arc<dyn CliBackend>,
    status: Arc<StatusIndicator>,
    file_marker: String,
    done_marker: String,
    options: UploadOptions,
}

impl UploadPipeline {
    pub fn new(cli: Arc<dyn CliBackend>, status: Arc<StatusIndicator>, config: &Config) -> Self {
        Self {
            cli,
            status,
            file_marker: config.upload_file_marker.clone(),
            done_marker: config.upload_done_marker.clone(),
            options: UploadOptions::from(config),
        }
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    /// Upload `paths` into `destination` (a folder id, or the space root).
    ///
    /// Cancelling kills the CLI process and returns [`SpaceFsError::Cancelled`].
    pub async fn run(
        self,
        paths: Vec<PathBuf>,
        space: Space,
        destination: Option<String>,
        mut progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<UploadOutcome> {
        let total = count_local_files(&paths).await?;
        if total == 0 {
            warn!(inputs = paths.len(), "no files to upload");
            return Ok(UploadOutcome::NothingToUpload);
        }

        let args = CliArgs::new(UPLOAD_FILE)
            .args(paths.iter().map(|p| p.to_string_lossy().into_owned()))
            .space(&space)
            .folder(destination.as_deref())
            .opt_if(THREADS, self.options.threads)
            .opt_if(CHUNK_SIZE, self.options.chunk_size);
        info!(total, %space, destination = ?destination, "starting upload");

        let guard: StatusGuard = self.status.acquire();
        guard.set(format!("Uploading 0/{}", total));

        let mut tally = Tally {
            total,
            processed: 0,
            file_marker: &self.file_marker,
            done_marker: &self.done_marker,
        };
        let mut on_line = |line: &str| {
            debug!(target: "spacefs::upload", "{}", line);
            if cancel.is_cancelled() {
                return;
            }
            if let Some(report) = tally.observe(line) {
                guard.set(format!("Uploading {}", report.fraction()));
                progress(&report);
            }
        };

        let result = self.cli.stream(args.into_vec(), &mut on_line, &cancel).await;
        drop(guard);

        match result {
            Ok(()) => {
                info!(total, "upload finished");
                Ok(UploadOutcome::Completed { files: total })
            }
            Err(SpaceFsError::CliExecution { message, .. }) => {
                warn!(total, "upload failed: {}", message);
                Err(SpaceFsError::Upload(message))
            }
            Err(e) => Err(e),
        }
    }
}

impl Explorer {
    /// A pipeline sharing this explorer's backend, status indicator and settings.
    pub fn upload_pipeline(&self) -> UploadPipeline {
        UploadPipeline::new(
            Arc::clone(self.cli()),
            Arc::clone(self.status()),
            self.config(),
        )
    }

    /// Upload local files and folders into the folder with id `destination`,
    /// or the space root when `None`.
    pub async fn upload(
        &mut self,
        paths: Vec<PathBuf>,
        destination: Option<String>,
        progress: ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<UploadOutcome> {
        let result = self
            .upload_pipeline()
            .run(paths, self.space().clone(), destination, progress, cancel.clone())
            .await;
        self.finish_upload(result)
    }

    /// Upload into `target`, or next to it when `target` is a file.
    pub async fn upload_to(
        &mut self,
        target: Option<&RemoteNode>,
        paths: Vec<PathBuf>,
        progress: ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<UploadOutcome> {
        let destination = self.destination_folder(target);
        self.upload(paths, destination, progress, cancel).await
    }

    /// Folder id that uploads aimed at `target` land in.
    ///
    /// A folder receives them itself, a file's parent receives them, and
    /// anything else goes to the space root.
    pub fn destination_folder(&self, target: Option<&RemoteNode>) -> Option<String> {
        let target = target?;
        if target.is_directory() {
            return Some(target.id.clone());
        }
        self.get_parent(target).map(|parent| parent.id.clone())
    }

    /// Refresh after an upload that got as far as the CLI, and tell the user
    /// how it went.
    pub(crate) fn finish_upload(&mut self, result: Result<UploadOutcome>) -> Result<UploadOutcome> {
        match &result {
            Ok(UploadOutcome::NothingToUpload) => {
                self.prompter()
                    .notify(Notice::Warning("No files to upload".to_string()));
            }
            Ok(UploadOutcome::Completed { files }) => {
                self.refresh();
                self.prompter()
                    .notify(Notice::Info(format!("Uploaded {} file(s)", files)));
            }
            Err(_) => self.refresh(),
        }
        self.surface("Upload", result)
    }
}
