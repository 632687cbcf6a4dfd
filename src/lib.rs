//! # spacefs
//!
//! Browse and change a remote file store through its command-line client.
//!
//! ## Features
//!
//! - **Process adapter**: runs the storage CLI, parses its JSON output, and
//!   streams the free-text output of long-running transfers line by line.
//! - **Tree browsing**:
//!   - Lazy, per-folder listings cached until the next refresh.
//!   - Parent lookup through back-references, with a path-based fallback.
//!   - Multiple spaces (`ls-spaces`, `create-space`, switching).
//! - **File operations**:
//!   - Create folders (`mkdir`, with intermediate folders).
//!   - Move, rename and delete files.
//!   - Recursive folder deletion with a global progress total and cancellation.
//!   - Read (`cat`, `head`) and download files.
//! - **Uploads**:
//!   - Files and whole folders, counted up front for exact progress.
//!   - A shared status indicator and cancellation that stops the CLI process.
//! - **Drag and drop**: in-tree drags become moves, dropped local files
//!   become uploads.
//!
//! Listings are cached, so every mutation refreshes the tree; call
//! `refresh()` yourself after changes made outside this process.
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use spacefs::{CancelToken, Config, ExplorerHandle, make_progress_bar};
//!
//! # async fn example() -> spacefs::Result<()> {
//! let explorer = ExplorerHandle::start(Config::from_env())?;
//!
//! // List the root of the home space
//! let root = explorer.list_children(None).await?;
//! for node in &root {
//!     println!("{} {}", node.id, node.path);
//! }
//!
//! // Upload a folder into the first listed directory
//! let target = root.iter().find(|n| n.is_directory()).cloned();
//! explorer
//!     .upload(vec!["photos".into()], target, make_progress_bar(), CancelToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod progress;
pub mod prompt;
pub mod session;
pub mod space;
pub mod status;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use cli::{CliBackend, CliClient};
pub use config::Config;
pub use error::{Result, SpaceFsError};
pub use fs::{
    DataTransfer, DeleteSummary, DropOutcome, DropPayload, NodeKind, RemoteNode, TreeEvent,
    UploadOutcome,
};
pub use progress::{ProgressCallback, TransferProgress, make_progress_bar};
pub use prompt::{AutoConfirm, Notice, Prompter};
pub use session::{Explorer, ExplorerHandle};
pub use space::{Space, SpaceInfo};
pub use status::{StatusIndicator, StatusText};
