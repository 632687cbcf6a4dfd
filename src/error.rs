//! Error types for the spacefs library.

use thiserror::Error;

/// Main error type for spacefs operations.
#[derive(Error, Debug)]
pub enum SpaceFsError {
    /// The storage CLI could not be located or the configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A JSON-mode CLI call exited with a nonzero status.
    #[error("CLI error: {message}")]
    CliExecution { code: Option<i32>, message: String },

    /// A JSON-mode CLI call exited cleanly but its stdout was not the expected JSON.
    #[error("Malformed CLI output: {0}")]
    CliProtocol(String),

    /// Recursive folder removal failed; already removed entries stay removed.
    #[error("Failed to delete {id}: {message}")]
    RemoteDelete { id: String, message: String },

    /// The upload subcommand exited with a nonzero status.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Rejected locally before any remote call was made.
    #[error("{0}")]
    Validation(String),

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Local I/O error (spawning, stat, reading process pipes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl SpaceFsError {
    /// Build a [`SpaceFsError::CliExecution`] from a failed exit.
    ///
    /// Uses the trimmed stderr when there is any, otherwise a generic
    /// "exited with code N" message.
    pub fn from_exit(code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        let message = if !stderr.is_empty() {
            stderr.to_string()
        } else {
            match code {
                Some(code) => format!("CLI exited with code {}", code),
                None => "CLI terminated by signal".to_string(),
            }
        };
        SpaceFsError::CliExecution { code, message }
    }

    /// The single message shown to the user when an operation fails.
    pub fn user_message(&self, operation: &str) -> String {
        match self {
            SpaceFsError::Cancelled => format!("{} cancelled", operation),
            SpaceFsError::Validation(msg) => msg.clone(),
            SpaceFsError::Upload(msg) | SpaceFsError::CliExecution { message: msg, .. } => {
                format!("{} failed: {}", operation, msg)
            }
            other => format!("{} failed: {}", operation, other),
        }
    }

    /// Whether this error came from the remote side (as opposed to local validation).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SpaceFsError::CliExecution { .. }
                | SpaceFsError::CliProtocol(_)
                | SpaceFsError::RemoteDelete { .. }
                | SpaceFsError::Upload(_)
        )
    }
}

/// Result type alias for spacefs operations.
pub type Result<T> = std::result::Result<T, SpaceFsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_exit_prefers_stderr() {
        let err = SpaceFsError::from_exit(Some(2), "  permission denied\n");
        match err {
            SpaceFsError::CliExecution { code, message } => {
                assert_eq!(code, Some(2));
                assert_eq!(message, "permission denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_exit_generic_message() {
        let err = SpaceFsError::from_exit(Some(7), "");
        assert_eq!(err.to_string(), "CLI error: CLI exited with code 7");

        let err = SpaceFsError::from_exit(None, "");
        assert_eq!(err.to_string(), "CLI error: CLI terminated by signal");
    }

    #[test]
    fn test_user_message() {
        let err = SpaceFsError::Validation("Folder name cannot be empty".to_string());
        assert_eq!(err.user_message("Create folder"), "Folder name cannot be empty");

        let err = SpaceFsError::Upload("quota exceeded".to_string());
        assert_eq!(
            err.user_message("Upload"),
            "Upload failed: quota exceeded"
        );
        assert!(err.is_remote());

        assert_eq!(SpaceFsError::Cancelled.user_message("Delete"), "Delete cancelled");
        assert!(!SpaceFsError::Cancelled.is_remote());
    }
}
