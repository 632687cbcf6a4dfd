//! Argument vectors for the storage CLI.

use crate::space::Space;

pub const LS: &str = "ls";
pub const MKDIR: &str = "mkdir";
pub const RM: &str = "rm";
pub const RMDIR: &str = "rmdir";
pub const MV: &str = "mv";
pub const CAT: &str = "cat";
pub const HEAD: &str = "head";
pub const DOWNLOAD: &str = "download";
pub const UPLOAD_FILE: &str = "upload-file";
pub const LS_SPACES: &str = "ls-spaces";
pub const CREATE_SPACE: &str = "create-space";

pub const FOLDER_ID: &str = "-folder-id";
pub const SPACE_ID: &str = "-space-id";
pub const PARENTS: &str = "-p";
pub const OUTPUT: &str = "-output";
pub const THREADS: &str = "-threads";
pub const CHUNK_SIZE: &str = "-chunksize";
pub const LINES: &str = "-n";

/// Subcommands that report progress as free text and are never run in JSON mode.
pub const STREAMING_COMMANDS: &[&str] = &[UPLOAD_FILE, DOWNLOAD];

pub fn is_streaming(args: &[String]) -> bool {
    args.first()
        .map(|sub| STREAMING_COMMANDS.contains(&sub.as_str()))
        .unwrap_or(false)
}

/// Builder for one flat, ordered CLI argument list.
///
/// Optional qualifiers are left out entirely when absent, never passed empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    args: Vec<String>,
}

impl CliArgs {
    pub fn new(subcommand: &str) -> Self {
        Self {
            args: vec![subcommand.to_string()],
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    pub fn opt(mut self, flag: &str, value: impl ToString) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.to_string());
        self
    }

    pub fn opt_if<V: ToString>(self, flag: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.opt(flag, v),
            None => self,
        }
    }

    pub fn folder(self, folder_id: Option<&str>) -> Self {
        self.opt_if(FOLDER_ID, folder_id)
    }

    pub fn space(self, space: &Space) -> Self {
        self.opt_if(SPACE_ID, space.qualifier())
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}

impl From<CliArgs> for Vec<String> {
    fn from(args: CliArgs) -> Self {
        args.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_space_omits_qualifier() {
        let args = CliArgs::new(LS).space(&Space::Home).folder(None).into_vec();
        assert_eq!(args, vec!["ls"]);
    }

    #[test]
    fn test_qualifiers() {
        let args = CliArgs::new(LS)
            .folder(Some("12"))
            .space(&Space::Named("9".to_string()))
            .into_vec();
        assert_eq!(args, vec!["ls", "-folder-id", "12", "-space-id", "9"]);
    }

    #[test]
    fn test_streaming_detection() {
        assert!(is_streaming(&[UPLOAD_FILE.to_string(), "a".to_string()]));
        assert!(is_streaming(&[DOWNLOAD.to_string()]));
        assert!(!is_streaming(&[LS.to_string()]));
        assert!(!is_streaming(&[]));
    }
}
