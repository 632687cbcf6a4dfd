//! Reading file contents and downloading files.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::cli::args::{CliArgs, CAT, DOWNLOAD, HEAD, LINES, OUTPUT};
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::session::Explorer;

impl Explorer {
    /// Full contents of a remote file as text.
    pub async fn cat(&self, node: &RemoteNode) -> Result<String> {
        let result = self.read_text(node, CliArgs::new(CAT)).await;
        self.surface("Read file", result)
    }

    /// The first lines of a remote file.
    ///
    /// `lines` overrides the configured default; with neither set the CLI
    /// chooses.
    pub async fn head(&self, node: &RemoteNode, lines: Option<u32>) -> Result<String> {
        let lines = lines.or(self.config().head_lines);
        let result = self
            .read_text(node, CliArgs::new(HEAD).opt_if(LINES, lines))
            .await;
        self.surface("Read file", result)
    }

    /// Download a remote file into `output_dir`, creating the directory if needed.
    pub async fn download(
        &self,
        node: &RemoteNode,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        let result = self.download_inner(node, output_dir, cancel).await;
        self.surface("Download", result)
    }

    async fn read_text(&self, node: &RemoteNode, args: CliArgs) -> Result<String> {
        ensure_file(node)?;
        let args = args.arg(&node.id).space(self.space());
        let response = self.cli().invoke(args.into_vec()).await?;
        text_content(&response)
    }

    async fn download_inner(
        &self,
        node: &RemoteNode,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        ensure_file(node)?;
        tokio::fs::create_dir_all(output_dir).await?;

        let args = CliArgs::new(DOWNLOAD)
            .arg(&node.id)
            .opt(OUTPUT, output_dir.display())
            .space(self.space());
        let mut on_line = |line: &str| debug!(target: "spacefs::download", "{}", line);
        self.cli()
            .stream(args.into_vec(), &mut on_line, cancel)
            .await?;

        info!(path = %node.path, dir = %output_dir.display(), "downloaded");
        Ok(())
    }
}

fn ensure_file(node: &RemoteNode) -> Result<()> {
    if node.is_file() {
        Ok(())
    } else {
        Err(SpaceFsError::Validation(format!("'{}' is not a file", node.label)))
    }
}

/// Text from a `cat`/`head` response: a bare string, or an object carrying
/// it under `content`.
fn text_content(response: &Value) -> Result<String> {
    if let Some(text) = response.as_str() {
        return Ok(text.to_string());
    }
    response
        .get("content")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SpaceFsError::CliProtocol("expected file content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::mock::{Reply, ScriptedCli};
    use crate::session::explorer::testing::harness;
    use serde_json::json;
    use tempfile::tempdir;

    fn cli() -> ScriptedCli {
        ScriptedCli::new(|args| match args[0].as_str() {
            "cat" => Reply::Json(json!({"content": "hello\nworld\n"})),
            "head" => Reply::Json(json!("hello\n")),
            "download" => Reply::Lines(vec!["Downloading a.txt".to_string(), "Done".to_string()]),
            _ => Reply::Fail("unexpected".to_string()),
        })
    }

    #[tokio::test]
    async fn test_cat_and_head() {
        let h = harness(cli(), true);
        let file = RemoteNode::file("u-1", "/a.txt");
        assert_eq!(h.explorer.cat(&file).await.unwrap(), "hello\nworld\n");
        assert_eq!(h.explorer.head(&file, Some(1)).await.unwrap(), "hello\n");
        assert_eq!(
            h.cli.calls(),
            vec![vec!["cat", "u-1"], vec!["head", "-n", "1", "u-1"]]
        );
    }

    #[tokio::test]
    async fn test_cat_rejects_folder() {
        let h = harness(cli(), true);
        let dir = RemoteNode::directory("1", "/docs");
        assert!(h.explorer.cat(&dir).await.is_err());
        assert!(h.cli.calls().is_empty());
    }

    #[tokio::test]
    async fn test_download_creates_output_dir() {
        let h = harness(cli(), true);
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("nested").join("out");
        let file = RemoteNode::file("u-1", "/a.txt");

        h.explorer
            .download(&file, &out, &CancelToken::new())
            .await
            .unwrap();
        assert!(out.is_dir());
        let calls = h.cli.calls_for("download");
        assert_eq!(calls[0][1], "u-1");
        assert_eq!(calls[0][3], out.display().to_string());
    }

    #[test]
    fn test_text_content_shapes() {
        assert_eq!(text_content(&json!("x")).unwrap(), "x");
        assert!(matches!(
            text_content(&json!({"size": 3})),
            Err(SpaceFsError::CliProtocol(_))
        ));
    }
}
