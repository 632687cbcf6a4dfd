//! Example: Upload files and folders, cancelling on Ctrl+C
//!
//! Usage:
//!   cargo run --example upload -- [--space SPACE_ID] [--folder FOLDER_ID] PATH...

use std::env;
use std::path::PathBuf;

use spacefs::{CancelToken, Config, ExplorerHandle, Space, UploadOutcome, make_progress_bar};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut space = None;
    let mut folder = None;
    let mut paths = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--space" | "-s" => {
                space = args.get(i + 1).cloned();
                i += 2;
            }
            "--folder" | "-f" => {
                folder = args.get(i + 1).cloned();
                i += 2;
            }
            other => {
                paths.push(PathBuf::from(other));
                i += 1;
            }
        }
    }

    if paths.is_empty() {
        eprintln!("Usage: upload [--space SPACE_ID] [--folder FOLDER_ID] PATH...");
        return;
    }

    let explorer = ExplorerHandle::start(Config::from_env()).expect("Storage CLI not found");
    explorer
        .switch_space(Space::from_id(space.as_deref()))
        .await
        .expect("Failed to switch space");

    let target = folder.map(|id| std::sync::Arc::new(spacefs::RemoteNode::directory(id, "/")));

    let cancel = CancelToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    println!("Uploading {} input(s)...", paths.len());
    match explorer
        .upload(paths, target, make_progress_bar(), cancel)
        .await
    {
        Ok(UploadOutcome::Completed { files }) => println!("✅ Uploaded {} file(s)", files),
        Ok(UploadOutcome::NothingToUpload) => println!("Nothing to upload"),
        Err(e) => eprintln!("❌ Upload failed: {}", e),
    }

    explorer.shutdown().await;
}
