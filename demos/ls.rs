//! Example: List a folder of a space
//!
//! Usage:
//!   cargo run --example ls -- [--space SPACE_ID] [--folder FOLDER_ID] [--config spacefs.json]

use std::env;

use spacefs::{Config, Explorer, RemoteNode, Space};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut space = None;
    let mut folder = None;
    let mut config_path = "spacefs.json".to_string();

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
            "--config" => {
                config_path = args.get(i + 1).cloned().unwrap_or(config_path);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let config = Config::load(&config_path)
        .await
        .expect("Failed to load config")
        .with_env_overrides(|key| env::var(key).ok());
    let mut explorer = Explorer::new(config)
        .expect("Storage CLI not found")
        .with_space(Space::from_id(space.as_deref()));

    // A synthetic folder node is enough to address a listing by id.
    let parent = folder.map(|id| std::sync::Arc::new(RemoteNode::directory(id, "/")));

    println!("\n📁 Listing space {}\n", explorer.space());
    match explorer.list_children(parent.as_ref()).await {
        Ok(nodes) if nodes.is_empty() => println!("  (empty)"),
        Ok(nodes) => {
            for node in nodes {
                let type_icon = if node.is_file() { "📄" } else { "📁" };
                let size_str = node.size.map(format_size).unwrap_or_default();
                println!("  {} {} {} [{}]", type_icon, node.label, size_str, node.id);
            }
        }
        Err(e) => eprintln!("❌ Failed to list: {}", e),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("({:.2} GB)", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("({:.2} MB)", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("({:.2} KB)", bytes as f64 / KB as f64)
    } else {
        format!("({} B)", bytes)
    }
}
