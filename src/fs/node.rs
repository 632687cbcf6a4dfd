//! Remote node types.

use std::path::Path;
use std::sync::{Arc, Weak};

use serde_json::Value;

use super::operations::utils::{join_remote_path, remote_basename};

/// Node kind as reported by the listing `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Regular file (leaf)
    File,
    /// Directory (collapsible container)
    Directory,
}

impl NodeKind {
    /// Classify a raw `type` value. Anything that is not a directory type is a file.
    pub fn from_type_field(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" | "folder" => NodeKind::Directory,
            _ => NodeKind::File,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// One cached remote file-system entry.
///
/// Nodes are created only when their parent's children are listed and are
/// dropped only by a wholesale cache clear.
#[derive(Debug, Clone)]
pub struct RemoteNode {
    /// Remote identifier. Content id for files, usually numeric for directories.
    pub id: String,
    /// Secondary identifier a file can also be addressed by (e.g. its numeric id).
    pub alt_id: Option<String>,
    /// Display name (basename)
    pub label: String,
    /// Full remote path
    pub path: String,
    pub kind: NodeKind,
    /// Lower-cased suffix without the dot, files only
    pub extension: Option<String>,
    /// Size in bytes when the listing reports one
    pub size: Option<u64>,
    /// Back-reference set at creation; never owns the parent.
    pub(crate) parent: Option<Weak<RemoteNode>>,
}

impl RemoteNode {
    /// Build a file node with no parent reference.
    pub fn file(id: impl Into<String>, path: &str) -> Self {
        Self::detached(id.into(), path, NodeKind::File)
    }

    /// Build a directory node with no parent reference.
    pub fn directory(id: impl Into<String>, path: &str) -> Self {
        Self::detached(id.into(), path, NodeKind::Directory)
    }

    fn detached(id: String, path: &str, kind: NodeKind) -> Self {
        let path = join_remote_path(None, path);
        let label = remote_basename(&path).to_string();
        let extension = match kind {
            NodeKind::File => extension_of(&label),
            NodeKind::Directory => None,
        };
        Self {
            id,
            alt_id: None,
            label,
            path,
            kind,
            extension,
            size: None,
            parent: None,
        }
    }

    pub fn with_alt_id(mut self, alt_id: impl Into<String>) -> Self {
        self.alt_id = Some(alt_id.into());
        self
    }

    /// Convert one raw listing item.
    ///
    /// Files are keyed by their content id (`uid`) when present, keeping the
    /// numeric `id` as the alternate identifier. The raw `path` (or the name)
    /// is joined onto the parent's path unless it already carries that prefix.
    pub(crate) fn from_json(json: &Value, parent: Option<&Arc<RemoteNode>>) -> Option<Self> {
        let kind = json
            .get("type")
            .and_then(|v| v.as_str())
            .map(NodeKind::from_type_field)
            .unwrap_or(NodeKind::File);

        let numeric_id = json.get("id").and_then(json_id);
        let content_id = json.get("uid").and_then(json_id);
        let (id, alt_id) = match (kind, content_id, numeric_id) {
            (NodeKind::File, Some(uid), numeric) => {
                let alt = numeric.filter(|n| n != &uid);
                (uid, alt)
            }
            (_, _, Some(id)) => (id, None),
            (_, Some(uid), None) => (uid, None),
            (_, None, None) => return None,
        };

        let name = json.get("name").and_then(|v| v.as_str()).filter(|s| !s.is_empty());
        let raw_path = json
            .get("path")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .or(name)?;

        let path = join_remote_path(parent.map(|p| p.path.as_str()), raw_path);
        let label = name
            .map(|s| s.to_string())
            .unwrap_or_else(|| remote_basename(&path).to_string());
        let extension = match kind {
            NodeKind::File => extension_of(&label),
            NodeKind::Directory => None,
        };
        let size = json.get("size").and_then(|v| v.as_u64());

        Some(Self {
            id,
            alt_id,
            label,
            path,
            kind,
            extension,
            size,
            parent: parent.map(Arc::downgrade),
        })
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_container()
    }

    /// The stored parent, if it was set and is still alive.
    pub fn parent(&self) -> Option<Arc<RemoteNode>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Identifier to retry a failed delete with, if it differs from the primary one.
    pub fn fallback_id(&self) -> Option<&str> {
        self.alt_id.as_deref().filter(|alt| *alt != self.id)
    }
}

/// Render a JSON id (string or number) as a string.
pub(crate) fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn extension_of(label: &str) -> Option<String> {
    Path::new(label)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind_conversion() {
        assert_eq!(NodeKind::from_type_field("directory"), NodeKind::Directory);
        assert_eq!(NodeKind::from_type_field("Folder"), NodeKind::Directory);
        assert_eq!(NodeKind::from_type_field("dir"), NodeKind::Directory);
        assert_eq!(NodeKind::from_type_field("file"), NodeKind::File);
        assert_eq!(NodeKind::from_type_field("symlink"), NodeKind::File);
        assert!(NodeKind::Directory.is_container());
        assert!(!NodeKind::File.is_container());
    }

    #[test]
    fn test_file_from_json() {
        let item = json!({"id": 118, "uid": "c0ffee", "name": "Report.PDF", "type": "file", "size": 12});
        let node = RemoteNode::from_json(&item, None).unwrap();

        assert_eq!(node.id, "c0ffee");
        assert_eq!(node.fallback_id(), Some("118"));
        assert_eq!(node.label, "Report.PDF");
        assert_eq!(node.path, "/Report.PDF");
        assert_eq!(node.extension.as_deref(), Some("pdf"));
        assert_eq!(node.size, Some(12));
        assert!(node.is_file());
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_directory_from_json() {
        let item = json!({"id": 7, "name": "data", "path": "/data", "type": "directory"});
        let node = RemoteNode::from_json(&item, None).unwrap();

        assert_eq!(node.id, "7");
        assert!(node.fallback_id().is_none());
        assert!(node.is_directory());
        assert!(node.extension.is_none());
    }

    #[test]
    fn test_path_not_double_prefixed() {
        let parent = Arc::new(RemoteNode::directory("7", "/data"));

        let absolute = json!({"id": 1, "name": "a.csv", "path": "/data/a.csv", "type": "file"});
        let relative = json!({"id": 2, "name": "b.csv", "path": "b.csv", "type": "file"});
        let name_only = json!({"id": 3, "name": "c.csv", "type": "file"});

        for item in [absolute, relative, name_only] {
            let node = RemoteNode::from_json(&item, Some(&parent)).unwrap();
            assert!(node.path.starts_with("/data/"));
            assert!(!node.path.starts_with("/data/data"));
            assert_eq!(node.parent().unwrap().id, "7");
        }
    }

    #[test]
    fn test_child_named_like_parent() {
        let parent = Arc::new(RemoteNode::directory("7", "/data"));
        let item = json!({"id": 9, "name": "data", "type": "directory"});
        let node = RemoteNode::from_json(&item, Some(&parent)).unwrap();

        assert_eq!(node.path, "/data/data");
        assert_eq!(node.label, "data");
        assert_ne!(node.path, parent.path);
    }

    #[test]
    fn test_items_without_id_or_name_are_skipped() {
        assert!(RemoteNode::from_json(&json!({"name": "x"}), None).is_none());
        assert!(RemoteNode::from_json(&json!({"id": 1}), None).is_none());
    }

    #[test]
    fn test_parent_reference_does_not_own() {
        let parent = Arc::new(RemoteNode::directory("7", "/data"));
        let child = RemoteNode::from_json(&json!({"id": 1, "name": "x"}), Some(&parent)).unwrap();
        drop(parent);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_fallback_id_ignores_identical_ids() {
        let node = RemoteNode::file("5", "/a.txt").with_alt_id("5");
        assert!(node.fallback_id().is_none());
        let item = json!({"id": 5, "uid": "5", "name": "a.txt"});
        assert!(RemoteNode::from_json(&item, None).unwrap().alt_id.is_none());
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension_of("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("README"), None);
    }
}
