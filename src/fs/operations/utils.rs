//! Shared helpers for remote paths.

/// Normalize a path (remove trailing slashes, handle //).
pub(crate) fn normalize_path(path: &str) -> String {
    let mut result = path.trim().replace('\\', "/");
    while result.contains("//") {
        result = result.replace("//", "/");
    }
    while result.ends_with('/') && result.len() > 1 {
        result.pop();
    }
    if !result.starts_with('/') {
        result = format!("/{}", result);
    }
    result
}

/// Join a reported path onto a parent path unless it is already prefixed by it.
///
/// A bare name (no `/`) is always a child of `parent`, even when it spells
/// the parent's own path.
pub(crate) fn join_remote_path(parent: Option<&str>, raw: &str) -> String {
    let bare_name = !raw.trim().replace('\\', "/").contains('/');
    let raw = normalize_path(raw);
    let parent = match parent.map(normalize_path) {
        Some(parent) if parent != "/" => parent,
        _ => return raw,
    };

    if bare_name {
        format!("{}{}", parent, raw)
    } else if raw == parent || raw.starts_with(&format!("{}/", parent)) {
        raw
    } else {
        format!("{}{}", parent, raw)
    }
}

/// Parent directory of a remote path; the root is its own parent.
pub(crate) fn remote_dirname(path: &str) -> String {
    let path = normalize_path(path);
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last component of a remote path.
pub(crate) fn remote_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Destination of `source` when moved into `target_dir` (`None` = root).
pub(crate) fn move_destination(target_dir: Option<&str>, source: &str) -> String {
    let name = remote_basename(source);
    match target_dir.map(normalize_path) {
        Some(dir) if dir != "/" => format!("{}/{}", dir, name),
        _ => format!("/{}", name),
    }
}
