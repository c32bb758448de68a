//! Workspace access - resolving configured paths, the path safety check and
//! the file reader.
//!
//! Missing or unreadable files are normal here: they are reported as `None`,
//! never as errors.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// The folder whose files are synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot {
    /// Absolute path of the workspace folder
    pub path: PathBuf,
    /// Display name (final path component)
    pub name: String,
}

impl WorkspaceRoot {
    /// Open a workspace folder. Returns `None` if `path` is not an existing directory.
    pub fn open(path: &Path) -> Option<Self> {
        if !path.is_dir() {
            return None;
        }
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Some(Self { path, name })
    }
}

/// Turn a relative path into a single-level Gist filename.
///
/// Every `/` and `\` becomes `-`, so `docs/README.md` is stored as
/// `docs-README.md`. Distinct paths may collapse to the same name; the later
/// file wins.
pub fn flatten_path(relative: &str) -> String {
    relative.replace(['/', '\\'], "-")
}

/// Resolve a configured path against the workspace root.
///
/// `.` and `..` are folded lexically. If the result exists it is canonicalized,
/// so a symlink pointing outside the workspace resolves to its real location.
pub fn resolve_target(root: &Path, relative: &str) -> PathBuf {
    let joined = normalize_lexically(&root.join(relative));
    std::fs::canonicalize(&joined).unwrap_or(joined)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like the OS does.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Decides whether a resolved path may be read.
pub trait PathCheck: Send + Sync {
    fn is_safe(&self, root: &Path, resolved: &Path) -> bool;
}

/// Accepts a path only if it lies inside the root, compared component-wise
/// (so `/work-evil` is not inside `/work`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixPathCheck;

impl PathCheck for PrefixPathCheck {
    fn is_safe(&self, root: &Path, resolved: &Path) -> bool {
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        resolved.starts_with(&root) && resolved != root
    }
}

/// Reads file bytes. Any failure is reported as `None`.
pub trait FileReader: Send + Sync {
    fn read(&self, path: &Path) -> Option<Vec<u8>>;
}

/// [`FileReader`] backed by the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read(&self, path: &Path) -> Option<Vec<u8>> {
        match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("[Workspace] Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Path of `file` relative to `root`, with `/` separators.
///
/// Returns `None` when `file` is not inside `root`.
pub fn relative_to_root(root: &Path, file: &Path) -> Option<String> {
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let file = std::fs::canonicalize(file).unwrap_or_else(|_| normalize_lexically(file));
    let relative = file.strip_prefix(&root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
