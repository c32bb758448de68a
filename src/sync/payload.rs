//! Composes the gist payload from the files read out of the workspace.

use super::provider::{GistFile, GistFiles};
use crate::workspace::WorkspaceRoot;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Name shown in the metadata entry.
pub const TOOL_NAME: &str = "Gist Sync";

/// Flattened gist filename -> file text, in read order.
pub type FileContents = IndexMap<String, String>;

/// Key of the metadata entry, e.g. `my-project | Gist Sync`.
pub fn metadata_key(workspace: &WorkspaceRoot) -> String {
    format!("{} | {}", workspace.name, TOOL_NAME)
}

pub fn gist_description(workspace: &WorkspaceRoot) -> String {
    format!("{} (synced by {})", workspace.name, TOOL_NAME)
}

fn metadata_content(
    workspace: &WorkspaceRoot,
    contents: &FileContents,
    synced_at: DateTime<Utc>,
) -> String {
    let mut text = format!(
        "# {}\n\nLast synced: {}\n\nFiles:\n",
        workspace.name,
        synced_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for key in contents.keys() {
        text.push_str("- ");
        text.push_str(key);
        text.push('\n');
    }
    text
}

/// Build the payload: the metadata entry first, then every user file.
///
/// A user file that flattens to the metadata key is dropped; the metadata
/// entry always wins that slot.
pub fn build_payload(
    workspace: &WorkspaceRoot,
    contents: &FileContents,
    synced_at: DateTime<Utc>,
) -> GistFiles {
    let mut files = GistFiles::with_capacity(contents.len() + 1);
    files.insert(
        metadata_key(workspace),
        GistFile {
            content: metadata_content(workspace, contents, synced_at),
        },
    );
    for (key, content) in contents {
        files.entry(key.clone()).or_insert_with(|| GistFile {
            content: content.clone(),
        });
    }
    files
}
