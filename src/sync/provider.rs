//! GistClient trait - Abstraction for the remote document store.
//!
//! The orchestrator only needs "create" and "update"; everything about HTTP
//! lives behind this trait.

use crate::error::RemoteError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One file inside a gist payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    pub content: String,
}

/// Gist filename -> file, in the order they should appear.
pub type GistFiles = IndexMap<String, GistFile>;

/// Identity of a gist returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistRef {
    pub id: String,
    /// Browser URL of the gist
    pub url: String,
}

/// Outcome of one successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub url: String,
    pub gist_id: String,
    /// Number of user files pushed (the metadata entry is not counted)
    pub file_count: usize,
    /// True if no gist id was stored when the sync started
    pub is_new: bool,
    /// Configured paths that were skipped as unsafe or unreadable
    pub skipped: Vec<String>,
}

/// Remote store for gists.
#[async_trait]
pub trait GistClient: Send + Sync {
    /// Create a new private gist.
    async fn create(
        &self,
        token: &str,
        files: &GistFiles,
        description: &str,
    ) -> Result<GistRef, RemoteError>;

    /// Replace the files of an existing gist.
    async fn update(
        &self,
        token: &str,
        gist_id: &str,
        files: &GistFiles,
        description: &str,
    ) -> Result<GistRef, RemoteError>;
}
