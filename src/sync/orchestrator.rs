//! Sync orchestrator - one push of the configured files to the gist.
//!
//! Reads config, collects the files, builds the payload, then creates or
//! updates the gist. Recovery from the two recoverable failures lives one
//! level up, in [`recovery`](super::recovery).
//!
//! The orchestrator takes no locks: running two syncs for the same workspace
//! at once is the caller's responsibility to prevent.

use super::cancel::guarded_call;
use super::credentials::CredentialProvider;
use super::payload::{build_payload, gist_description, metadata_key, FileContents};
use super::provider::{GistClient, GistRef, SyncResult};
use crate::config::{ConfigStore, DEFAULT_SYNC_FILE};
use crate::error::{OrphanedGist, RemoteError, SyncError};
use crate::workspace::{flatten_path, resolve_target, FileReader, PathCheck, WorkspaceRoot};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const CREATE_OPERATION: &str = "createGist";
pub const UPDATE_OPERATION: &str = "updateGist";

/// Files read for one sync.
#[derive(Debug, Default)]
pub struct CollectedFiles {
    pub contents: FileContents,
    /// Configured paths that were skipped
    pub skipped: Vec<String>,
}

/// Read every target in order, skipping unsafe and unreadable paths.
///
/// A target whose gist name would take the metadata entry's slot is skipped
/// too, so every collected file is pushed.
pub fn collect_files(
    root: &WorkspaceRoot,
    targets: &[String],
    reader: &dyn FileReader,
    paths: &dyn PathCheck,
) -> CollectedFiles {
    let mut collected = CollectedFiles::default();
    let reserved = metadata_key(root);

    for relative in targets {
        let key = flatten_path(relative);
        if key == reserved {
            warn!(
                "[Sync] Skipping {}: its gist name is reserved for the metadata entry",
                relative
            );
            collected.skipped.push(relative.clone());
            continue;
        }

        let resolved = resolve_target(&root.path, relative);
        if !paths.is_safe(&root.path, &resolved) {
            warn!(
                "[Sync] Skipping {}: resolves outside the workspace ({})",
                relative,
                resolved.display()
            );
            collected.skipped.push(relative.clone());
            continue;
        }

        match reader.read(&resolved) {
            Some(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                collected.contents.insert(key, text);
            }
            None => {
                warn!("[Sync] Skipping {}: cannot be read", relative);
                collected.skipped.push(relative.clone());
            }
        }
    }

    collected
}

/// The configured targets, or the default file when none are configured.
pub fn effective_targets(config: &dyn ConfigStore) -> Vec<String> {
    let files = config.files();
    if files.is_empty() {
        vec![DEFAULT_SYNC_FILE.to_string()]
    } else {
        files
    }
}

/// Everything one sync needs.
pub struct SyncOrchestrator<'a> {
    pub config: &'a dyn ConfigStore,
    pub reader: &'a dyn FileReader,
    pub paths: &'a dyn PathCheck,
    pub credentials: &'a dyn CredentialProvider,
    pub client: &'a dyn GistClient,
    pub cancel: CancellationToken,
}

impl SyncOrchestrator<'_> {
    /// Push the configured files once.
    pub async fn perform_sync(&self) -> Result<SyncResult, SyncError> {
        let root = self.config.workspace_root().ok_or(SyncError::NoWorkspace)?;
        let targets = effective_targets(self.config);

        let collected = collect_files(&root, &targets, self.reader, self.paths);
        if collected.contents.is_empty() {
            return Err(SyncError::NoFilesFound);
        }
        let file_count = collected.contents.len();

        let files = build_payload(&root, &collected.contents, Utc::now());
        let description = gist_description(&root);

        let token = self
            .credentials
            .token()
            .map_err(|e| SyncError::Auth(format!("{e:#}")))?;

        let timeout = self.config.request_timeout();
        let (gist, is_new) = match self.config.gist_id() {
            None => {
                info!("[Sync] Creating gist with {} files", file_count);
                let gist = guarded_call(CREATE_OPERATION, timeout, &self.cancel, async {
                    self.client
                        .create(&token, &files, &description)
                        .await
                        .map_err(SyncError::from)
                })
                .await?;
                self.remember_gist(&gist)?;
                (gist, true)
            }
            Some(gist_id) => {
                info!("[Sync] Updating gist {} with {} files", gist_id, file_count);
                let gist = guarded_call(UPDATE_OPERATION, timeout, &self.cancel, async {
                    self.client
                        .update(&token, &gist_id, &files, &description)
                        .await
                        .map_err(|e| classify_update_error(e, &gist_id))
                })
                .await?;
                (gist, false)
            }
        };

        Ok(SyncResult {
            url: gist.url,
            gist_id: gist.id,
            file_count,
            is_new,
            skipped: collected.skipped,
        })
    }

    /// Store the id of a freshly created gist. A failure keeps the gist's
    /// identity in the error so it is not lost.
    fn remember_gist(&self, gist: &GistRef) -> Result<(), SyncError> {
        self.config
            .set_gist_id(&gist.id)
            .map_err(|e| SyncError::ConfigWrite {
                message: format!("{e:#}"),
                orphaned: Some(OrphanedGist {
                    id: gist.id.clone(),
                    url: gist.url.clone(),
                }),
            })
    }
}

/// A 404 on update means the gist is gone, which calls for recreating it
/// rather than retrying.
fn classify_update_error(err: RemoteError, gist_id: &str) -> SyncError {
    if err.status() == Some(404) {
        SyncError::RemoteNotFound {
            gist_id: gist_id.to_string(),
        }
    } else {
        err.into()
    }
}
