//! Recovery protocol - user-driven handling of the two recoverable failures.
//!
//! - Gist deleted remotely: offer to create a new one, then retry once.
//! - No configured file readable: offer to add the active document, then retry once.
//!
//! A retry that fails again is terminal. Every other failure is terminal on
//! the first attempt.

use super::orchestrator::{effective_targets, SyncOrchestrator};
use super::provider::SyncResult;
use super::status::{StatusIndicator, SyncStatus};
use crate::config::ConfigStore;
use crate::error::{Recoverable, SyncError};
use crate::workspace::relative_to_root;
use std::path::{Path, PathBuf};
use tracing::info;

/// The user-facing side of a sync: prompts and notifications.
pub trait Interaction {
    /// Ask a yes/no question. Anything but an explicit yes is `false`.
    fn confirm(&self, prompt: &str) -> bool;
    /// Document the user is currently looking at, if any.
    fn active_document(&self) -> Option<PathBuf>;
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Which attempt of the protocol is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Shown when nothing could be synced and no file was added.
pub const NO_FILES_GUIDANCE: &str = "No files to sync. Add paths to `files` in .gistsync.toml \
     or run `gistsync add <path>`, then sync again.";

/// Run a sync and apply at most one recovery step.
pub async fn sync_with_recovery(
    orchestrator: &SyncOrchestrator<'_>,
    interaction: &dyn Interaction,
    status: &StatusIndicator,
) -> Result<SyncResult, SyncError> {
    let mut attempt = Attempt::First;

    loop {
        status.set(SyncStatus::Syncing);
        let err = match orchestrator.perform_sync().await {
            Ok(result) => {
                status.set(SyncStatus::Synced {
                    url: result.url.clone(),
                });
                interaction.info(&success_message(&result));
                return Ok(result);
            }
            Err(err) => err,
        };

        let recovered = match (attempt, err.recoverable()) {
            (Attempt::First, Some(kind)) => {
                status.set(SyncStatus::AwaitingDecision(kind));
                recover(kind, &err, orchestrator.config, interaction)
            }
            _ => Ok(false),
        };

        match recovered {
            Ok(true) => {
                info!("[Recovery] Retrying after {:?}", err.recoverable());
                status.reset();
                attempt = Attempt::Retry;
            }
            Ok(false) => return Err(fail(err, interaction, status)),
            Err(recovery_err) => return Err(fail(recovery_err, interaction, status)),
        }
    }
}

fn fail(err: SyncError, interaction: &dyn Interaction, status: &StatusIndicator) -> SyncError {
    let message = err.to_string();
    status.set(SyncStatus::Failed(message.clone()));
    interaction.error(&message);
    err
}

fn success_message(result: &SyncResult) -> String {
    let verb = if result.is_new { "Created" } else { "Updated" };
    let noun = if result.file_count == 1 { "file" } else { "files" };
    format!("{} gist with {} {}: {}", verb, result.file_count, noun, result.url)
}

/// Returns `Ok(true)` when the user accepted and a retry should follow.
fn recover(
    kind: Recoverable,
    err: &SyncError,
    config: &dyn ConfigStore,
    interaction: &dyn Interaction,
) -> Result<bool, SyncError> {
    match (kind, err) {
        (Recoverable::RemoteNotFound, SyncError::RemoteNotFound { gist_id }) => {
            recover_missing_gist(gist_id, config, interaction)
        }
        (Recoverable::NoFilesFound, _) => recover_no_files(config, interaction),
        _ => Ok(false),
    }
}

fn recover_missing_gist(
    gist_id: &str,
    config: &dyn ConfigStore,
    interaction: &dyn Interaction,
) -> Result<bool, SyncError> {
    let prompt = format!("Gist {gist_id} no longer exists. Create a new gist?");
    if !interaction.confirm(&prompt) {
        return Ok(false);
    }
    config
        .clear_gist_id()
        .map_err(|e| SyncError::config_write(&e))?;
    info!("[Recovery] Cleared stale gist id {}", gist_id);
    Ok(true)
}

fn recover_no_files(
    config: &dyn ConfigStore,
    interaction: &dyn Interaction,
) -> Result<bool, SyncError> {
    let candidate = config.workspace_root().and_then(|root| {
        let active = interaction.active_document()?;
        if !has_allowed_extension(&active, &config.allowed_extensions()) {
            return None;
        }
        relative_to_root(&root.path, &active)
    });

    let Some(relative) = candidate else {
        interaction.warn(NO_FILES_GUIDANCE);
        return Ok(false);
    };

    let prompt = format!("None of the configured files were found. Sync {relative} instead?");
    if !interaction.confirm(&prompt) {
        interaction.warn(NO_FILES_GUIDANCE);
        return Ok(false);
    }

    let mut files = effective_targets(config);
    if !files.contains(&relative) {
        files.push(relative.clone());
    }
    config
        .set_files(&files)
        .map_err(|e| SyncError::config_write(&e))?;
    info!("[Recovery] Added {} to synced files", relative);
    Ok(true)
}

/// Case-insensitive extension match; entries may be written with or without the dot.
pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
        return false;
    };
    allowed
        .iter()
        .any(|a| a.trim_start_matches('.').to_lowercase() == ext)
}
