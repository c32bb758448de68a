//! Failure taxonomy for a sync run.
//!
//! `SyncError` is what the orchestrator returns; `RemoteError` is the narrower
//! shape the Gist client reports before the orchestrator classifies it.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A gist that was created remotely but whose id could not be stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedGist {
    pub id: String,
    pub url: String,
}

impl fmt::Display for OrphanedGist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gist {} ({})", self.id, self.url)
    }
}

/// Which of the two recoverable failures needs a user decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recoverable {
    NoFilesFound,
    RemoteNotFound,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No workspace folder is open")]
    NoWorkspace,

    #[error("None of the configured files could be read")]
    NoFilesFound,

    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    #[error("Cannot save configuration: {message}{}", orphan_suffix(.orphaned))]
    ConfigWrite {
        message: String,
        /// Set when the remote create succeeded before the local save failed.
        orphaned: Option<OrphanedGist>,
    },

    #[error("Gist {gist_id} was not found (it may have been deleted)")]
    RemoteNotFound { gist_id: String },

    #[error("HTTP {status} error at {endpoint}: {status_text}")]
    RemoteTransport {
        status: u16,
        status_text: String,
        body: String,
        endpoint: String,
    },

    #[error("Request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },

    #[error("Operation \"{operation}\" timed out after {}ms", .duration.as_millis())]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Operation \"{operation}\" was cancelled")]
    Cancelled { operation: String },
}

fn orphan_suffix(orphaned: &Option<OrphanedGist>) -> String {
    match orphaned {
        Some(gist) => format!(" (created {gist}; add its id to the config to keep using it)"),
        None => String::new(),
    }
}

impl SyncError {
    /// The recovery protocol only intercepts these two kinds.
    pub fn recoverable(&self) -> Option<Recoverable> {
        match self {
            Self::NoFilesFound => Some(Recoverable::NoFilesFound),
            Self::RemoteNotFound { .. } => Some(Recoverable::RemoteNotFound),
            _ => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable().is_some()
    }

    pub(crate) fn config_write(err: &anyhow::Error) -> Self {
        Self::ConfigWrite {
            message: format!("{err:#}"),
            orphaned: None,
        }
    }
}

/// Failure reported by a [`GistClient`](crate::sync::GistClient) call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("HTTP {status} error at {endpoint}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
        endpoint: String,
    },

    #[error("Request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http {
                status,
                status_text,
                body,
                endpoint,
            } => Self::RemoteTransport {
                status,
                status_text,
                body,
                endpoint,
            },
            RemoteError::Network { endpoint, message } => Self::Network { endpoint, message },
        }
    }
}
