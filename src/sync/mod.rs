//! Sync module - Push workspace files to a GitHub Gist.
//!
//! This module contains:
//! - GistClient trait and the GitHub implementation
//! - Credential lookup and the OAuth Device Flow
//! - The sync orchestrator and its recovery protocol
//! - Status indicator and cancellable remote calls

pub mod cancel;
pub mod credentials;
pub mod github;
pub mod oauth;
pub mod orchestrator;
pub mod payload;
pub mod provider;
pub mod recovery;
pub mod status;

pub use credentials::{CredentialChain, CredentialProvider, OAuthCredentials};
pub use github::GitHubGistClient;
pub use orchestrator::SyncOrchestrator;
pub use provider::{GistClient, GistFile, GistFiles, GistRef, SyncResult};
pub use recovery::{sync_with_recovery, Attempt, Interaction};
pub use status::{StatusIndicator, SyncStatus};
