//! Gist Sync Library
//!
//! Pushes a configured set of workspace files to a single private GitHub Gist.
//! Provides:
//! - Per-workspace configuration (.gistsync.toml)
//! - Safe reading of workspace files
//! - Gist create/update with timeout and cancellation
//! - Recovery when the gist was deleted or no file could be read
//!
//! Sync is one-directional and last-write-wins.

pub mod config;
pub mod error;
pub mod sync;
pub mod utils;
pub mod workspace;

// Re-export main types
pub use config::{ConfigStore, TomlConfigStore, WorkspaceConfig};
pub use error::{RemoteError, SyncError};
pub use sync::{sync_with_recovery, SyncOrchestrator, SyncResult};
pub use workspace::WorkspaceRoot;
