//! Config module - Per-workspace Gist Sync configuration (.gistsync.toml).
//!
//! The configuration file contains:
//! - The list of files to sync
//! - The id of the gist they are pushed to
//! - Recovery and timeout settings

use crate::workspace::WorkspaceRoot;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name of the per-workspace config.
pub const CONFIG_FILE_NAME: &str = ".gistsync.toml";

/// File synced when nothing else is configured.
pub const DEFAULT_SYNC_FILE: &str = "TODO.md";

/// Main per-workspace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Config version (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace-relative paths to sync, in order
    #[serde(default = "default_files")]
    pub files: Vec<String>,

    /// Id of the gist this workspace syncs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gist_id: Option<String>,

    /// Extensions the active document may have to be offered when no files are found
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Timeout for each GitHub API call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay before a success status goes back to idle
    #[serde(default = "default_status_reset_secs")]
    pub status_reset_secs: u64,
}

fn default_version() -> u32 {
    1
}

fn default_files() -> Vec<String> {
    vec![DEFAULT_SYNC_FILE.to_string()]
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".md".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_status_reset_secs() -> u64 {
    5
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            files: default_files(),
            gist_id: None,
            allowed_extensions: default_allowed_extensions(),
            timeout_secs: default_timeout_secs(),
            status_reset_secs: default_status_reset_secs(),
        }
    }
}

/// Get default per-user config directory (~/.config/gistsync/).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("gistsync"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Path of the config file for a workspace.
pub fn config_path(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_FILE_NAME)
}

impl WorkspaceConfig {
    /// Load config from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;

        let config: WorkspaceConfig = toml::from_str(&content)
            .with_context(|| format!("Cannot parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Cannot serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Cannot write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_secs(self.status_reset_secs)
    }
}

/// Configuration seen by the sync orchestrator.
///
/// Each mutator persists immediately as a single write. Nothing here
/// serializes concurrent syncs; callers run one sync at a time.
pub trait ConfigStore: Send + Sync {
    /// `None` when there is no workspace to sync.
    fn workspace_root(&self) -> Option<WorkspaceRoot>;
    fn files(&self) -> Vec<String>;
    fn gist_id(&self) -> Option<String>;
    fn set_gist_id(&self, id: &str) -> Result<()>;
    fn clear_gist_id(&self) -> Result<()>;
    fn set_files(&self, files: &[String]) -> Result<()>;
    fn allowed_extensions(&self) -> Vec<String>;
    fn request_timeout(&self) -> Duration;
}

/// [`ConfigStore`] backed by `<workspace>/.gistsync.toml`.
pub struct TomlConfigStore {
    root: Option<WorkspaceRoot>,
    path: PathBuf,
    config: Mutex<WorkspaceConfig>,
}

impl TomlConfigStore {
    /// Open the config of the workspace at `workspace`.
    ///
    /// A missing workspace is not an error here; it surfaces as
    /// `workspace_root() == None` when a sync starts.
    pub fn open(workspace: &Path) -> Result<Self> {
        let root = WorkspaceRoot::open(workspace);
        let path = config_path(root.as_ref().map_or(workspace, |r| r.path.as_path()));
        let config = if root.is_some() {
            WorkspaceConfig::load_or_default(&path)?
        } else {
            WorkspaceConfig::default()
        };
        debug!("[Config] Loaded {}", path.display());
        Ok(Self {
            root,
            path,
            config: Mutex::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current configuration.
    pub fn snapshot(&self) -> WorkspaceConfig {
        self.config.lock().clone()
    }

    /// Apply `change` and persist. The in-memory copy is only updated if the
    /// write succeeds.
    fn update(&self, change: impl FnOnce(&mut WorkspaceConfig)) -> Result<()> {
        let mut guard = self.config.lock();
        let mut next = guard.clone();
        change(&mut next);
        next.save(&self.path)?;
        *guard = next;
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn workspace_root(&self) -> Option<WorkspaceRoot> {
        self.root.clone()
    }

    fn files(&self) -> Vec<String> {
        self.config.lock().files.clone()
    }

    fn gist_id(&self) -> Option<String> {
        self.config.lock().gist_id.clone()
    }

    fn set_gist_id(&self, id: &str) -> Result<()> {
        self.update(|c| c.gist_id = Some(id.to_string()))
    }

    fn clear_gist_id(&self) -> Result<()> {
        self.update(|c| c.gist_id = None)
    }

    fn set_files(&self, files: &[String]) -> Result<()> {
        self.update(|c| c.files = files.to_vec())
    }

    fn allowed_extensions(&self) -> Vec<String> {
        self.config.lock().allowed_extensions.clone()
    }

    fn request_timeout(&self) -> Duration {
        self.config.lock().request_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.files, vec!["TODO.md".to_string()]);
        assert_eq!(config.allowed_extensions, vec![".md".to_string()]);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.gist_id.is_none());
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let config = WorkspaceConfig {
            files: vec!["notes.md".to_string(), "docs/plan.md".to_string()],
            gist_id: Some("abc123".to_string()),
            ..WorkspaceConfig::default()
        };
        config.save(&config_path)?;

        let loaded = WorkspaceConfig::load(&config_path)?;
        assert_eq!(loaded.files, config.files);
        assert_eq!(loaded.gist_id, Some("abc123".to_string()));

        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "gist_id = \"xyz\"\n")?;

        let loaded = WorkspaceConfig::load(&config_path)?;
        assert_eq!(loaded.gist_id.as_deref(), Some("xyz"));
        assert_eq!(loaded.files, vec!["TODO.md".to_string()]);
        assert_eq!(loaded.timeout_secs, 30);

        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_save_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test_perms.toml");

        WorkspaceConfig::default().save(&config_path)?;

        let mode = std::fs::metadata(&config_path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "Config file should have 0600 permissions");

        Ok(())
    }

    #[test]
    fn test_store_persists_gist_id() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = TomlConfigStore::open(temp_dir.path())?;
        assert!(store.gist_id().is_none());

        store.set_gist_id("new-id")?;
        let reopened = TomlConfigStore::open(temp_dir.path())?;
        assert_eq!(reopened.gist_id().as_deref(), Some("new-id"));

        reopened.clear_gist_id()?;
        let reopened = TomlConfigStore::open(temp_dir.path())?;
        assert!(reopened.gist_id().is_none());

        Ok(())
    }

    #[test]
    fn test_store_missing_workspace() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = TomlConfigStore::open(&temp_dir.path().join("gone"))?;
        assert!(store.workspace_root().is_none());
        Ok(())
    }

    #[test]
    fn test_failed_write_keeps_memory_unchanged() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = TomlConfigStore::open(temp_dir.path())?;
        // A directory in place of the config file makes the write fail.
        std::fs::create_dir(store.path())?;

        assert!(store.set_gist_id("lost").is_err());
        assert!(store.gist_id().is_none());

        Ok(())
    }
}
