//! Credential storage - where the GitHub token comes from.
//!
//! Lookup order: `GITHUB_TOKEN` environment variable, system keyring, then the
//! credentials file in the per-user config dir.

use crate::config::default_config_dir;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const KEYRING_SERVICE: &str = "gistsync";
const KEYRING_USER: &str = "github_token";
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Stored OAuth credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
}

/// Supplies a bearer token for GitHub API calls.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Result<String>;
}

/// Default path of the credentials fallback file.
pub fn default_credentials_path() -> PathBuf {
    default_config_dir().join("credentials.json")
}

/// Tries every credential source in turn.
pub struct CredentialChain {
    use_env: bool,
    use_keyring: bool,
    file_path: PathBuf,
}

impl Default for CredentialChain {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialChain {
    pub fn new() -> Self {
        Self {
            use_env: true,
            use_keyring: true,
            file_path: default_credentials_path(),
        }
    }

    /// Only read the given credentials file (for tests and scripted use).
    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self {
            use_env: false,
            use_keyring: false,
            file_path: path.into(),
        }
    }
}

impl CredentialProvider for CredentialChain {
    fn token(&self) -> Result<String> {
        if self.use_env {
            if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
                if !token.trim().is_empty() {
                    debug!("[Credentials] Using token from {}", TOKEN_ENV_VAR);
                    return Ok(token.trim().to_string());
                }
            }
        }

        if self.use_keyring {
            match keyring_token() {
                Ok(token) => {
                    debug!("[Credentials] Using token from system keyring");
                    return Ok(token);
                }
                Err(e) => debug!("[Credentials] Keyring unavailable: {:#}", e),
            }
        }

        if self.file_path.exists() {
            let creds = load_credentials_from_file(&self.file_path)?;
            return Ok(creds.access_token);
        }

        bail!("Not signed in to GitHub. Run `gistsync login` or set {TOKEN_ENV_VAR}")
    }
}

fn keyring_entry() -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).context("Cannot open system keyring")
}

fn keyring_token() -> Result<String> {
    let token = keyring_entry()?
        .get_password()
        .context("No token in system keyring")?;
    Ok(token)
}

/// Save credentials to the system keyring, falling back to the credentials file.
///
/// Returns where the token ended up.
pub fn save_credentials(credentials: &OAuthCredentials) -> Result<String> {
    match keyring_entry().and_then(|entry| {
        entry
            .set_password(&credentials.access_token)
            .context("Cannot write to system keyring")
    }) {
        Ok(()) => Ok("system keyring".to_string()),
        Err(e) => {
            debug!("[Credentials] {:#}, falling back to file", e);
            let path = default_credentials_path();
            save_credentials_to_file(credentials, &path)?;
            Ok(path.display().to_string())
        }
    }
}

/// Remove stored credentials from both the keyring and the fallback file.
pub fn delete_credentials() -> Result<()> {
    if let Ok(entry) = keyring_entry() {
        if let Err(e) = entry.delete_credential() {
            debug!("[Credentials] Nothing removed from keyring: {}", e);
        }
    }
    let path = default_credentials_path();
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Cannot remove {}", path.display()))?;
    }
    Ok(())
}

/// Fallback: save credentials to a JSON file.
pub fn save_credentials_to_file(credentials: &OAuthCredentials, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(credentials)?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write credentials file: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Load credentials from a JSON file.
pub fn load_credentials_from_file(path: &Path) -> Result<OAuthCredentials> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read credentials file: {}", path.display()))?;
    let credentials: OAuthCredentials = serde_json::from_str(&json)
        .with_context(|| format!("Cannot parse credentials file: {}", path.display()))?;
    Ok(credentials)
}
