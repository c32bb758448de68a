//! GitHub OAuth Device Flow for CLI authentication.
//!
//! Flow:
//! 1. Request a device code from GitHub
//! 2. The user opens the verification URL and enters the code
//! 3. Poll until GitHub hands out an access token
//! 4. The token is stored for later gist calls

use super::credentials::OAuthCredentials;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Scope needed to create and update gists.
const GIST_SCOPE: &str = "gist";

/// Read the OAuth App client id from the environment.
fn github_client_id() -> Result<String> {
    std::env::var("GISTSYNC_CLIENT_ID")
        .or_else(|_| std::env::var("GITHUB_CLIENT_ID"))
        .context("Set GISTSYNC_CLIENT_ID to the client id of your GitHub OAuth App")
}

/// Response from the device code request.
#[derive(Debug, Deserialize)]
pub struct DeviceCodeResponse {
    /// Code sent back to GitHub while polling
    pub device_code: String,
    /// Code the user types into the browser
    pub user_code: String,
    /// URL the user opens (github.com/login/device)
    pub verification_uri: String,
    /// Lifetime of device_code (seconds)
    pub expires_in: u64,
    /// Minimum interval between polls (seconds)
    pub interval: u64,
}

/// Response from the access token request.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    /// New interval sent along with `slow_down`
    #[serde(default)]
    interval: Option<u64>,
}

/// Result of a single poll.
#[derive(Debug)]
enum PollOutcome {
    Granted(OAuthCredentials),
    Pending,
    SlowDown(Option<u64>),
}

/// OAuth Device Flow implementation.
pub struct OAuthDeviceFlow {
    client: reqwest::Client,
    client_id: String,
}

impl OAuthDeviceFlow {
    /// Create with the client id from the environment.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client_id(&github_client_id()?))
    }

    pub fn with_client_id(client_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.to_string(),
        }
    }

    /// Step 1: request a device code.
    pub async fn request_device_code(&self) -> Result<DeviceCodeResponse> {
        let response = self
            .client
            .post(DEVICE_CODE_URL)
            .header("Accept", "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", GIST_SCOPE)])
            .send()
            .await
            .context("Cannot request device code from GitHub")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub returned error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Cannot parse device code response")
    }

    async fn poll_once(&self, device_code: &DeviceCodeResponse) -> Result<PollOutcome> {
        let response = self
            .client
            .post(ACCESS_TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("device_code", device_code.device_code.as_str()),
                ("grant_type", DEVICE_GRANT_TYPE),
            ])
            .send()
            .await
            .context("Cannot poll for access token")?;

        let text = response.text().await.context("Cannot read response")?;
        let token: AccessTokenResponse = serde_json::from_str(&text)
            .with_context(|| format!("Cannot parse access token response: {}", text))?;
        interpret_token_response(token)
    }

    /// Step 2: poll until the user has authorized the device or the code expires.
    pub async fn poll_for_token(
        &self,
        device_code: &DeviceCodeResponse,
    ) -> Result<OAuthCredentials> {
        let deadline = Instant::now() + Duration::from_secs(device_code.expires_in);
        let mut interval = Duration::from_secs(device_code.interval.max(5));

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = loop {
            tokio::time::sleep(interval).await;

            let now = Instant::now();
            if now >= deadline {
                break Err(anyhow::anyhow!("Device code expired. Please try again."));
            }
            spinner.set_message(format!(
                "Waiting for authorization in the browser... ({}s left)",
                (deadline - now).as_secs()
            ));

            match self.poll_once(device_code).await {
                Ok(PollOutcome::Granted(creds)) => break Ok(creds),
                Ok(PollOutcome::Pending) => continue,
                Ok(PollOutcome::SlowDown(new_interval)) => {
                    interval = match new_interval {
                        Some(secs) => Duration::from_secs(secs),
                        None => interval + Duration::from_secs(5),
                    };
                }
                Err(e) => break Err(e),
            }
        };

        spinner.finish_and_clear();
        result
    }

    /// Full flow: request a device code, show instructions, poll for the token.
    pub async fn authenticate<F>(&self, display_instructions: F) -> Result<OAuthCredentials>
    where
        F: FnOnce(&DeviceCodeResponse),
    {
        let device_code = self.request_device_code().await?;
        display_instructions(&device_code);
        self.poll_for_token(&device_code).await
    }
}

fn interpret_token_response(token: AccessTokenResponse) -> Result<PollOutcome> {
    // A token wins over any error field.
    if let Some(access_token) = token.access_token {
        return Ok(PollOutcome::Granted(OAuthCredentials {
            access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            scope: token.scope.unwrap_or_default(),
        }));
    }

    match token.error.as_deref() {
        None | Some("authorization_pending") => Ok(PollOutcome::Pending),
        Some("slow_down") => Ok(PollOutcome::SlowDown(token.interval)),
        Some("expired_token") => bail!("Device code expired. Please try again."),
        Some("access_denied") => bail!("User denied authorization."),
        Some(other) => {
            let desc = token
                .error_description
                .as_deref()
                .unwrap_or("Unknown error");
            bail!("OAuth error: {} - {}", other, desc)
        }
    }
}
