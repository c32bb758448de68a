//! GitHub Gist client - create and update gists over the REST API.

use super::provider::{GistClient, GistFiles, GistRef};
use crate::error::RemoteError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Public GitHub API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = "gistsync";

#[derive(Serialize)]
struct GistRequest<'a> {
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<bool>,
    files: &'a GistFiles,
}

#[derive(Deserialize)]
struct GistResponse {
    id: String,
    html_url: String,
}

/// [`GistClient`] talking to the GitHub REST API.
pub struct GitHubGistClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GitHubGistClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubGistClient {
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_URL)
    }

    /// Client for another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        endpoint: String,
        token: &str,
        body: &GistRequest<'_>,
    ) -> Result<GistRef, RemoteError> {
        let network = |e: reqwest::Error| RemoteError::Network {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        };

        let payload = serde_json::to_vec(body).map_err(|e| RemoteError::Network {
            endpoint: endpoint.clone(),
            message: format!("Cannot encode request: {e}"),
        })?;

        debug!("[GitHub] {} {} ({} files)", method, endpoint, body.files.len());
        let response = self
            .client
            .request(method, &endpoint)
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .header(API_VERSION_HEADER, API_VERSION)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .body(payload)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
                endpoint: endpoint.clone(),
            });
        }

        let gist: GistResponse = response.json().await.map_err(network)?;
        Ok(GistRef {
            id: gist.id,
            url: gist.html_url,
        })
    }
}

#[async_trait]
impl GistClient for GitHubGistClient {
    async fn create(
        &self,
        token: &str,
        files: &GistFiles,
        description: &str,
    ) -> Result<GistRef, RemoteError> {
        let request = GistRequest {
            description,
            public: Some(false),
            files,
        };
        let gist = self
            .send(
                reqwest::Method::POST,
                format!("{}/gists", self.base_url),
                token,
                &request,
            )
            .await?;
        info!("[GitHub] Created gist {}", gist.id);
        Ok(gist)
    }

    async fn update(
        &self,
        token: &str,
        gist_id: &str,
        files: &GistFiles,
        description: &str,
    ) -> Result<GistRef, RemoteError> {
        let request = GistRequest {
            description,
            public: None,
            files,
        };
        let gist = self
            .send(
                reqwest::Method::PATCH,
                format!("{}/gists/{}", self.base_url, gist_id),
                token,
                &request,
            )
            .await?;
        info!("[GitHub] Updated gist {}", gist.id);
        Ok(gist)
    }
}
