//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use gistsync::config::ConfigStore;
use gistsync::error::RemoteError;
use gistsync::sync::{CredentialProvider, GistClient, GistFiles, GistRef, Interaction};
use gistsync::workspace::WorkspaceRoot;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A temporary workspace folder.
pub struct TestWorkspace {
    _dir: TempDir,
    pub root: WorkspaceRoot,
}

impl TestWorkspace {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(name);
        std::fs::create_dir(&path).expect("workspace dir");
        let root = WorkspaceRoot::open(&path).expect("workspace root");
        Self { _dir: dir, root }
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// A file next to the workspace folder, outside of it.
    pub fn write_outside(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path.parent().expect("parent").join(name);
        std::fs::write(&path, content).expect("write file");
        path
    }
}

/// In-memory config store.
pub struct MemoryConfig {
    pub root: Option<WorkspaceRoot>,
    pub files: Mutex<Vec<String>>,
    pub gist_id: Mutex<Option<String>>,
    pub allowed_extensions: Vec<String>,
    pub timeout: Duration,
    pub fail_writes: bool,
    pub set_gist_id_calls: Mutex<Vec<String>>,
}

impl MemoryConfig {
    pub fn new(root: &WorkspaceRoot, files: &[&str]) -> Self {
        Self {
            root: Some(root.clone()),
            files: Mutex::new(files.iter().map(|f| f.to_string()).collect()),
            gist_id: Mutex::new(None),
            allowed_extensions: vec![".md".to_string()],
            timeout: Duration::from_secs(30),
            fail_writes: false,
            set_gist_id_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_workspace() -> Self {
        Self {
            root: None,
            files: Mutex::new(vec!["TODO.md".to_string()]),
            gist_id: Mutex::new(None),
            allowed_extensions: vec![".md".to_string()],
            timeout: Duration::from_secs(30),
            fail_writes: false,
            set_gist_id_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gist_id(self, id: &str) -> Self {
        *self.gist_id.lock() = Some(id.to_string());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ConfigStore for MemoryConfig {
    fn workspace_root(&self) -> Option<WorkspaceRoot> {
        self.root.clone()
    }

    fn files(&self) -> Vec<String> {
        self.files.lock().clone()
    }

    fn gist_id(&self) -> Option<String> {
        self.gist_id.lock().clone()
    }

    fn set_gist_id(&self, id: &str) -> Result<()> {
        self.set_gist_id_calls.lock().push(id.to_string());
        if self.fail_writes {
            bail!("Cannot write config file: read-only");
        }
        *self.gist_id.lock() = Some(id.to_string());
        Ok(())
    }

    fn clear_gist_id(&self) -> Result<()> {
        if self.fail_writes {
            bail!("Cannot write config file: read-only");
        }
        *self.gist_id.lock() = None;
        Ok(())
    }

    fn set_files(&self, files: &[String]) -> Result<()> {
        if self.fail_writes {
            bail!("Cannot write config file: read-only");
        }
        *self.files.lock() = files.to_vec();
        Ok(())
    }

    fn allowed_extensions(&self) -> Vec<String> {
        self.allowed_extensions.clone()
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}

pub struct StaticToken(pub Option<&'static str>);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Result<String> {
        match self.0 {
            Some(token) => Ok(token.to_string()),
            None => bail!("Not signed in to GitHub"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Call {
    Create {
        token: String,
        files: GistFiles,
        description: String,
    },
    Update {
        gist_id: String,
        files: GistFiles,
    },
}

/// Gist client replaying scripted responses.
///
/// Without a script, create returns `new-gist` and update echoes the id.
#[derive(Default)]
pub struct MockGistClient {
    pub calls: Mutex<Vec<Call>>,
    pub create_responses: Mutex<VecDeque<Result<GistRef, RemoteError>>>,
    pub update_responses: Mutex<VecDeque<Result<GistRef, RemoteError>>>,
    /// Hang forever instead of answering.
    pub hang: bool,
}

impl MockGistClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn push_update(&self, response: Result<GistRef, RemoteError>) {
        self.update_responses.lock().push_back(response);
    }

    pub fn push_create(&self, response: Result<GistRef, RemoteError>) {
        self.create_responses.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count()
    }
}

pub fn gist(id: &str) -> GistRef {
    GistRef {
        id: id.to_string(),
        url: format!("https://gist.github.com/{id}"),
    }
}

pub fn http_error(status: u16, status_text: &str, endpoint: &str) -> RemoteError {
    RemoteError::Http {
        status,
        status_text: status_text.to_string(),
        body: format!("{{\"message\":\"{status_text}\"}}"),
        endpoint: endpoint.to_string(),
    }
}

#[async_trait]
impl GistClient for MockGistClient {
    async fn create(
        &self,
        token: &str,
        files: &GistFiles,
        description: &str,
    ) -> Result<GistRef, RemoteError> {
        self.calls.lock().push(Call::Create {
            token: token.to_string(),
            files: files.clone(),
            description: description.to_string(),
        });
        if self.hang {
            std::future::pending::<()>().await;
        }
        let scripted = self.create_responses.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(gist("new-gist")))
    }

    async fn update(
        &self,
        _token: &str,
        gist_id: &str,
        files: &GistFiles,
        _description: &str,
    ) -> Result<GistRef, RemoteError> {
        self.calls.lock().push(Call::Update {
            gist_id: gist_id.to_string(),
            files: files.clone(),
        });
        if self.hang {
            std::future::pending::<()>().await;
        }
        let scripted = self.update_responses.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(gist(gist_id)))
    }
}

/// Scripted user: fixed answers, records everything shown.
pub struct ScriptedUser {
    pub answers: Mutex<VecDeque<bool>>,
    pub active: Option<PathBuf>,
    pub prompts: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl ScriptedUser {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            active: None,
            prompts: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn with_active(mut self, path: &Path) -> Self {
        self.active = Some(path.to_path_buf());
        self
    }
}

impl Interaction for ScriptedUser {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }

    fn active_document(&self) -> Option<PathBuf> {
        self.active.clone()
    }

    fn info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}
