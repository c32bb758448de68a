//! Command implementations for the Gist Sync CLI.
//!
//! Main commands:
//! - sync: push the configured files to the gist, with recovery prompts
//! - login / logout: manage the GitHub token
//! - add / remove / list: edit and inspect the sync list
//! - open: open the gist in the browser

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gistsync::config::{ConfigStore, TomlConfigStore};
use gistsync::sync::credentials::{delete_credentials, save_credentials};
use gistsync::sync::oauth::OAuthDeviceFlow;
use gistsync::sync::orchestrator::effective_targets;
use gistsync::sync::{
    sync_with_recovery, CredentialChain, GitHubGistClient, Interaction, StatusIndicator,
    SyncOrchestrator, SyncStatus,
};
use gistsync::utils::{gist_web_url, open_browser};
use gistsync::workspace::{
    relative_to_root, resolve_target, FsFileReader, PathCheck, PrefixPathCheck, WorkspaceRoot,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Prompts and notifications on the terminal.
struct TerminalInteraction {
    assume_yes: bool,
    active: Option<PathBuf>,
    /// Ctrl-C while a prompt is open counts as "no".
    interrupted: CancellationToken,
}

impl Interaction for TerminalInteraction {
    fn confirm(&self, prompt: &str) -> bool {
        if self.interrupted.is_cancelled() {
            return false;
        }
        let answer = if self.assume_yes {
            println!("{} {}", prompt, "yes".green());
            true
        } else {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        };
        answer && !self.interrupted.is_cancelled()
    }

    fn active_document(&self) -> Option<PathBuf> {
        let active = self.active.as_ref()?;
        if active.is_absolute() {
            Some(active.clone())
        } else {
            std::env::current_dir().ok().map(|cwd| cwd.join(active))
        }
    }

    fn info(&self, message: &str) {
        println!("  {} {}", "✓".green(), message);
    }

    fn warn(&self, message: &str) {
        eprintln!("  {} {}", "!".yellow(), message.yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("  {} {}", "✗".red(), message.red());
    }
}

fn render_status(status: &SyncStatus) {
    match status {
        SyncStatus::Syncing => println!("{}", "Syncing to gist...".cyan()),
        SyncStatus::AwaitingDecision(kind) => {
            tracing::debug!("Waiting for a decision on {:?}", kind)
        }
        other => tracing::debug!("Status: {:?}", other),
    }
}

fn workspace_dir(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("Cannot determine current directory"),
    }
}

fn open_workspace(store: &TomlConfigStore) -> Result<WorkspaceRoot> {
    match store.workspace_root() {
        Some(root) => Ok(root),
        None => bail!("No workspace folder at {}", store.path().display()),
    }
}

// ============ SYNC COMMAND ============

pub fn sync(workspace: Option<PathBuf>, active: Option<PathBuf>, yes: bool) -> Result<ExitCode> {
    let store = TomlConfigStore::open(&workspace_dir(workspace)?)?;
    let reset_delay = store.snapshot().status_reset_delay();

    let reader = FsFileReader;
    let paths = PrefixPathCheck;
    let credentials = CredentialChain::new();
    let client = GitHubGistClient::new();
    let cancel = CancellationToken::new();
    let interaction = TerminalInteraction {
        assume_yes: yes,
        active,
        interrupted: cancel.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let status = StatusIndicator::new(reset_delay, render_status);
        let orchestrator = SyncOrchestrator {
            config: &store,
            reader: &reader,
            paths: &paths,
            credentials: &credentials,
            client: &client,
            cancel: cancel.clone(),
        };
        sync_with_recovery(&orchestrator, &interaction, &status).await
    });

    // The failure itself was already reported by the interaction.
    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

// ============ AUTH COMMANDS ============

pub fn login() -> Result<ExitCode> {
    println!("{}", "GitHub OAuth Device Flow".cyan().bold());

    let oauth = OAuthDeviceFlow::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    let credentials = rt.block_on(oauth.authenticate(|device_code| {
        println!("\nTo sign in to GitHub:");
        println!(
            "  1. Open: {}",
            device_code.verification_uri.cyan().bold()
        );
        println!("  2. Enter code: {}", device_code.user_code.yellow().bold());
        println!(
            "\nWaiting for authorization (expires in {} seconds)...",
            device_code.expires_in
        );
        let _ = open_browser(&device_code.verification_uri);
    }))?;

    let location = save_credentials(&credentials)?;
    println!("  {} Signed in. Token saved to {}", "✓".green(), location);
    Ok(ExitCode::SUCCESS)
}

pub fn logout() -> Result<ExitCode> {
    delete_credentials()?;
    println!("  {} Stored credentials removed", "✓".green());
    Ok(ExitCode::SUCCESS)
}

// ============ SYNC LIST COMMANDS ============

/// Turn a user-supplied path into a workspace-relative target.
///
/// `None` when the path resolves outside the workspace.
fn to_target(root: &WorkspaceRoot, raw: &str, cwd: &Path) -> Option<String> {
    let given = Path::new(raw);
    let candidate = if given.is_absolute() {
        given.to_path_buf()
    } else {
        cwd.join(given)
    };
    let relative = match relative_to_root(&root.path, &candidate) {
        Some(relative) => relative,
        None if given.is_relative() => raw.replace('\\', "/"),
        None => return None,
    };
    let resolved = resolve_target(&root.path, &relative);
    PrefixPathCheck
        .is_safe(&root.path, &resolved)
        .then_some(relative)
}

pub fn add(workspace: Option<PathBuf>, raw_paths: &[String]) -> Result<ExitCode> {
    let store = TomlConfigStore::open(&workspace_dir(workspace)?)?;
    let root = open_workspace(&store)?;

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let mut files = effective_targets(&store);
    for raw in raw_paths {
        match to_target(&root, raw, &cwd) {
            Some(target) if files.contains(&target) => {
                println!("  {} {} (already listed)", "·".dimmed(), target);
            }
            Some(target) => {
                println!("  {} {}", "+".green(), target);
                files.push(target);
            }
            None => println!(
                "  {} {} is outside the workspace, skipped",
                "!".yellow(),
                raw
            ),
        }
    }

    store.set_files(&files)?;
    Ok(ExitCode::SUCCESS)
}

pub fn remove(workspace: Option<PathBuf>, raw_paths: &[String]) -> Result<ExitCode> {
    let store = TomlConfigStore::open(&workspace_dir(workspace)?)?;
    let root = open_workspace(&store)?;

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let mut files = store.files();
    for raw in raw_paths {
        let target = to_target(&root, raw, &cwd).unwrap_or_else(|| raw.clone());
        let before = files.len();
        files.retain(|f| f != &target && f != raw);
        if files.len() < before {
            println!("  {} {}", "-".red(), target);
        } else {
            println!("  {} {} is not in the sync list", "·".dimmed(), raw);
        }
    }

    store.set_files(&files)?;
    Ok(ExitCode::SUCCESS)
}

pub fn list(workspace: Option<PathBuf>) -> Result<ExitCode> {
    let store = TomlConfigStore::open(&workspace_dir(workspace)?)?;
    let root = open_workspace(&store)?;
    let config = store.snapshot();

    println!(
        "{} {}",
        root.name.white().bold(),
        root.path.display().to_string().dimmed()
    );
    println!("Config: {}", store.path().display().to_string().dimmed());
    println!();

    let check = PrefixPathCheck;
    for relative in effective_targets(&store) {
        let resolved = resolve_target(&root.path, &relative);
        let state = if !check.is_safe(&root.path, &resolved) {
            "outside workspace".red()
        } else if resolved.is_file() {
            "ok".green()
        } else {
            "missing".yellow()
        };
        println!("  {} [{}]", relative, state);
    }
    println!();

    match &config.gist_id {
        Some(id) => println!("Gist: {} {}", id.cyan(), gist_web_url(id).dimmed()),
        None => println!("{}", "No gist yet - the next sync creates one.".dimmed()),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn open(workspace: Option<PathBuf>) -> Result<ExitCode> {
    let store = TomlConfigStore::open(&workspace_dir(workspace)?)?;
    let Some(id) = store.gist_id() else {
        println!("{}", "No gist yet. Run `gistsync sync` first.".yellow());
        return Ok(ExitCode::FAILURE);
    };

    let url = gist_web_url(&id);
    if !open_browser(&url) {
        println!("Open {} in your browser", url.cyan());
    }
    Ok(ExitCode::SUCCESS)
}
