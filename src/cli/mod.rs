//! CLI definitions and command implementations for Gist Sync.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gist Sync - push workspace files to a private GitHub Gist
#[derive(Parser)]
#[command(name = "gistsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace folder (default: current directory)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push the configured files to the gist (creates it on first run)
    Sync {
        /// Document currently open in your editor, offered when no configured file exists
        #[arg(short, long)]
        active: Option<PathBuf>,

        /// Answer yes to every prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Sign in to GitHub with the OAuth Device Flow
    Login,

    /// Remove stored GitHub credentials
    Logout,

    /// Add files to the sync list
    Add {
        /// Paths inside the workspace
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Remove files from the sync list
    Remove {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show the sync list and the linked gist
    List,

    /// Open the linked gist in the browser
    Open,
}
