//! Gist Sync CLI - push workspace files to a private GitHub Gist.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("gistsync={}", log_level).parse()?),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Sync { active, yes } => cli::commands::sync(cli.workspace, active, yes),
        Commands::Login => cli::commands::login(),
        Commands::Logout => cli::commands::logout(),
        Commands::Add { paths } => cli::commands::add(cli.workspace, &paths),
        Commands::Remove { paths } => cli::commands::remove(cli.workspace, &paths),
        Commands::List => cli::commands::list(cli.workspace),
        Commands::Open => cli::commands::open(cli.workspace),
    }
}
