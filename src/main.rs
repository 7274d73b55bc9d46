//! repo-fleet: audit a tree of Git repositories and commit/push pending work
//!
//! `check` scans a directory interactively; `maintain` is the unattended
//! variant for cron, with an exit status that reflects what is left to do.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use repo_fleet::commands::{handle_check_command, handle_maintain_command};
use repo_fleet::core::FleetConfig;
use repo_fleet::git::set_git_timeout;

/// Logs go to stderr; RUST_LOG wins over the default level
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => FleetConfig::load_from(path)?,
        None => FleetConfig::load()?,
    };
    set_git_timeout(config.git_timeout_secs());

    match cli.command {
        Commands::Check(args) => {
            handle_check_command(args.into(), &config).await?;
            Ok(0)
        }
        Commands::Maintain(args) => handle_maintain_command(args.into(), &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.is_quiet());

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            1
        }
    };
    std::process::exit(code);
}
