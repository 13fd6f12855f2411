use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_config, ConfigEnv};
use crate::logging;
use crate::logs::{self, LogsArgs};

#[derive(Debug, Parser)]
#[command(name = "tailbox")]
#[command(about = "Live scrolling log viewer", long_about = None, version)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/tailbox/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write diagnostics to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream log lines through a live scrolling view
    Logs(LogsArgs),
}

/// Runs the parsed command and returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("tailbox: {err:#}");
            1
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let log_file = logging::resolve_log_file(cli.log_file);
    logging::init(log_file.as_deref())?;

    let config = load_config(&ConfigEnv::from_env(cli.config))?;
    match cli.command {
        Commands::Logs(args) => logs::run(&args, &config).await,
    }
}
