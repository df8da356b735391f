//! CLI for the reindex client.

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_man, run_reindex, run_show_config};

pub use commands::ReportedFault;

/// True when the error was already shown on the console surface.
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ReportedFault>().is_some()
}

/// Top-level CLI for the reindex client.
#[derive(Debug, Parser)]
#[command(name = "reindex")]
#[command(about = "Drive a batched server-side reindex to completion", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Start one reindexing run over all configured categories.
    Run {
        /// Config file to use instead of ~/.config/reindex/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Category to drive; repeat to set the order. Replaces the configured list.
        #[arg(long = "category", value_name = "NAME")]
        categories: Vec<String>,
    },

    /// Show the resolved config path, endpoint and declared totals.
    Config {
        /// Config file to use instead of ~/.config/reindex/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { config, categories } => {
                run_reindex(config.as_deref(), categories).await?
            }
            CliCommand::Config { config } => run_show_config(config.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}
