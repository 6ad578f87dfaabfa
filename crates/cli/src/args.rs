//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// hn-drip: post the oldest fresh Hacker News story to Bluesky, one per run
#[derive(Parser, Debug)]
#[command(name = "hn-drip")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the feed, post at most one story and advance the cursor
    Run(RunArgs),

    /// Show what the next run would do without publishing or saving
    Preview(PreviewArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run in dry-run mode (no actual publishing)
    #[arg(long)]
    pub dry_run: bool,

    /// Override the state file path
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Write rendered posts to outbox file for review instead of publishing
    #[arg(long)]
    pub require_approval: bool,

    /// Path to outbox file (used with --require-approval)
    #[arg(long)]
    pub outbox: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Override the state file path
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file and environment merged)
    Show {
        /// Config file to read (defaults to --config, then ./config.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

impl ConfigArgs {
    /// Let `config show` fall back to the global `--config` path
    pub fn with_global_config(mut self, global: Option<PathBuf>) -> Self {
        if let ConfigCommands::Show { path } = &mut self.command {
            if path.is_none() {
                *path = global;
            }
        }
        self
    }
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Check a single component
    #[arg(long, value_enum)]
    pub check: Option<DoctorCheck>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorCheck {
    Config,
    State,
    Feed,
    Bluesky,
}
