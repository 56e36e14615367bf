//! CLI command definitions and parsing
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pmstore",
    version,
    author = "neur0map",
    about = "Per-agent policy monitoring event store",
    long_about = "pmstore records policy monitoring findings into one SQLite store per agent, \
                  deduplicating repeated log lines and extracting PCI-DSS and CIS references."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/pmstore/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies the agent store a command operates on
#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    /// Numeric agent id
    #[arg(short, long)]
    pub agent: u32,

    /// Event location, e.g. "(web01) 10.0.0.5->rootcheck"
    #[arg(short, long)]
    pub location: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert the first occurrence of a finding
    Record {
        #[command(flatten)]
        target: AgentArgs,

        /// Unix timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Raw log line
        log: String,
    },

    /// Advance the last seen date of an existing finding
    Update {
        #[command(flatten)]
        target: AgentArgs,

        /// Unix timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Raw log line
        log: String,
    },

    /// Insert or advance a finding, letting the store decide
    Observe {
        #[command(flatten)]
        target: AgentArgs,

        /// Unix timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Raw log line
        log: String,
    },

    /// List the most recently seen findings of an agent
    Show {
        #[command(flatten)]
        target: AgentArgs,

        /// Maximum number of records
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the compliance tags found in a log line
    Tags {
        /// Raw log line
        log: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
