//! CLI definitions for PageHands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PageHands CLI.
#[derive(Parser)]
#[command(name = "pagehands")]
#[command(about = "Conversational page automation orchestrator")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagehands/config.toml)
    #[arg(short, long, env = "PAGEHANDS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Serve a host over stdin/stdout (default)
    Run {
        /// Provider settings file (default: ~/.pagehands/settings.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Seconds to wait for the host to answer an executor request
        #[arg(long, default_value_t = 30)]
        executor_timeout: u64,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List the page tools offered to the model
    Tools {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Check the configuration file for errors
    Validate,

    /// Print the effective configuration with the API key redacted
    Show,
}
