//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --color, --verbose, --config) are inherited by all subcommands
//! - `up` and `destroy` confirm interactively unless `--yes` is given

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// otelstack - deploy an OpenTelemetry collector to Azure Container Apps
#[derive(Parser, Debug)]
#[command(name = "otelstack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Stack configuration file
    #[arg(short, long, global = true, default_value = "otelstack.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what `up` would change without touching anything
    Preview {
        /// Show per-property diffs
        #[arg(long)]
        diff: bool,
    },

    /// Create or update the collector stack
    Up {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show per-property diffs before applying
        #[arg(long)]
        diff: bool,
    },

    /// Delete every resource recorded in state
    Destroy {
        /// Skip the confirmation prompt (required when not interactive)
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the stack outputs recorded by the last run
    Outputs,

    /// Print the digest of the collector configuration file
    Hash,
}
