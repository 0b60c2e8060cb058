//! otelstack CLI - deploy an OpenTelemetry collector to Azure Container Apps
//!
//! Usage: otelstack [--config PATH] <COMMAND>
//!
//! Commands:
//!   preview  Show what `up` would change
//!   up       Create or update the collector stack
//!   destroy  Delete every resource recorded in state
//!   outputs  Print recorded stack outputs
//!   hash     Print the collector config digest

mod commands;
mod ui;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use otelstack::presentation::{Cli, Commands, UiContext};
use otelstack::Config;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    if let Err(err) = run(cli) {
        ui::error::print_error(&err, json);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from warn
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "otelstack=info",
        2 => "otelstack=debug",
        _ => "otelstack=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = Config::load_or_default(&cli.config)?;
    let ui = UiContext::new(cli.json, cli.verbose, cli.color, &config);
    ui::output::print_config_warnings(&cli.config, &warnings, &ui);
    debug!(stack = %config.stack.name, config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Preview { diff } => commands::deploy::cmd_preview(&config, &ui, diff),
        Commands::Up { yes, diff } => {
            commands::deploy::cmd_up(&config, &ui, yes, diff, interrupt_flag())
        }
        Commands::Destroy { yes } => {
            commands::deploy::cmd_destroy(&config, &ui, yes, interrupt_flag())
        }
        Commands::Outputs => commands::outputs::cmd_outputs(&config, &ui),
        Commands::Hash => commands::hash::cmd_hash(&config, &ui),
    }
}

/// Ctrl-C sets the flag; the run stops before its next step
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            // second Ctrl-C: give up immediately
            std::process::exit(130);
        }
        eprintln!("\nInterrupt received; stopping after the current step...");
    }) {
        warn!(%err, "could not install Ctrl-C handler");
    }
    flag
}
