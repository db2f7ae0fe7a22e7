//! Medicctl - CLI frontend for the CodeGPT extension troubleshooter.
//!
//! Renders the core's progress events in the terminal and drives report
//! export; all diagnostic and repair logic lives in medic_common.

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use medicctl::cli::{Cli, Commands};
use medicctl::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Narrative goes to stdout; the log stays on stderr
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Diagnose { save, json } => commands::diagnose(cli.verbose, save, json),
        Commands::Fix { yes } => commands::fix(cli.verbose, yes),
        Commands::RestartExtension => commands::restart_extension(),
        Commands::Reboot { delay, yes } => commands::reboot(delay, yes),
    }
}
