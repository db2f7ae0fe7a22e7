//! Command-line surface for medicctl.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medicctl")]
#[command(about = "CodeGPT extension troubleshooter", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Also write progress narrative to the debug log
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full diagnostic pipeline
    Diagnose {
        /// Save the narrative report to a text file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Save the structured report as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Diagnose, then attempt automated fixes for detected issues
    Fix {
        /// Apply fixes without asking for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Restart the editor's extension host
    RestartExtension,

    /// Schedule a host reboot to apply network changes
    Reboot {
        /// Delay before the reboot, in seconds
        #[arg(long, default_value_t = 60)]
        delay: u32,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
