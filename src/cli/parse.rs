//! CLI parse: clap types for the palletizer. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Palletizer CLI - layered pick-and-place sequencing for a robot cell
#[derive(Parser, Debug)]
#[command(name = "palletizer")]
#[command(about = "Generate and run layered pallet stacking sequences")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Station definition file (overrides cell.station)
    #[arg(long)]
    pub station: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve taught targets and print the placement sequence
    Plan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Execute the placement sequence on the station
    Run {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Write the issued device commands to this file as JSON
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Skip start delay and settle pauses
        #[arg(long)]
        no_delay: bool,
    },
    /// Check configuration and taught targets without moving
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
