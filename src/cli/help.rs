//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log spans (e.g. "plan", "run").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Plan { .. } => "plan",
        Commands::Run { .. } => "run",
        Commands::Validate { .. } => "validate",
    }
}

/// Output format requested by a command.
pub fn command_format(command: &Commands) -> &str {
    match command {
        Commands::Plan { format } | Commands::Run { format, .. } | Commands::Validate { format } => {
            format
        }
    }
}
