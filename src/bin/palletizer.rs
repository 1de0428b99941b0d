//! Palletizer CLI Binary
//!
//! Command-line interface for planning and running pallet stacking sequences.

use clap::Parser;
use palletizer::cli::{command_name, map_error, Cli, RunContext};
use palletizer::config::ConfigLoader;
use palletizer::logging::{init_logging, LoggingConfig};
use palletizer::run::CancelToken;
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(command = command_name(&cli.command), "Palletizer CLI starting");

    // Create CLI context
    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx.with_station(cli.station.clone()),
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    // First Ctrl-C stops the run at the next device command or settle
    // slice; a second one exits even if a device command is stalled
    let cancel = CancelToken::new();
    tokio::spawn(watch_interrupts(cancel.clone()));

    // Device commands block, so the command runs off the async workers
    let command = cli.command.clone();
    let outcome =
        tokio::task::spawn_blocking(move || context.execute_with_cancel(&command, &cancel)).await;

    match outcome {
        Ok(Ok(output)) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Ok(Err(e)) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
        Err(e) => {
            error!("Command task failed: {}", e);
            eprintln!("Internal error: {}", e);
            process::exit(1);
        }
    }
}

/// Exit status after a forced interrupt (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    Cancel,
    ForceExit,
}

/// Escalate an interrupt: cancel cooperatively first, then give up.
fn on_interrupt(cancel: &CancelToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::ForceExit
    } else {
        cancel.cancel();
        Interrupt::Cancel
    }
}

async fn watch_interrupts(cancel: CancelToken) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Interrupt handler unavailable");
            return;
        }
        match on_interrupt(&cancel) {
            Interrupt::Cancel => {
                warn!("Interrupt received, stopping after the current command (press Ctrl-C again to exit)");
            }
            Interrupt::ForceExit => {
                error!("Second interrupt received, exiting");
                eprintln!("Interrupted");
                process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
