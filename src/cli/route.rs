//! CLI route: single route table and run context. Dispatches to the job and presentation.

use crate::cli::help::{command_format, command_name};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_plan_json, format_plan_text, format_run_report_json, format_run_report_text,
    format_validation_json, format_validation_text,
};
use crate::config::{ConfigLoader, PalletizerConfig};
use crate::error::PalletizerError;
use crate::job::{Job, ValidationReport};
use crate::run::{CancelToken, PacingConfig};
use crate::station::{DeviceCommand, SimulatedStation};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Runtime context for CLI execution: workspace, loaded config and station path.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PalletizerConfig,
    station_path: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PalletizerError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::from_config(workspace_root, config))
    }

    /// Create run context from an already loaded configuration.
    pub fn from_config(workspace_root: PathBuf, config: PalletizerConfig) -> Self {
        let station_path = if config.cell.station.is_absolute() {
            config.cell.station.clone()
        } else {
            workspace_root.join(&config.cell.station)
        };
        Self {
            workspace_root,
            config,
            station_path,
        }
    }

    /// Use a different station file than the configured one.
    pub fn with_station(mut self, station: Option<PathBuf>) -> Self {
        if let Some(path) = station {
            self.station_path = path;
        }
        self
    }

    pub fn config(&self) -> &PalletizerConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn station_path(&self) -> &Path {
        &self.station_path
    }

    /// Load the simulated station, wired to the configured gripper programs.
    pub fn load_station(&self) -> Result<SimulatedStation, PalletizerError> {
        let station = SimulatedStation::load(&self.station_path)?;
        Ok(station.with_gripper_programs(
            &self.config.targets.attach_program,
            &self.config.targets.drop_program,
        ))
    }

    /// Execute a command that cannot be cancelled from outside.
    pub fn execute(&self, command: &Commands) -> Result<String, PalletizerError> {
        self.execute_with_cancel(command, &CancelToken::new())
    }

    /// Execute a command; `cancel` stops a run between device commands.
    pub fn execute_with_cancel(
        &self,
        command: &Commands,
        cancel: &CancelToken,
    ) -> Result<String, PalletizerError> {
        let span = info_span!(
            "command",
            name = command_name(command),
            format = command_format(command)
        );
        let _enter = span.enter();
        check_format(command_format(command))?;

        match command {
            Commands::Plan { format } => self.handle_plan(format),
            Commands::Run {
                format,
                trace,
                no_delay,
            } => self.handle_run(format, trace.as_deref(), *no_delay, cancel),
            Commands::Validate { format } => self.handle_validate(format),
        }
    }

    fn handle_plan(&self, format: &str) -> Result<String, PalletizerError> {
        let station = self.load_station()?;
        let job = Job::prepare(&station, &self.config)?;
        if format == "json" {
            format_plan_json(&job, &self.config.stack)
        } else {
            Ok(format_plan_text(&job, &self.config.stack))
        }
    }

    fn handle_run(
        &self,
        format: &str,
        trace: Option<&Path>,
        no_delay: bool,
        cancel: &CancelToken,
    ) -> Result<String, PalletizerError> {
        let mut station = self.load_station()?;
        let job = Job::prepare(&station, &self.config)?;

        let pacing = if no_delay {
            PacingConfig {
                command_timeout_ms: self.config.pacing.command_timeout_ms,
                confirm_grip: self.config.pacing.confirm_grip,
                ..PacingConfig::immediate()
            }
        } else {
            self.config.pacing.clone()
        };

        info!(station = %self.station_path.display(), boxes = job.sequence.len(), "Starting run");
        let result = job.run(&mut station, &self.config, pacing, cancel.clone());

        // The trace is written for failed runs too; it shows where the run stopped
        if let Some(path) = trace {
            write_trace(path, station.trace())?;
        }

        let report = result?;
        if format == "json" {
            format_run_report_json(&report)
        } else {
            Ok(format_run_report_text(&report))
        }
    }

    fn handle_validate(&self, format: &str) -> Result<String, PalletizerError> {
        let report = match self.load_station() {
            Ok(station) => ValidationReport::check(&station, &self.config),
            Err(e) => {
                warn!(error = %e, "Station could not be loaded");
                ValidationReport::unreachable(&self.config, &e)
            }
        };

        let output = if format == "json" {
            format_validation_json(&report)?
        } else {
            format_validation_text(&report)
        };
        if report.is_valid() {
            Ok(output)
        } else {
            Err(PalletizerError::ValidationFailed(output))
        }
    }
}

fn check_format(format: &str) -> Result<(), PalletizerError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(PalletizerError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn write_trace(path: &Path, trace: &[DeviceCommand]) -> Result<(), PalletizerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(trace)?)?;
    info!(path = %path.display(), commands = trace.len(), "Device trace written");
    Ok(())
}
