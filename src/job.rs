//! A palletizing job: the cell resolved against a configuration.
//!
//! Preparing a job does all the checking up front: configuration, cell
//! items, taught targets and sequence generation. Nothing moves until a
//! prepared job is run.

use crate::config::PalletizerConfig;
use crate::error::{ConfigurationError, PalletizerError, RunError};
use crate::gateway::DeviceGateway;
use crate::plan::{generate, PlacementSequence};
use crate::run::{CancelToken, Pacer, PacingConfig, RunReport, Runner};
use crate::targets::{CellHandles, TaughtTargets};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Resolved handles, taught targets and the generated placement sequence.
#[derive(Debug, Clone)]
pub struct Job {
    pub cell: CellHandles,
    pub targets: TaughtTargets,
    pub sequence: PlacementSequence,
}

impl Job {
    /// Validate the configuration, resolve every cell item and taught
    /// target, then generate the sequence.
    pub fn prepare<G: DeviceGateway + ?Sized>(
        gateway: &G,
        config: &PalletizerConfig,
    ) -> Result<Self, PalletizerError> {
        if let Err(errors) = config.validate() {
            let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
            return Err(ConfigurationError::Invalid(lines.join("\n")).into());
        }

        let cell = CellHandles::resolve(gateway, &config.cell)?;
        let targets =
            TaughtTargets::resolve(gateway, &config.targets, config.stack.boxes_per_layer)?;
        let sequence = generate(&targets.patterns, &config.stack)?;

        info!(
            boxes = sequence.len(),
            layers = config.stack.num_layers,
            "Job prepared"
        );
        Ok(Self {
            cell,
            targets,
            sequence,
        })
    }

    /// Execute the sequence on `gateway`.
    pub fn run<G: DeviceGateway + ?Sized>(
        &self,
        gateway: &mut G,
        config: &PalletizerConfig,
        pacing: PacingConfig,
        cancel: CancelToken,
    ) -> Result<RunReport, RunError> {
        let mut runner = Runner::new(
            gateway,
            self.cell,
            &self.targets,
            &config.targets,
            &config.motion,
            config.stack.boxes_per_layer,
            Pacer::new(pacing, cancel),
        );
        runner.run(&self.sequence)
    }
}

/// Everything wrong with a configuration and cell, gathered in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub config_errors: Vec<String>,
    pub cell_errors: Vec<String>,
    /// Boxes in the generated sequence, when generation succeeded
    pub boxes: Option<usize>,
    pub layers: usize,
}

impl ValidationReport {
    /// Check configuration and cell without issuing any motion.
    pub fn check<G: DeviceGateway + ?Sized>(gateway: &G, config: &PalletizerConfig) -> Self {
        let mut report = Self::from_config(config);
        if !report.config_errors.is_empty() {
            return report;
        }

        if let Err(e) = CellHandles::resolve(gateway, &config.cell) {
            report.cell_errors.push(e.to_string());
        }
        match TaughtTargets::resolve(gateway, &config.targets, config.stack.boxes_per_layer) {
            Ok(targets) => match generate(&targets.patterns, &config.stack) {
                Ok(sequence) => report.boxes = Some(sequence.len()),
                Err(e) => report.cell_errors.push(e.to_string()),
            },
            Err(PalletizerError::Configuration(ConfigurationError::MissingTargets(names))) => {
                report
                    .cell_errors
                    .extend(names.into_iter().map(|n| format!("Missing taught target: {}", n)));
            }
            Err(e) => report.cell_errors.push(e.to_string()),
        }
        report
    }

    /// Report for a cell that could not be reached at all.
    pub fn unreachable(config: &PalletizerConfig, reason: &PalletizerError) -> Self {
        let mut report = Self::from_config(config);
        report.cell_errors.push(reason.to_string());
        report
    }

    pub fn is_valid(&self) -> bool {
        self.config_errors.is_empty() && self.cell_errors.is_empty()
    }

    fn from_config(config: &PalletizerConfig) -> Self {
        Self {
            config_errors: config
                .validate()
                .err()
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.to_string())
                .collect(),
            cell_errors: Vec::new(),
            boxes: None,
            layers: config.stack.num_layers,
        }
    }
}
