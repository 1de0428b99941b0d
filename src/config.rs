//! Configuration System
//!
//! Layered configuration for the palletizing cell: built-in defaults, the
//! user-level global file, workspace files and `PALLETIZER__*` environment
//! overrides, merged with the `config` crate and validated as a whole.

use crate::gateway::SpeedLimits;
use crate::logging::{validate_logging_config, LoggingConfig};
use crate::plan::StackConfig;
use crate::run::PacingConfig;
use crate::targets::{CellConfig, TargetNames};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PalletizerConfig {
    /// Robot, tool, frames and station file
    #[serde(default)]
    pub cell: CellConfig,

    /// Taught target and gripper program names
    #[serde(default)]
    pub targets: TargetNames,

    /// Speed and acceleration limits applied before every motion block
    #[serde(default)]
    pub motion: SpeedLimits,

    /// Stack geometry
    #[serde(default)]
    pub stack: StackConfig,

    /// Pauses, timeouts and grip confirmation
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Cell(String),
    Targets(String),
    Motion(String),
    Stack(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Cell(msg) => write!(f, "cell: {}", msg),
            ValidationError::Targets(msg) => write!(f, "targets: {}", msg),
            ValidationError::Motion(msg) => write!(f, "motion: {}", msg),
            ValidationError::Stack(msg) => write!(f, "stack: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PalletizerConfig {
    /// Validate every section, collecting all problems.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let cell_names = [
            ("robot", &self.cell.robot),
            ("tool", &self.cell.tool),
            ("pick_frame", &self.cell.pick_frame),
            ("place_frame", &self.cell.place_frame),
        ];
        for (field, value) in cell_names {
            if value.trim().is_empty() {
                errors.push(ValidationError::Cell(format!("{} cannot be empty", field)));
            }
        }
        if self.cell.pick_frame == self.cell.place_frame {
            errors.push(ValidationError::Cell(
                "pick_frame and place_frame must differ".to_string(),
            ));
        }

        if let Err(e) = self.targets.validate() {
            errors.push(ValidationError::Targets(e));
        }
        if let Err(e) = self.motion.validate() {
            errors.push(ValidationError::Motion(e));
        }
        if let Err(e) = self.stack.validate() {
            errors.push(ValidationError::Stack(e.to_string()));
        }
        if let Err(e) = validate_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
