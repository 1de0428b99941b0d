//! Error types for the palletizing sequencer.

use std::time::Duration;
use thiserror::Error;

/// Problems with taught data, cell items or stacking parameters.
///
/// Always raised before any motion command is issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Missing taught targets: {}", .0.join(", "))]
    MissingTargets(Vec<String>),

    #[error("Cell item not found: {name} ({kind})")]
    MissingItem { name: String, kind: String },

    #[error("Pattern {pattern} has {actual} approach poses, expected {expected}")]
    PatternLength {
        pattern: char,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Configuration invalid:\n{0}")]
    Invalid(String),
}

/// Errors raised by a device gateway.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device not connected")]
    NotConnected,

    #[error("Handle {0} does not belong to this cell")]
    InvalidHandle(usize),

    #[error("Item '{name}' is a {actual}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown program: {0}")]
    UnknownProgram(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Station file error: {0}")]
    Station(String),
}

/// Errors raised while the runner executes the placement sequence.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Run cancelled at box {box_number}")]
    Cancelled { box_number: usize },

    #[error("Command '{command}' took {elapsed:?}, limit is {limit:?}")]
    CommandTimeout {
        command: String,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("Gripper did not confirm {stage} for box {box_number}")]
    GripNotConfirmed { box_number: usize, stage: GripStage },
}

/// Gripper actuation stage, used when grip confirmation is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripStage {
    Attach,
    Drop,
}

impl std::fmt::Display for GripStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GripStage::Attach => write!(f, "attach"),
            GripStage::Drop => write!(f, "drop"),
        }
    }
}

/// Top-level error surfaced through the CLI.
#[derive(Debug, Error)]
pub enum PalletizerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rendered validation report; the command exits non-zero.
    #[error("{0}")]
    ValidationFailed(String),
}

impl From<config::ConfigError> for PalletizerError {
    fn from(err: config::ConfigError) -> Self {
        PalletizerError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for PalletizerError {
    fn from(err: serde_json::Error) -> Self {
        PalletizerError::Serialization(err.to_string())
    }
}
