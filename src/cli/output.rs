//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{PalletizerError, RunError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &PalletizerError) -> String {
    match e {
        PalletizerError::Run(RunError::Cancelled { box_number }) => format!(
            "Run cancelled at box {}; earlier boxes were placed",
            box_number
        ),
        PalletizerError::Run(err) => format!("Run halted: {}", err),
        PalletizerError::ValidationFailed(report) => report.clone(),
        other => other.to_string(),
    }
}
