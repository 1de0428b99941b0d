//! Validation report formatters.

use super::shared::to_json;
use crate::error::PalletizerError;
use crate::job::ValidationReport;

pub fn format_validation_text(report: &ValidationReport) -> String {
    if report.is_valid() {
        return format!(
            "Validation passed:\n  Boxes: {}\n  Layers: {}\n  All checks passed",
            report.boxes.unwrap_or_default(),
            report.layers
        );
    }

    let mut s = String::from("Validation failed:");
    if !report.config_errors.is_empty() {
        s.push_str(&format!(
            "\n\nConfiguration errors ({}):",
            report.config_errors.len()
        ));
        for e in &report.config_errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    if !report.cell_errors.is_empty() {
        s.push_str(&format!("\n\nCell errors ({}):", report.cell_errors.len()));
        for e in &report.cell_errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    s
}

pub fn format_validation_json(report: &ValidationReport) -> Result<String, PalletizerError> {
    let mut value = serde_json::to_value(report)?;
    value["valid"] = serde_json::Value::Bool(report.is_valid());
    to_json(&value)
}
