//! Run report formatters.

use super::shared::{format_section_heading, to_json};
use crate::error::PalletizerError;
use crate::run::RunReport;

pub fn format_run_report_text(report: &RunReport) -> String {
    format!(
        "{}\n\n  Started: {}\n  Boxes placed: {}\n  Layers: {}\n  Total time: {:.2} s",
        format_section_heading("Run Complete"),
        report.started_at,
        report.boxes_placed,
        report.layers,
        report.elapsed_secs
    )
}

pub fn format_run_report_json(report: &RunReport) -> Result<String, PalletizerError> {
    to_json(report)
}
