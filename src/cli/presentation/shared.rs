//! Shared presentation helpers.

use crate::error::PalletizerError;
use crate::geometry::Pose;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// `x, y, z` in millimetres with one decimal.
pub fn format_xyz(pose: &Pose) -> String {
    let (x, y, z) = pose.translation();
    format!("{:.1}, {:.1}, {:.1}", x, y, z)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, PalletizerError> {
    Ok(serde_json::to_string_pretty(value)?)
}
