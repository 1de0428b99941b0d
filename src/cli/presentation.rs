//! CLI presentation: text and json formatters per command.

mod plan;
mod run;
mod shared;
mod validate;

pub use plan::{format_plan_json, format_plan_text};
pub use run::{format_run_report_json, format_run_report_text};
pub use validate::{format_validation_json, format_validation_text};
