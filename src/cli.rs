//! CLI domain: parse, route, help, output, and presentation only.
//! Orchestration lives in [`crate::job`]; the route table only dispatches.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_plan_json, format_plan_text, format_run_report_json, format_run_report_text,
    format_validation_json, format_validation_text,
};
pub use route::RunContext;
