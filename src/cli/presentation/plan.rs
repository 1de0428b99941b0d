//! Placement sequence formatters.

use super::shared::{format_section_heading, format_xyz, to_json};
use crate::error::PalletizerError;
use crate::job::Job;
use crate::plan::{LiftClear, StackConfig};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::json;

pub fn format_plan_text(job: &Job, stack: &StackConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Placement Sequence")));
    out.push_str(&format!(
        "  Boxes: {} ({} layers x {} per layer)\n",
        job.sequence.len(),
        stack.num_layers,
        stack.boxes_per_layer
    ));
    out.push_str(&format!(
        "  Box height: {:.1} mm, approach: {:.1} mm, retreat: {:.1} mm\n\n",
        stack.box_height, stack.approach_distance, stack.retreat_distance
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Box",
        "Layer",
        "Slot",
        "Pattern",
        "Lift",
        "Approach (x, y, z)",
        "Place (x, y, z)",
        "Retreat (x, y, z)",
    ]);
    for placement in &job.sequence {
        let lift = LiftClear::for_box(placement.index, stack.boxes_per_layer);
        table.add_row(vec![
            (placement.index + 1).to_string(),
            placement.layer.to_string(),
            placement.slot.to_string(),
            placement.pattern.as_char().to_string(),
            lift.number().to_string(),
            format_xyz(&placement.poses.approach),
            format_xyz(&placement.poses.place),
            format_xyz(&placement.poses.retreat),
        ]);
    }
    out.push_str(&format!("{}", table));
    out
}

pub fn format_plan_json(job: &Job, stack: &StackConfig) -> Result<String, PalletizerError> {
    let placements: Vec<serde_json::Value> = job
        .sequence
        .iter()
        .map(|p| {
            json!({
                "box": p.index + 1,
                "layer": p.layer,
                "slot": p.slot,
                "pattern": p.pattern,
                "lift_clear": LiftClear::for_box(p.index, stack.boxes_per_layer).number(),
                "extra_height": p.extra_height,
                "approach": p.poses.approach,
                "place": p.poses.place,
                "retreat": p.poses.retreat,
            })
        })
        .collect();
    to_json(&json!({
        "stack": stack,
        "total": placements.len(),
        "placements": placements,
    }))
}
