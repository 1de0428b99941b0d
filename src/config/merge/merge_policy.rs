//! Merge rules: reference-cell defaults, then sources in override order.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the reference cell's defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("cell.robot", "Doosan Robotics H2017")?
        .set_default("cell.tool", "OnRobot VGP20 Vacuum Gripper")?
        .set_default("cell.pick_frame", "Conveyor_Frame")?
        .set_default("cell.place_frame", "Pallet_Frame")?
        .set_default("cell.station", "config/station.toml")?
        .set_default("stack.box_height", 200.0)?
        .set_default("stack.boxes_per_layer", 2)?
        .set_default("stack.num_layers", 4)?
        .set_default("stack.approach_distance", 200.0)?
        .set_default("stack.retreat_distance", -50.0)
}
