//! Shared test utilities for integration tests
//!
//! Provides the reference station, workspace setup and a compact view of
//! device command traces.

use palletizer::gateway::JointTarget;
use palletizer::run::PacingConfig;
use palletizer::station::{DeviceCommand, SimulatedStation};
use palletizer::PalletizerConfig;
use std::path::Path;
use std::sync::Mutex;

/// Serializes tests that touch HOME, XDG_CONFIG_HOME or PALLETIZER_* variables
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Reference cell: two boxes per layer, Z-down tool, Attach/Drop programs.
pub const REFERENCE_STATION: &str = r#"
programs = ["Attach", "Drop"]

[[items]]
name = "Doosan Robotics H2017"
kind = "robot"

[[items]]
name = "OnRobot VGP20 Vacuum Gripper"
kind = "tool"

[[items]]
name = "Conveyor_Frame"
kind = "frame"

[[items]]
name = "Pallet_Frame"
kind = "frame"

[[items]]
name = "Global_up1_Pallet"
kind = "target"
joints = [-35.0, 10.0, 85.0, 0.0, 85.0, -35.0]

[[items]]
name = "Global_up2_Pallet"
kind = "target"
joints = [-55.0, 10.0, 85.0, 0.0, 85.0, -55.0]

[[items]]
name = "Global_App_P1_A_0"
kind = "target"
pose = { xyz = [200.0, 300.0, 400.0], wpr = [0.0, 0.0, 180.0] }

[[items]]
name = "Global_App_P1_A_1"
kind = "target"
pose = { xyz = [200.0, 900.0, 400.0], wpr = [0.0, 0.0, 180.0] }

[[items]]
name = "Global_App_P1_B_0"
kind = "target"
pose = { xyz = [300.0, 200.0, 400.0], wpr = [90.0, 0.0, 180.0] }

[[items]]
name = "Global_App_P1_B_1"
kind = "target"
pose = { xyz = [900.0, 200.0, 400.0], wpr = [90.0, 0.0, 180.0] }

[[items]]
name = "Global_app_Pick"
kind = "target"
joints = [40.0, 5.0, 90.0, 0.0, 85.0, 40.0]

[[items]]
name = "Global_Pick"
kind = "target"
pose = { xyz = [0.0, 0.0, 250.0], wpr = [0.0, 0.0, 180.0] }

[[items]]
name = "Global_ret_Pick"
kind = "target"
pose = { xyz = [0.0, 0.0, 450.0], wpr = [0.0, 0.0, 180.0] }
"#;

pub const UP1_JOINTS: [f64; 6] = [-35.0, 10.0, 85.0, 0.0, 85.0, -35.0];
pub const UP2_JOINTS: [f64; 6] = [-55.0, 10.0, 85.0, 0.0, 85.0, -55.0];

pub fn reference_station() -> SimulatedStation {
    SimulatedStation::from_toml_str(REFERENCE_STATION).unwrap()
}

/// Reference station with one item removed.
pub fn station_without(name: &str) -> SimulatedStation {
    let mut file: palletizer::station::StationFile = toml::from_str(REFERENCE_STATION).unwrap();
    file.items.retain(|item| item.name != name);
    SimulatedStation::new(file).unwrap()
}

/// Default configuration with every pause removed.
pub fn immediate_config() -> PalletizerConfig {
    PalletizerConfig {
        pacing: PacingConfig::immediate(),
        ..PalletizerConfig::default()
    }
}

/// Write `config/config.toml` and `config/station.toml` under `root`.
pub fn write_workspace(root: &Path, config_toml: &str) {
    let config_dir = root.join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), config_toml).unwrap();
    std::fs::write(config_dir.join("station.toml"), REFERENCE_STATION).unwrap();
}

/// One short token per command, e.g. `frame:Pallet_Frame`, `movej:up1`, `movel`.
pub fn summarize(trace: &[DeviceCommand]) -> Vec<String> {
    trace
        .iter()
        .map(|command| match command {
            DeviceCommand::SetTool { .. } => "tool".to_string(),
            DeviceCommand::SetFrame { frame } => format!("frame:{}", frame),
            DeviceCommand::SetSpeed { .. } => "speed".to_string(),
            DeviceCommand::MoveJoint {
                target: JointTarget::Joints(joints),
            } => {
                if joints.as_slice() == UP1_JOINTS {
                    "movej:up1".to_string()
                } else if joints.as_slice() == UP2_JOINTS {
                    "movej:up2".to_string()
                } else {
                    "movej:joints".to_string()
                }
            }
            DeviceCommand::MoveJoint {
                target: JointTarget::Pose(_),
            } => "movej:pose".to_string(),
            DeviceCommand::MoveLinear { .. } => "movel".to_string(),
            DeviceCommand::RunProgram { name } => format!("program:{}", name),
            DeviceCommand::ShowMessage { .. } => "message".to_string(),
        })
        .collect()
}
