//! Cell item and taught target resolution against the simulated station.

use super::test_utils::{immediate_config, reference_station, station_without};
use palletizer::error::{ConfigurationError, PalletizerError};
use palletizer::gateway::DeviceGateway;
use palletizer::station::SimulatedStation;
use palletizer::targets::{CellHandles, TaughtTargets};
use palletizer::Job;

#[test]
fn test_reference_cell_resolves() {
    let station = reference_station();
    let config = immediate_config();

    let cell = CellHandles::resolve(&station, &config.cell).unwrap();
    assert_ne!(cell.pick_frame, cell.place_frame);

    let targets = TaughtTargets::resolve(&station, &config.targets, 2).unwrap();
    assert_eq!(targets.patterns.a.len(), 2);
    assert_eq!(targets.patterns.b.len(), 2);
    assert_eq!(targets.pick_approach.len(), 6);
    let (_, _, z) = targets.pick_retreat.translation();
    assert_eq!(z, 450.0);
}

#[test]
fn test_missing_robot_is_reported_by_name() {
    let station = station_without("Doosan Robotics H2017");
    let config = immediate_config();

    let err = CellHandles::resolve(&station, &config.cell).unwrap_err();
    match err {
        PalletizerError::Configuration(ConfigurationError::MissingItem { name, kind }) => {
            assert_eq!(name, "Doosan Robotics H2017");
            assert_eq!(kind, "robot");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_all_missing_targets_reported_together() {
    let mut file: palletizer::station::StationFile =
        toml::from_str(super::test_utils::REFERENCE_STATION).unwrap();
    file.items
        .retain(|item| item.name != "Global_Pick" && item.name != "Global_App_P1_B_1");
    let station = SimulatedStation::new(file).unwrap();

    let err = TaughtTargets::resolve(&station, &immediate_config().targets, 2).unwrap_err();
    match err {
        PalletizerError::Configuration(ConfigurationError::MissingTargets(names)) => {
            assert_eq!(names, vec!["Global_App_P1_B_1", "Global_Pick"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_pose_target_without_pose_is_missing() {
    let raw = super::test_utils::REFERENCE_STATION.replace(
        "pose = { xyz = [0.0, 0.0, 250.0], wpr = [0.0, 0.0, 180.0] }",
        "",
    );
    let station = SimulatedStation::from_toml_str(&raw).unwrap();

    let err = TaughtTargets::resolve(&station, &immediate_config().targets, 2).unwrap_err();
    assert_eq!(err.to_string(), "Missing taught targets: Global_Pick (no pose)");
}

#[test]
fn test_more_boxes_per_layer_than_taught() {
    let station = reference_station();
    let mut config = immediate_config();
    config.stack.boxes_per_layer = 3;

    let err = Job::prepare(&station, &config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing taught targets: Global_App_P1_A_2, Global_App_P1_B_2"
    );
}

#[test]
fn test_target_looked_up_with_wrong_kind() {
    let station = reference_station();
    // A frame name used where a taught target is expected
    let mut config = immediate_config();
    config.targets.pick = "Pallet_Frame".to_string();

    let err = Job::prepare(&station, &config).unwrap_err();
    assert!(matches!(err, PalletizerError::Device(_)));
    assert!(station.trace().is_empty());
    assert_eq!(station.gripper_holding(), Some(false));
}
