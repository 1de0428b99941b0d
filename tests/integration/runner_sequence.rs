//! End-to-end runs against the simulated station: command order, lift-clear
//! alternation, timeouts, cancellation and grip confirmation.

use super::test_utils::{immediate_config, reference_station, station_without, summarize};
use palletizer::error::{
    ConfigurationError, DeviceError, GripStage, PalletizerError, RunError,
};
use palletizer::gateway::{
    DeviceGateway, FrameHandle, ItemHandle, ItemKind, JointTarget, RobotHandle, SpeedLimits,
    ToolHandle,
};
use palletizer::geometry::{JointConfiguration, Pose};
use palletizer::run::{CancelToken, PacingConfig};
use palletizer::station::{DeviceCommand, SimulatedStation};
use palletizer::Job;
use std::time::Duration;

const PICK_SIGNATURE: [&str; 7] = [
    "frame:Conveyor_Frame",
    "tool",
    "speed",
    "movej:joints",
    "movel",
    "program:Attach",
    "movel",
];

fn place_signature(up: &'static str) -> [&'static str; 9] {
    [
        "frame:Pallet_Frame",
        "tool",
        "speed",
        up,
        "movej:pose",
        "movel",
        "program:Drop",
        "movel",
        up,
    ]
}

#[test]
fn test_full_run_issues_commands_in_order() {
    let mut station = reference_station();
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();

    let report = job
        .run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap();
    assert_eq!(report.boxes_placed, 8);
    assert_eq!(report.layers, 4);

    let summary = summarize(station.trace());
    assert_eq!(summary.len(), 8 * 16 + 1);

    let first_box: Vec<&str> = summary[..16].iter().map(String::as_str).collect();
    let mut expected: Vec<&str> = PICK_SIGNATURE.to_vec();
    expected.extend(place_signature("movej:up1"));
    assert_eq!(first_box, expected);

    match station.trace().last() {
        Some(DeviceCommand::ShowMessage { message }) => {
            assert!(message.starts_with("Total time: "));
            assert!(message.ends_with(" s"));
        }
        other => panic!("expected final message, got {other:?}"),
    }
}

#[test]
fn test_lift_clear_alternates_every_layer() {
    let mut station = reference_station();
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();
    job.run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap();

    // Each box passes its lift-clear waypoint twice: before and after placing
    let ups: Vec<String> = summarize(station.trace())
        .into_iter()
        .filter(|s| s.starts_with("movej:up"))
        .collect();
    let per_box: Vec<&str> = ups.chunks(2).map(|pair| pair[0].as_str()).collect();
    assert!(ups.chunks(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(
        per_box,
        vec![
            "movej:up1", "movej:up1", "movej:up2", "movej:up2", "movej:up1", "movej:up1",
            "movej:up2", "movej:up2"
        ]
    );
}

#[test]
fn test_place_moves_follow_generated_sequence() {
    let mut station = reference_station();
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();
    job.run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap();

    let approaches: Vec<Pose> = station
        .trace()
        .iter()
        .filter_map(|command| match command {
            DeviceCommand::MoveJoint {
                target: JointTarget::Pose(pose),
            } => Some(*pose),
            _ => None,
        })
        .collect();
    let expected: Vec<Pose> = job.sequence.iter().map(|p| p.poses.approach).collect();
    assert_eq!(approaches, expected);

    // Third layer (pattern A again) is 400mm above the first in the pallet frame
    let (_, _, z0) = approaches[0].translation();
    let (_, _, z4) = approaches[4].translation();
    assert!((z4 - z0 - 400.0).abs() < 1e-6);
}

#[test]
fn test_speed_limits_applied_before_each_block() {
    let mut station = reference_station();
    let mut config = immediate_config();
    config.motion = SpeedLimits {
        linear_speed: 120.0,
        ..SpeedLimits::default()
    };
    config.stack.num_layers = 1;
    let job = Job::prepare(&station, &config).unwrap();
    job.run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap();

    let speeds: Vec<&SpeedLimits> = station
        .trace()
        .iter()
        .filter_map(|command| match command {
            DeviceCommand::SetSpeed { limits } => Some(limits),
            _ => None,
        })
        .collect();
    // One pick block and one place block per box
    assert_eq!(speeds.len(), 4);
    assert!(speeds.iter().all(|limits| limits.linear_speed == 120.0));
    assert!(speeds.iter().all(|limits| limits.joint_speed == 50.0));
}

#[test]
fn test_short_pattern_fails_before_any_motion() {
    let station = station_without("Global_App_P1_B_1");
    let config = immediate_config();

    let err = Job::prepare(&station, &config).unwrap_err();
    assert!(matches!(
        err,
        PalletizerError::Configuration(ConfigurationError::MissingTargets(_))
    ));
    assert!(station.trace().is_empty());
}

#[test]
fn test_slow_command_halts_run() {
    let mut station = reference_station().with_latency(Duration::from_millis(30));
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();
    let pacing = PacingConfig {
        command_timeout_ms: 5,
        ..PacingConfig::immediate()
    };

    let err = job
        .run(&mut station, &config, pacing, CancelToken::new())
        .unwrap_err();
    match err {
        RunError::CommandTimeout { command, limit, .. } => {
            assert_eq!(command, "MoveJ");
            assert_eq!(limit, Duration::from_millis(5));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing after the stalled approach move was issued
    assert_eq!(summarize(station.trace()).last().unwrap(), "movej:joints");
}

#[test]
fn test_cancelled_before_start_issues_nothing() {
    let mut station = reference_station();
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = job
        .run(&mut station, &config, config.pacing.clone(), cancel)
        .unwrap_err();
    assert!(matches!(err, RunError::Cancelled { box_number: 1 }));
    assert!(station.trace().is_empty());
}

/// Trips the cancel token once the n-th drop has been issued.
struct CancelAfterDrops {
    inner: SimulatedStation,
    cancel: CancelToken,
    drops_left: usize,
}

impl DeviceGateway for CancelAfterDrops {
    fn find_item(&self, name: &str, kind: ItemKind) -> Result<Option<ItemHandle>, DeviceError> {
        self.inner.find_item(name, kind)
    }

    fn target_pose(&self, target: ItemHandle) -> Result<Option<Pose>, DeviceError> {
        self.inner.target_pose(target)
    }

    fn target_joints(&self, target: ItemHandle) -> Result<Option<JointConfiguration>, DeviceError> {
        self.inner.target_joints(target)
    }

    fn set_tool(&mut self, robot: RobotHandle, tool: ToolHandle) -> Result<(), DeviceError> {
        self.inner.set_tool(robot, tool)
    }

    fn set_frame(&mut self, robot: RobotHandle, frame: FrameHandle) -> Result<(), DeviceError> {
        self.inner.set_frame(robot, frame)
    }

    fn set_speed(&mut self, robot: RobotHandle, limits: &SpeedLimits) -> Result<(), DeviceError> {
        self.inner.set_speed(robot, limits)
    }

    fn move_joint(&mut self, robot: RobotHandle, target: &JointTarget) -> Result<(), DeviceError> {
        self.inner.move_joint(robot, target)
    }

    fn move_linear(&mut self, robot: RobotHandle, target: &Pose) -> Result<(), DeviceError> {
        self.inner.move_linear(robot, target)
    }

    fn run_program(&mut self, name: &str) -> Result<(), DeviceError> {
        self.inner.run_program(name)?;
        if name == "Drop" {
            self.drops_left -= 1;
            if self.drops_left == 0 {
                self.cancel.cancel();
            }
        }
        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<(), DeviceError> {
        self.inner.show_message(message)
    }
}

#[test]
fn test_cancel_mid_run_stops_at_next_command() {
    let config = immediate_config();
    let cancel = CancelToken::new();
    let mut gateway = CancelAfterDrops {
        inner: reference_station(),
        cancel: cancel.clone(),
        drops_left: 3,
    };
    let job = Job::prepare(&gateway, &config).unwrap();

    let err = job
        .run(&mut gateway, &config, config.pacing.clone(), cancel)
        .unwrap_err();
    assert!(matches!(err, RunError::Cancelled { box_number: 3 }));

    // Two full boxes, then box 3 up to and including its drop
    let summary = summarize(gateway.inner.trace());
    assert_eq!(summary.len(), 2 * 16 + 7 + 7);
    assert_eq!(summary.last().unwrap(), "program:Drop");
}

#[test]
fn test_grip_confirmation_catches_lost_vacuum() {
    let mut station = reference_station().with_vacuum_fault(2);
    let mut config = immediate_config();
    config.pacing.confirm_grip = true;
    let job = Job::prepare(&station, &config).unwrap();

    let err = job
        .run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::GripNotConfirmed {
            box_number: 2,
            stage: GripStage::Attach
        }
    ));
    // Box 2 never left the conveyor
    assert_eq!(summarize(station.trace()).last().unwrap(), "program:Attach");
}

#[test]
fn test_fire_and_forget_ignores_lost_vacuum() {
    let mut station = reference_station().with_vacuum_fault(2);
    let config = immediate_config();
    let job = Job::prepare(&station, &config).unwrap();

    let report = job
        .run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap();
    assert_eq!(report.boxes_placed, 8);
}

#[test]
fn test_device_failure_surfaces_as_run_error() {
    let station = reference_station();
    let mut config = immediate_config();
    config.targets.attach_program = "Vacuum_On".to_string();
    let job = Job::prepare(&station, &config).unwrap();
    let mut station = station;

    let err = job
        .run(&mut station, &config, config.pacing.clone(), CancelToken::new())
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Device(DeviceError::UnknownProgram(ref name)) if name == "Vacuum_On"
    ));
}
