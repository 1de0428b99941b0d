//! Device gateway: the narrow motion-command surface the runner drives.
//!
//! A gateway resolves named cell items into handles and executes motion
//! primitives. Whether the cell is simulated or real hardware is invisible
//! to the sequencer. The only shipped implementation is
//! [`crate::station::SimulatedStation`].

use crate::error::DeviceError;
use crate::geometry::{JointConfiguration, Pose};
use serde::{Deserialize, Serialize};

/// Kind of a named cell item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Robot,
    Tool,
    Frame,
    Target,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Robot => "robot",
            ItemKind::Tool => "tool",
            ItemKind::Frame => "frame",
            ItemKind::Target => "target",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to an item resolved by a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemHandle {
    pub id: usize,
    pub kind: ItemKind,
}

/// Typed wrapper so robot/tool/frame handles cannot be mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotHandle(pub ItemHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolHandle(pub ItemHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub ItemHandle);

/// Target of a joint-interpolated move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointTarget {
    Joints(JointConfiguration),
    Pose(Pose),
}

/// Speed and acceleration limits applied before each pick/place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimits {
    /// Linear speed (mm/s)
    #[serde(default = "default_linear")]
    pub linear_speed: f64,
    /// Linear acceleration (mm/s²)
    #[serde(default = "default_linear")]
    pub linear_accel: f64,
    /// Joint speed (deg/s)
    #[serde(default = "default_joint")]
    pub joint_speed: f64,
    /// Joint acceleration (deg/s²)
    #[serde(default = "default_joint")]
    pub joint_accel: f64,
}

fn default_linear() -> f64 {
    300.0
}

fn default_joint() -> f64 {
    50.0
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            linear_speed: default_linear(),
            linear_accel: default_linear(),
            joint_speed: default_joint(),
            joint_accel: default_joint(),
        }
    }
}

impl SpeedLimits {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("linear_speed", self.linear_speed),
            ("linear_accel", self.linear_accel),
            ("joint_speed", self.joint_speed),
            ("joint_accel", self.joint_accel),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// Motion-command interface to a robot cell.
pub trait DeviceGateway {
    /// Resolve a named item of the given kind. `Ok(None)` when the name is
    /// unknown; an error only for communication failures or kind mismatches.
    fn find_item(&self, name: &str, kind: ItemKind) -> Result<Option<ItemHandle>, DeviceError>;

    /// Cartesian pose stored on a target, if it has one.
    fn target_pose(&self, target: ItemHandle) -> Result<Option<Pose>, DeviceError>;

    /// Joint configuration stored on a target, if it has one.
    fn target_joints(&self, target: ItemHandle) -> Result<Option<JointConfiguration>, DeviceError>;

    fn set_tool(&mut self, robot: RobotHandle, tool: ToolHandle) -> Result<(), DeviceError>;

    fn set_frame(&mut self, robot: RobotHandle, frame: FrameHandle) -> Result<(), DeviceError>;

    fn set_speed(&mut self, robot: RobotHandle, limits: &SpeedLimits) -> Result<(), DeviceError>;

    fn move_joint(&mut self, robot: RobotHandle, target: &JointTarget) -> Result<(), DeviceError>;

    fn move_linear(&mut self, robot: RobotHandle, target: &Pose) -> Result<(), DeviceError>;

    /// Run a named subroutine and wait for it to finish.
    fn run_program(&mut self, name: &str) -> Result<(), DeviceError>;

    fn show_message(&mut self, message: &str) -> Result<(), DeviceError>;

    /// Whether the gripper currently holds a part. `None` when the cell has
    /// no way to observe it.
    fn gripper_holding(&self) -> Option<bool> {
        None
    }
}
