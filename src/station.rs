//! Simulated robot cell.
//!
//! Loads a station definition (robots, tools, frames and taught targets)
//! from TOML and implements [`DeviceGateway`] against it. Every accepted
//! command is appended to a trace so a run can be inspected afterwards.

use crate::error::DeviceError;
use crate::gateway::{
    DeviceGateway, FrameHandle, ItemHandle, ItemKind, JointTarget, RobotHandle, SpeedLimits,
    ToolHandle,
};
use crate::geometry::{JointConfiguration, Pose};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

/// On-disk station definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationFile {
    /// Subroutines the cell can run (gripper actuation)
    #[serde(default)]
    pub programs: Vec<String>,

    #[serde(default)]
    pub items: Vec<StationItem>,
}

/// One named item in the station tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationItem {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<Pose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joints: Option<JointConfiguration>,
}

/// A command accepted by the simulated cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DeviceCommand {
    SetTool { tool: String },
    SetFrame { frame: String },
    SetSpeed { limits: SpeedLimits },
    MoveJoint { target: JointTarget },
    MoveLinear { target: Pose },
    RunProgram { name: String },
    ShowMessage { message: String },
}

/// In-memory cell implementing the device gateway.
#[derive(Debug)]
pub struct SimulatedStation {
    items: Vec<StationItem>,
    by_name: HashMap<String, usize>,
    programs: HashSet<String>,
    attach_program: String,
    drop_program: String,
    connected: bool,
    latency: Duration,
    vacuum_fault_on_attach: Option<usize>,
    attach_count: usize,
    active_tool: Option<usize>,
    active_frame: Option<usize>,
    holding: bool,
    trace: Vec<DeviceCommand>,
}

impl SimulatedStation {
    /// Build a station from a parsed definition.
    pub fn new(file: StationFile) -> Result<Self, DeviceError> {
        let mut by_name = HashMap::with_capacity(file.items.len());
        for (id, item) in file.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(DeviceError::Station(format!("item {} has an empty name", id)));
            }
            if by_name.insert(item.name.clone(), id).is_some() {
                return Err(DeviceError::Station(format!(
                    "duplicate item name '{}'",
                    item.name
                )));
            }
        }

        Ok(Self {
            items: file.items,
            by_name,
            programs: file.programs.into_iter().collect(),
            attach_program: "Attach".to_string(),
            drop_program: "Drop".to_string(),
            connected: true,
            latency: Duration::ZERO,
            vacuum_fault_on_attach: None,
            attach_count: 0,
            active_tool: None,
            active_frame: None,
            holding: false,
            trace: Vec::new(),
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DeviceError> {
        let file: StationFile =
            toml::from_str(raw).map_err(|e| DeviceError::Station(e.to_string()))?;
        Self::new(file)
    }

    pub fn load(path: &Path) -> Result<Self, DeviceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DeviceError::Station(format!("failed to read {}: {}", path.display(), e))
        })?;
        debug!(station = %path.display(), "Loading station definition");
        Self::from_toml_str(&raw)
    }

    /// Names of the programs that toggle the simulated vacuum.
    pub fn with_gripper_programs(mut self, attach: &str, drop: &str) -> Self {
        self.attach_program = attach.to_string();
        self.drop_program = drop.to_string();
        self
    }

    /// Delay every motion command by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the n-th attach (1-based) leave the vacuum off.
    pub fn with_vacuum_fault(mut self, attach_number: usize) -> Self {
        self.vacuum_fault_on_attach = Some(attach_number);
        self
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Commands accepted so far, in issue order.
    pub fn trace(&self) -> &[DeviceCommand] {
        &self.trace
    }

    fn ensure_connected(&self) -> Result<(), DeviceError> {
        if self.connected {
            Ok(())
        } else {
            Err(DeviceError::NotConnected)
        }
    }

    fn item(&self, handle: ItemHandle, kind: ItemKind) -> Result<&StationItem, DeviceError> {
        let item = self
            .items
            .get(handle.id)
            .ok_or(DeviceError::InvalidHandle(handle.id))?;
        if item.kind != kind || handle.kind != kind {
            return Err(DeviceError::WrongKind {
                name: item.name.clone(),
                expected: kind.to_string(),
                actual: item.kind.to_string(),
            });
        }
        Ok(item)
    }

    fn motion_ready(&self, robot: RobotHandle) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        let robot_item = self.item(robot.0, ItemKind::Robot)?;
        if self.active_tool.is_none() || self.active_frame.is_none() {
            return Err(DeviceError::Communication(format!(
                "{} has no active tool and reference frame",
                robot_item.name
            )));
        }
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        Ok(())
    }

    fn record(&mut self, command: DeviceCommand) {
        trace!(?command, "Station command");
        self.trace.push(command);
    }
}

impl DeviceGateway for SimulatedStation {
    fn find_item(&self, name: &str, kind: ItemKind) -> Result<Option<ItemHandle>, DeviceError> {
        self.ensure_connected()?;
        let Some(&id) = self.by_name.get(name) else {
            return Ok(None);
        };
        let item = &self.items[id];
        if item.kind != kind {
            return Err(DeviceError::WrongKind {
                name: name.to_string(),
                expected: kind.to_string(),
                actual: item.kind.to_string(),
            });
        }
        Ok(Some(ItemHandle { id, kind }))
    }

    fn target_pose(&self, target: ItemHandle) -> Result<Option<Pose>, DeviceError> {
        self.ensure_connected()?;
        Ok(self.item(target, ItemKind::Target)?.pose)
    }

    fn target_joints(&self, target: ItemHandle) -> Result<Option<JointConfiguration>, DeviceError> {
        self.ensure_connected()?;
        Ok(self.item(target, ItemKind::Target)?.joints.clone())
    }

    fn set_tool(&mut self, robot: RobotHandle, tool: ToolHandle) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.item(robot.0, ItemKind::Robot)?;
        let name = self.item(tool.0, ItemKind::Tool)?.name.clone();
        self.active_tool = Some(tool.0.id);
        self.record(DeviceCommand::SetTool { tool: name });
        Ok(())
    }

    fn set_frame(&mut self, robot: RobotHandle, frame: FrameHandle) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.item(robot.0, ItemKind::Robot)?;
        let name = self.item(frame.0, ItemKind::Frame)?.name.clone();
        self.active_frame = Some(frame.0.id);
        self.record(DeviceCommand::SetFrame { frame: name });
        Ok(())
    }

    fn set_speed(&mut self, robot: RobotHandle, limits: &SpeedLimits) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.item(robot.0, ItemKind::Robot)?;
        self.record(DeviceCommand::SetSpeed {
            limits: limits.clone(),
        });
        Ok(())
    }

    fn move_joint(&mut self, robot: RobotHandle, target: &JointTarget) -> Result<(), DeviceError> {
        self.motion_ready(robot)?;
        self.record(DeviceCommand::MoveJoint {
            target: target.clone(),
        });
        Ok(())
    }

    fn move_linear(&mut self, robot: RobotHandle, target: &Pose) -> Result<(), DeviceError> {
        self.motion_ready(robot)?;
        self.record(DeviceCommand::MoveLinear { target: *target });
        Ok(())
    }

    fn run_program(&mut self, name: &str) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        if !self.programs.contains(name) {
            return Err(DeviceError::UnknownProgram(name.to_string()));
        }
        if name == self.attach_program {
            self.attach_count += 1;
            self.holding = self.vacuum_fault_on_attach != Some(self.attach_count);
        } else if name == self.drop_program {
            self.holding = false;
        }
        self.record(DeviceCommand::RunProgram {
            name: name.to_string(),
        });
        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.record(DeviceCommand::ShowMessage {
            message: message.to_string(),
        });
        Ok(())
    }

    fn gripper_holding(&self) -> Option<bool> {
        Some(self.holding)
    }
}
