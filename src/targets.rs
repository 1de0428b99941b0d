//! Typed handle table for the cell items and taught targets.
//!
//! Every name the run needs is resolved once, up front. Missing items fail
//! the whole resolution before any motion command is sent; all missing
//! taught targets are reported together.

use crate::error::{ConfigurationError, PalletizerError};
use crate::gateway::{DeviceGateway, FrameHandle, ItemKind, RobotHandle, ToolHandle};
use crate::geometry::{JointConfiguration, Pose};
use crate::plan::{LayerPatterns, LiftClear};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Names of the robot, tool and reference frames in the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    #[serde(default = "default_robot")]
    pub robot: String,

    #[serde(default = "default_tool")]
    pub tool: String,

    /// Reference frame of the conveyor (pick side)
    #[serde(default = "default_pick_frame")]
    pub pick_frame: String,

    /// Reference frame of the pallet (place side)
    #[serde(default = "default_place_frame")]
    pub place_frame: String,

    /// Station definition file for the simulated cell, relative to the workspace
    #[serde(default = "default_station")]
    pub station: PathBuf,
}

fn default_robot() -> String {
    "Doosan Robotics H2017".to_string()
}

fn default_tool() -> String {
    "OnRobot VGP20 Vacuum Gripper".to_string()
}

fn default_pick_frame() -> String {
    "Conveyor_Frame".to_string()
}

fn default_place_frame() -> String {
    "Pallet_Frame".to_string()
}

fn default_station() -> PathBuf {
    PathBuf::from("config/station.toml")
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            robot: default_robot(),
            tool: default_tool(),
            pick_frame: default_pick_frame(),
            place_frame: default_place_frame(),
            station: default_station(),
        }
    }
}

/// Names of the taught targets and gripper programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetNames {
    #[serde(default = "default_lift_clear_1")]
    pub lift_clear_1: String,

    #[serde(default = "default_lift_clear_2")]
    pub lift_clear_2: String,

    /// Pattern A approach poses are `<prefix><slot>`
    #[serde(default = "default_pattern_a_prefix")]
    pub pattern_a_prefix: String,

    #[serde(default = "default_pattern_b_prefix")]
    pub pattern_b_prefix: String,

    #[serde(default = "default_pick_approach")]
    pub pick_approach: String,

    #[serde(default = "default_pick")]
    pub pick: String,

    #[serde(default = "default_pick_retreat")]
    pub pick_retreat: String,

    #[serde(default = "default_attach_program")]
    pub attach_program: String,

    #[serde(default = "default_drop_program")]
    pub drop_program: String,
}

fn default_lift_clear_1() -> String {
    "Global_up1_Pallet".to_string()
}

fn default_lift_clear_2() -> String {
    "Global_up2_Pallet".to_string()
}

fn default_pattern_a_prefix() -> String {
    "Global_App_P1_A_".to_string()
}

fn default_pattern_b_prefix() -> String {
    "Global_App_P1_B_".to_string()
}

fn default_pick_approach() -> String {
    "Global_app_Pick".to_string()
}

fn default_pick() -> String {
    "Global_Pick".to_string()
}

fn default_pick_retreat() -> String {
    "Global_ret_Pick".to_string()
}

fn default_attach_program() -> String {
    "Attach".to_string()
}

fn default_drop_program() -> String {
    "Drop".to_string()
}

impl Default for TargetNames {
    fn default() -> Self {
        Self {
            lift_clear_1: default_lift_clear_1(),
            lift_clear_2: default_lift_clear_2(),
            pattern_a_prefix: default_pattern_a_prefix(),
            pattern_b_prefix: default_pattern_b_prefix(),
            pick_approach: default_pick_approach(),
            pick: default_pick(),
            pick_retreat: default_pick_retreat(),
            attach_program: default_attach_program(),
            drop_program: default_drop_program(),
        }
    }
}

impl TargetNames {
    pub fn pattern_a(&self, slot: usize) -> String {
        format!("{}{}", self.pattern_a_prefix, slot)
    }

    pub fn pattern_b(&self, slot: usize) -> String {
        format!("{}{}", self.pattern_b_prefix, slot)
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("lift_clear_1", &self.lift_clear_1),
            ("lift_clear_2", &self.lift_clear_2),
            ("pattern_a_prefix", &self.pattern_a_prefix),
            ("pattern_b_prefix", &self.pattern_b_prefix),
            ("pick_approach", &self.pick_approach),
            ("pick", &self.pick),
            ("pick_retreat", &self.pick_retreat),
            ("attach_program", &self.attach_program),
            ("drop_program", &self.drop_program),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }
        if self.pattern_a_prefix == self.pattern_b_prefix {
            return Err("pattern_a_prefix and pattern_b_prefix must differ".to_string());
        }
        Ok(())
    }
}

/// Resolved robot, tool and frame handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHandles {
    pub robot: RobotHandle,
    pub tool: ToolHandle,
    pub pick_frame: FrameHandle,
    pub place_frame: FrameHandle,
}

impl CellHandles {
    pub fn resolve<G: DeviceGateway + ?Sized>(
        gateway: &G,
        cell: &CellConfig,
    ) -> Result<Self, PalletizerError> {
        let lookup = |name: &str, kind: ItemKind| -> Result<_, PalletizerError> {
            gateway.find_item(name, kind)?.ok_or_else(|| {
                ConfigurationError::MissingItem {
                    name: name.to_string(),
                    kind: kind.to_string(),
                }
                .into()
            })
        };

        let handles = Self {
            robot: RobotHandle(lookup(&cell.robot, ItemKind::Robot)?),
            tool: ToolHandle(lookup(&cell.tool, ItemKind::Tool)?),
            pick_frame: FrameHandle(lookup(&cell.pick_frame, ItemKind::Frame)?),
            place_frame: FrameHandle(lookup(&cell.place_frame, ItemKind::Frame)?),
        };
        debug!(robot = %cell.robot, tool = %cell.tool, "Cell items resolved");
        Ok(handles)
    }
}

/// Every taught reference target the run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TaughtTargets {
    pub lift_clear: [JointConfiguration; 2],
    pub patterns: LayerPatterns,
    pub pick_approach: JointConfiguration,
    pub pick: Pose,
    pub pick_retreat: Pose,
}

impl TaughtTargets {
    /// Resolve all taught targets, collecting every missing name.
    pub fn resolve<G: DeviceGateway + ?Sized>(
        gateway: &G,
        names: &TargetNames,
        boxes_per_layer: usize,
    ) -> Result<Self, PalletizerError> {
        let mut resolver = Resolver {
            gateway,
            missing: Vec::new(),
        };

        let lift_clear_1 = resolver.joints(&names.lift_clear_1)?;
        let lift_clear_2 = resolver.joints(&names.lift_clear_2)?;

        let mut pattern_a = Vec::with_capacity(boxes_per_layer);
        let mut pattern_b = Vec::with_capacity(boxes_per_layer);
        for slot in 0..boxes_per_layer {
            if let Some(pose) = resolver.pose(&names.pattern_a(slot))? {
                pattern_a.push(pose);
            }
            if let Some(pose) = resolver.pose(&names.pattern_b(slot))? {
                pattern_b.push(pose);
            }
        }

        let pick_approach = resolver.joints(&names.pick_approach)?;
        let pick = resolver.pose(&names.pick)?;
        let pick_retreat = resolver.pose(&names.pick_retreat)?;

        match (lift_clear_1, lift_clear_2, pick_approach, pick, pick_retreat) {
            (Some(up1), Some(up2), Some(pick_approach), Some(pick), Some(pick_retreat))
                if resolver.missing.is_empty() =>
            {
                info!(boxes_per_layer, "Taught targets resolved");
                Ok(Self {
                    lift_clear: [up1, up2],
                    patterns: LayerPatterns::new(pattern_a, pattern_b),
                    pick_approach,
                    pick,
                    pick_retreat,
                })
            }
            _ => Err(ConfigurationError::MissingTargets(resolver.missing).into()),
        }
    }

    pub fn lift_clear(&self, which: LiftClear) -> &JointConfiguration {
        match which {
            LiftClear::First => &self.lift_clear[0],
            LiftClear::Second => &self.lift_clear[1],
        }
    }
}

struct Resolver<'a, G: DeviceGateway + ?Sized> {
    gateway: &'a G,
    missing: Vec<String>,
}

impl<'a, G: DeviceGateway + ?Sized> Resolver<'a, G> {
    fn pose(&mut self, name: &str) -> Result<Option<Pose>, PalletizerError> {
        let Some(handle) = self.gateway.find_item(name, ItemKind::Target)? else {
            self.missing.push(name.to_string());
            return Ok(None);
        };
        let pose = self.gateway.target_pose(handle)?;
        if pose.is_none() {
            self.missing.push(format!("{} (no pose)", name));
        }
        Ok(pose)
    }

    fn joints(&mut self, name: &str) -> Result<Option<JointConfiguration>, PalletizerError> {
        let Some(handle) = self.gateway.find_item(name, ItemKind::Target)? else {
            self.missing.push(name.to_string());
            return Ok(None);
        };
        match self.gateway.target_joints(handle)? {
            Some(joints) if !joints.is_empty() => Ok(Some(joints)),
            _ => {
                self.missing.push(format!("{} (no joints)", name));
                Ok(None)
            }
        }
    }
}
