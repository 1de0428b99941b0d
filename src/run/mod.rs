//! Pick-and-place runner.
//!
//! Consumes a [`PlacementSequence`] strictly in order: one pick from the
//! conveyor, then one place through the alternating lift-clear waypoint,
//! per box. No retries and no skipping; the first error stops the run.

pub mod pacing;

pub use pacing::{CancelToken, Pacer, PacingConfig};

use crate::error::{GripStage, RunError};
use crate::gateway::{DeviceGateway, FrameHandle, JointTarget, SpeedLimits};
use crate::plan::{LiftClear, Placement, PlacementSequence};
use crate::targets::{CellHandles, TargetNames, TaughtTargets};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 start timestamp
    pub started_at: String,
    pub boxes_placed: usize,
    pub layers: usize,
    pub elapsed_secs: f64,
}

/// Drives a device gateway through the placement sequence.
pub struct Runner<'a, G: DeviceGateway + ?Sized> {
    gateway: &'a mut G,
    cell: CellHandles,
    targets: &'a TaughtTargets,
    names: &'a TargetNames,
    speed: &'a SpeedLimits,
    boxes_per_layer: usize,
    pacer: Pacer,
}

impl<'a, G: DeviceGateway + ?Sized> Runner<'a, G> {
    pub fn new(
        gateway: &'a mut G,
        cell: CellHandles,
        targets: &'a TaughtTargets,
        names: &'a TargetNames,
        speed: &'a SpeedLimits,
        boxes_per_layer: usize,
        pacer: Pacer,
    ) -> Self {
        Self {
            gateway,
            cell,
            targets,
            names,
            speed,
            boxes_per_layer,
            pacer,
        }
    }

    /// Run every placement in order.
    #[instrument(skip_all, fields(boxes = sequence.len()))]
    pub fn run(&mut self, sequence: &PlacementSequence) -> Result<RunReport, RunError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start_delay = self.pacer.config().start_delay();
        self.pacer.settle(start_delay)?;

        let started = Instant::now();
        let mut layers = 0;

        for placement in sequence {
            let box_number = placement.index + 1;
            self.pacer.enter_box(box_number);
            info!(box_number, layer = placement.layer, "--- Box {} ---", box_number);

            self.pick(box_number)?;

            let lift_clear = LiftClear::for_box(placement.index, self.boxes_per_layer);
            self.place(placement, lift_clear)?;
            layers = placement.layer + 1;
        }

        let elapsed = started.elapsed().as_secs_f64();
        info!(elapsed_secs = elapsed, "Total run time: {:.2} seconds", elapsed);
        let message = format!("Total time: {:.2} s", elapsed);
        self.pacer
            .guard("ShowMessage", || self.gateway.show_message(&message))?;

        Ok(RunReport {
            started_at,
            boxes_placed: sequence.len(),
            layers,
            elapsed_secs: elapsed,
        })
    }

    fn pick(&mut self, box_number: usize) -> Result<(), RunError> {
        let robot = self.cell.robot;
        let frame = self.cell.pick_frame;
        self.prepare(frame)?;

        let approach = JointTarget::Joints(self.targets.pick_approach.clone());
        self.pacer
            .guard("MoveJ", || self.gateway.move_joint(robot, &approach))?;
        let pick = self.targets.pick;
        self.pacer
            .guard("MoveL", || self.gateway.move_linear(robot, &pick))?;

        info!(box_number, "Picking box...");
        let names = self.names;
        let attach = names.attach_program.as_str();
        self.actuate(attach, GripStage::Attach, box_number)?;

        let retreat = self.targets.pick_retreat;
        self.pacer
            .guard("MoveL", || self.gateway.move_linear(robot, &retreat))?;
        Ok(())
    }

    fn place(&mut self, placement: &Placement, lift_clear: LiftClear) -> Result<(), RunError> {
        let robot = self.cell.robot;
        let box_number = placement.index + 1;
        let frame = self.cell.place_frame;
        self.prepare(frame)?;

        let up = JointTarget::Joints(self.targets.lift_clear(lift_clear).clone());
        debug!(box_number, lift_clear = lift_clear.number(), "Lift-clear waypoint");
        self.pacer.guard("MoveJ", || self.gateway.move_joint(robot, &up))?;

        info!(box_number, "Moving to APP_PLACE {}", box_number);
        let approach = JointTarget::Pose(placement.poses.approach);
        self.pacer
            .guard("MoveJ", || self.gateway.move_joint(robot, &approach))?;

        info!(box_number, "Moving to PLACE {}", box_number);
        let place = placement.poses.place;
        self.pacer
            .guard("MoveL", || self.gateway.move_linear(robot, &place))?;

        let names = self.names;
        let drop = names.drop_program.as_str();
        self.actuate(drop, GripStage::Drop, box_number)?;

        info!(box_number, "Moving to RET_PLACE {}", box_number);
        let retreat = placement.poses.retreat;
        self.pacer
            .guard("MoveL", || self.gateway.move_linear(robot, &retreat))?;
        self.pacer.guard("MoveJ", || self.gateway.move_joint(robot, &up))?;
        Ok(())
    }

    /// Select frame and tool, apply speed limits, then let the cell settle.
    fn prepare(&mut self, frame: FrameHandle) -> Result<(), RunError> {
        let robot = self.cell.robot;
        let tool = self.cell.tool;
        let speed = self.speed;
        self.pacer
            .guard("SetFrame", || self.gateway.set_frame(robot, frame))?;
        self.pacer
            .guard("SetTool", || self.gateway.set_tool(robot, tool))?;
        self.pacer
            .guard("SetSpeed", || self.gateway.set_speed(robot, speed))?;
        self.pacer.settle(self.pacer.config().frame_settle())
    }

    /// Settle, run the gripper program, settle again, then optionally
    /// confirm the gripper state.
    fn actuate(
        &mut self,
        program: &str,
        stage: GripStage,
        box_number: usize,
    ) -> Result<(), RunError> {
        let grip_settle = self.pacer.config().grip_settle();
        self.pacer.settle(grip_settle)?;
        self.pacer
            .guard(program, || self.gateway.run_program(program))?;
        self.pacer.settle(grip_settle)?;

        if !self.pacer.config().confirm_grip {
            return Ok(());
        }
        let expected = stage == GripStage::Attach;
        match self.gateway.gripper_holding() {
            Some(holding) if holding == expected => Ok(()),
            Some(_) => Err(RunError::GripNotConfirmed { box_number, stage }),
            None => {
                warn!(box_number, %stage, "Gripper state not observable; continuing");
                Ok(())
            }
        }
    }
}
