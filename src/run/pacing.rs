//! Settle pauses, per-command timeouts and cooperative cancellation.

use crate::error::{DeviceError, RunError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

const SETTLE_SLICE: Duration = Duration::from_millis(10);

/// Pause lengths and limits for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay before the first box
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// Pause after selecting frame, tool and speed
    #[serde(default = "default_frame_settle_ms")]
    pub frame_settle_ms: u64,

    /// Pause before and after each gripper actuation
    #[serde(default = "default_grip_settle_ms")]
    pub grip_settle_ms: u64,

    /// Longest a single device command may take (0 = unbounded)
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Check gripper state after attach/drop when the cell can report it
    #[serde(default)]
    pub confirm_grip: bool,
}

fn default_start_delay_ms() -> u64 {
    2000
}

fn default_frame_settle_ms() -> u64 {
    200
}

fn default_grip_settle_ms() -> u64 {
    500
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_start_delay_ms(),
            frame_settle_ms: default_frame_settle_ms(),
            grip_settle_ms: default_grip_settle_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            confirm_grip: false,
        }
    }
}

impl PacingConfig {
    /// No pauses at all; used for dry runs and tests.
    pub fn immediate() -> Self {
        Self {
            start_delay_ms: 0,
            frame_settle_ms: 0,
            grip_settle_ms: 0,
            ..Self::default()
        }
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn frame_settle(&self) -> Duration {
        Duration::from_millis(self.frame_settle_ms)
    }

    pub fn grip_settle(&self) -> Duration {
        Duration::from_millis(self.grip_settle_ms)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_ms > 0).then(|| Duration::from_millis(self.command_timeout_ms))
    }
}

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Applies the pacing rules around device commands.
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacingConfig,
    cancel: CancelToken,
    box_number: usize,
}

impl Pacer {
    pub fn new(config: PacingConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            cancel,
            box_number: 1,
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Record which box (1-based) is being processed, for error reports.
    pub fn enter_box(&mut self, box_number: usize) {
        self.box_number = box_number;
    }

    pub fn check_cancelled(&self) -> Result<(), RunError> {
        if self.cancel.is_cancelled() {
            Err(RunError::Cancelled {
                box_number: self.box_number,
            })
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, waking early if the run is cancelled.
    pub fn settle(&self, duration: Duration) -> Result<(), RunError> {
        let deadline = Instant::now() + duration;
        loop {
            self.check_cancelled()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SETTLE_SLICE.min(deadline - now));
        }
    }

    /// Issue one device command under the cancellation and timeout rules.
    ///
    /// A blocking command cannot be interrupted mid-call; one that returns
    /// after the limit fails the run instead of letting it continue.
    pub fn guard<T>(
        &self,
        command: &str,
        op: impl FnOnce() -> Result<T, DeviceError>,
    ) -> Result<T, RunError> {
        self.check_cancelled()?;
        let started = Instant::now();
        let value = op()?;
        let elapsed = started.elapsed();
        if let Some(limit) = self.config.command_timeout() {
            if elapsed > limit {
                warn!(command, ?elapsed, ?limit, "Device command exceeded timeout");
                return Err(RunError::CommandTimeout {
                    command: command.to_string(),
                    elapsed,
                    limit,
                });
            }
        }
        Ok(value)
    }
}
