//! Palletizer: Layered Pick-and-Place Sequencing
//!
//! Generates the approach, place and retreat poses for every box on a
//! pallet from two taught layer patterns, and drives a robot cell through
//! them one box at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod geometry;
pub mod job;
pub mod logging;
pub mod plan;
pub mod run;
pub mod station;
pub mod targets;

pub use config::{ConfigLoader, PalletizerConfig};
pub use error::{ConfigurationError, DeviceError, PalletizerError, RunError};
pub use gateway::DeviceGateway;
pub use job::{Job, ValidationReport};
pub use plan::{generate, LayerPatterns, PlacementSequence, StackConfig};
pub use station::SimulatedStation;
