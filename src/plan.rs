//! Pose-sequence generation.
//!
//! Turns the two taught layer patterns and the stacking parameters into the
//! full, ordered list of approach/place/retreat triples. Generation is a pure
//! function: it runs once before any motion and the result is read-only.

use crate::error::ConfigurationError;
use crate::geometry::Pose;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on boxes in one sequence.
pub const MAX_BOXES: usize = 100_000;

/// Stacking parameters.
///
/// Tool Z points down in the pallet frame, so the approach distance is
/// positive (down onto the pallet) and the retreat distance is
/// conventionally negative (back up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Physical height of one box (mm)
    #[serde(default = "default_box_height")]
    pub box_height: f64,

    /// Boxes placed per pallet layer
    #[serde(default = "default_boxes_per_layer")]
    pub boxes_per_layer: usize,

    /// Number of layers to build
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,

    /// Offset from approach pose down to place pose (mm)
    #[serde(default = "default_approach_distance")]
    pub approach_distance: f64,

    /// Offset from place pose to retreat pose (mm)
    #[serde(default = "default_retreat_distance")]
    pub retreat_distance: f64,
}

fn default_box_height() -> f64 {
    200.0
}

fn default_boxes_per_layer() -> usize {
    2
}

fn default_num_layers() -> usize {
    4
}

fn default_approach_distance() -> f64 {
    200.0
}

fn default_retreat_distance() -> f64 {
    -50.0
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            box_height: default_box_height(),
            boxes_per_layer: default_boxes_per_layer(),
            num_layers: default_num_layers(),
            approach_distance: default_approach_distance(),
            retreat_distance: default_retreat_distance(),
        }
    }
}

impl StackConfig {
    /// Check every scalar parameter; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.box_height.is_finite() && self.box_height > 0.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "box_height",
                reason: format!("must be a positive number, got {}", self.box_height),
            });
        }
        if self.boxes_per_layer == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "boxes_per_layer",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_layers == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "num_layers",
                reason: "must be at least 1".to_string(),
            });
        }
        match self.boxes_per_layer.checked_mul(self.num_layers) {
            Some(total) if total <= MAX_BOXES => {}
            _ => {
                return Err(ConfigurationError::InvalidParameter {
                    name: "num_layers",
                    reason: format!(
                        "{} layers of {} boxes exceeds the limit of {} boxes",
                        self.num_layers, self.boxes_per_layer, MAX_BOXES
                    ),
                });
            }
        }
        if !(self.approach_distance.is_finite() && self.approach_distance > 0.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "approach_distance",
                reason: format!("must be a positive number, got {}", self.approach_distance),
            });
        }
        if !self.retreat_distance.is_finite() {
            return Err(ConfigurationError::InvalidParameter {
                name: "retreat_distance",
                reason: format!("must be finite, got {}", self.retreat_distance),
            });
        }
        Ok(())
    }

    /// Total number of boxes on a finished pallet.
    pub fn total_boxes(&self) -> usize {
        self.boxes_per_layer.saturating_mul(self.num_layers)
    }

    /// Cumulative clearance for `layer`: one full pattern pair's worth of
    /// box-stack height every two layers.
    pub fn extra_height(&self, layer: usize) -> f64 {
        self.box_height * self.boxes_per_layer as f64 * (layer / 2) as f64
    }
}

/// Which taught pattern a layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternId {
    A,
    B,
}

impl PatternId {
    /// Even layers use A, odd layers use B.
    pub fn for_layer(layer: usize) -> Self {
        if layer % 2 == 0 {
            PatternId::A
        } else {
            PatternId::B
        }
    }

    pub fn as_char(self) -> char {
        match self {
            PatternId::A => 'A',
            PatternId::B => 'B',
        }
    }
}

/// The two alternating sets of taught per-box approach poses.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPatterns {
    pub a: Vec<Pose>,
    pub b: Vec<Pose>,
}

impl LayerPatterns {
    pub fn new(a: Vec<Pose>, b: Vec<Pose>) -> Self {
        Self { a, b }
    }

    pub fn get(&self, id: PatternId) -> &[Pose] {
        match id {
            PatternId::A => &self.a,
            PatternId::B => &self.b,
        }
    }

    /// Both patterns must hold exactly `boxes_per_layer` poses.
    pub fn validate(&self, boxes_per_layer: usize) -> Result<(), ConfigurationError> {
        for id in [PatternId::A, PatternId::B] {
            let actual = self.get(id).len();
            if actual != boxes_per_layer {
                return Err(ConfigurationError::PatternLength {
                    pattern: id.as_char(),
                    expected: boxes_per_layer,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Approach, place and retreat poses for one box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseTriple {
    pub approach: Pose,
    pub place: Pose,
    pub retreat: Pose,
}

/// A pose triple with its position in the stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Zero-based placement order
    pub index: usize,
    pub layer: usize,
    /// Box slot within the layer pattern
    pub slot: usize,
    pub pattern: PatternId,
    pub extra_height: f64,
    pub poses: PoseTriple,
}

/// Ordered placements, layer-major then slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSequence {
    placements: Vec<Placement>,
}

impl PlacementSequence {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Placement> {
        self.placements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

impl<'a> IntoIterator for &'a PlacementSequence {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// Generate the full placement sequence.
///
/// Fails before producing any pose if a parameter is invalid or a pattern
/// does not hold exactly `boxes_per_layer` poses.
pub fn generate(
    patterns: &LayerPatterns,
    stack: &StackConfig,
) -> Result<PlacementSequence, ConfigurationError> {
    stack.validate()?;
    patterns.validate(stack.boxes_per_layer)?;

    let mut placements = Vec::with_capacity(stack.total_boxes());

    for layer in 0..stack.num_layers {
        let pattern = PatternId::for_layer(layer);
        let base = patterns.get(pattern);
        // Tool Z points down: raising the target means negative Z
        let extra_height = stack.extra_height(layer);

        for (slot, taught) in base.iter().enumerate() {
            let approach = taught.offset_z(-extra_height);
            let place = approach.offset_z(stack.approach_distance);
            let retreat = place.offset_z(stack.retreat_distance);

            placements.push(Placement {
                index: placements.len(),
                layer,
                slot,
                pattern,
                extra_height,
                poses: PoseTriple {
                    approach,
                    place,
                    retreat,
                },
            });
        }
    }

    debug!(
        boxes = placements.len(),
        layers = stack.num_layers,
        "Placement sequence generated"
    );

    Ok(PlacementSequence { placements })
}

/// Lift-clear waypoint selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftClear {
    First,
    Second,
}

impl LiftClear {
    /// Alternates every `boxes_per_layer` boxes, in step with the pattern
    /// alternation.
    pub fn for_box(index: usize, boxes_per_layer: usize) -> Self {
        // Odd pattern rows use the second waypoint
        match index.checked_div(boxes_per_layer) {
            Some(row) if row % 2 == 1 => LiftClear::Second,
            _ => LiftClear::First,
        }
    }

    pub fn number(self) -> usize {
        match self {
            LiftClear::First => 1,
            LiftClear::Second => 2,
        }
    }
}
