//! Robot target types: tool-frame poses and joint configurations.
//!
//! Poses wrap nalgebra's `Isometry3<f64>` (translation in mm, rotation as a
//! unit quaternion). Composition is right-multiplication: `p.compose(&t)`
//! applies the offset `t` expressed in the frame of `p`.

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Rigid tool-frame target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRecord", into = "PoseRecord")]
pub struct Pose {
    transform: Isometry3<f64>,
}

impl Pose {
    pub fn new(transform: Isometry3<f64>) -> Self {
        Self { transform }
    }

    pub fn identity() -> Self {
        Self {
            transform: Isometry3::identity(),
        }
    }

    /// Pure translation along the tool Z axis.
    pub fn vertical_offset(dz: f64) -> Self {
        Self {
            transform: Isometry3::translation(0.0, 0.0, dz),
        }
    }

    /// Build a pose from XYZ (mm) and W-P-R (degrees, Euler ZYX).
    pub fn from_xyz_wpr(x: f64, y: f64, z: f64, w: f64, p: f64, r: f64) -> Self {
        let rotation = euler_zyx_to_quaternion(w, p, r);
        Self {
            transform: Isometry3::from_parts(Translation3::new(x, y, z), rotation),
        }
    }

    pub fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    pub fn translation(&self) -> (f64, f64, f64) {
        let t = &self.transform.translation;
        (t.x, t.y, t.z)
    }

    /// Rotation as (W, P, R) in degrees.
    pub fn to_wpr_degrees(&self) -> (f64, f64, f64) {
        quaternion_to_euler_zyx(&self.transform.rotation)
    }

    /// `self ∘ offset`: apply `offset` in this pose's frame.
    pub fn compose(&self, offset: &Pose) -> Pose {
        Pose {
            transform: self.transform * offset.transform,
        }
    }

    /// Shorthand for `self ∘ vertical_offset(dz)`.
    pub fn offset_z(&self, dz: f64) -> Pose {
        self.compose(&Pose::vertical_offset(dz))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

/// Human-editable pose representation used in station files and JSON output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// Position in mm
    pub xyz: [f64; 3],
    /// W, P, R in degrees
    #[serde(default)]
    pub wpr: [f64; 3],
}

impl From<PoseRecord> for Pose {
    fn from(record: PoseRecord) -> Self {
        let [x, y, z] = record.xyz;
        let [w, p, r] = record.wpr;
        Pose::from_xyz_wpr(x, y, z, w, p, r)
    }
}

impl From<Pose> for PoseRecord {
    fn from(pose: Pose) -> Self {
        let (x, y, z) = pose.translation();
        let (w, p, r) = pose.to_wpr_degrees();
        PoseRecord {
            xyz: [x, y, z],
            wpr: [w, p, r],
        }
    }
}

/// Ordered joint angles in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointConfiguration(Vec<f64>);

impl JointConfiguration {
    pub fn new(joints: Vec<f64>) -> Self {
        Self(joints)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for JointConfiguration {
    fn from(joints: Vec<f64>) -> Self {
        Self(joints)
    }
}

impl std::fmt::Display for JointConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|j| format!("{:.2}", j)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Unit quaternion to (W, P, R) in degrees.
pub fn quaternion_to_euler_zyx(q: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    // euler_angles() yields (roll, pitch, yaw)
    let (r_rad, p_rad, w_rad) = q.to_rotation_matrix().euler_angles();
    (w_rad.to_degrees(), p_rad.to_degrees(), r_rad.to_degrees())
}

/// (W, P, R) in degrees to a unit quaternion.
pub fn euler_zyx_to_quaternion(w_deg: f64, p_deg: f64, r_deg: f64) -> UnitQuaternion<f64> {
    let rotation = Rotation3::from_euler_angles(
        r_deg.to_radians(),
        p_deg.to_radians(),
        w_deg.to_radians(),
    );
    UnitQuaternion::from_rotation_matrix(&rotation)
}
