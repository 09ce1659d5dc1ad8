use std::fmt;
use std::ops::{Index, IndexMut};

use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LegId
// ---------------------------------------------------------------------------

/// One of the four legs, in the fixed order used by every per-leg array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl LegId {
    /// All legs in array order.
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::BackLeft,
        Self::BackRight,
    ];

    /// Position of this leg in per-leg arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::FrontLeft => 0,
            Self::FrontRight => 1,
            Self::BackLeft => 2,
            Self::BackRight => 3,
        }
    }

    /// Right-side legs are solved through the sagittal mirror.
    pub const fn is_right(self) -> bool {
        matches!(self, Self::FrontRight | Self::BackRight)
    }

    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    /// Short label used in logs and CLI output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FrontLeft => "lf",
            Self::FrontRight => "rf",
            Self::BackLeft => "lb",
            Self::BackRight => "rb",
        }
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// BodyState
// ---------------------------------------------------------------------------

/// Desired body pose plus the four leg-tip targets, all in the body frame.
///
/// Rotation angles are in degrees: `omega` is roll, `phi` pitch, `psi` yaw.
/// Each foot is a homogeneous `[x, y, z, 1]` vector; the setters keep the
/// homogeneous component at 1, and so does deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BodyStateRecord")]
pub struct BodyState {
    pub omega: f64,
    pub phi: f64,
    pub psi: f64,
    pub xm: f64,
    pub ym: f64,
    pub zm: f64,
    feet: [Vector4<f64>; 4],
}

/// Wire shape of [`BodyState`]; converted through `set_feet`.
#[derive(Deserialize)]
struct BodyStateRecord {
    omega: f64,
    phi: f64,
    psi: f64,
    xm: f64,
    ym: f64,
    zm: f64,
    feet: [Vector4<f64>; 4],
}

impl From<BodyStateRecord> for BodyState {
    fn from(record: BodyStateRecord) -> Self {
        let mut body = Self {
            omega: record.omega,
            phi: record.phi,
            psi: record.psi,
            xm: record.xm,
            ym: record.ym,
            zm: record.zm,
            feet: record.feet,
        };
        body.set_feet(record.feet);
        body
    }
}

impl BodyState {
    /// Level body at the origin with the given foot positions.
    pub fn new(feet: [Vector3<f64>; 4]) -> Self {
        Self {
            omega: 0.0,
            phi: 0.0,
            psi: 0.0,
            xm: 0.0,
            ym: 0.0,
            zm: 0.0,
            feet: feet.map(|p| p.push(1.0)),
        }
    }

    /// All four homogeneous foot targets in leg order.
    pub const fn feet(&self) -> &[Vector4<f64>; 4] {
        &self.feet
    }

    /// Homogeneous target for a single leg.
    pub fn foot(&self, leg: LegId) -> &Vector4<f64> {
        &self.feet[leg.index()]
    }

    /// Cartesian part of a leg's target.
    pub fn foot_position(&self, leg: LegId) -> Vector3<f64> {
        self.feet[leg.index()].xyz()
    }

    pub fn set_foot(&mut self, leg: LegId, position: Vector3<f64>) {
        self.feet[leg.index()] = position.push(1.0);
    }

    /// Replace all feet, forcing the homogeneous component back to 1.
    pub fn set_feet(&mut self, feet: [Vector4<f64>; 4]) {
        self.feet = feet.map(|mut p| {
            p.w = 1.0;
            p
        });
    }

    /// Body rotation `[omega, phi, psi]` in degrees.
    pub const fn rotation(&self) -> [f64; 3] {
        [self.omega, self.phi, self.psi]
    }

    pub const fn set_rotation(&mut self, omega: f64, phi: f64, psi: f64) {
        self.omega = omega;
        self.phi = phi;
        self.psi = psi;
    }

    pub const fn set_translation(&mut self, xm: f64, ym: f64, zm: f64) {
        self.xm = xm;
        self.ym = ym;
        self.zm = zm;
    }
}

// ---------------------------------------------------------------------------
// LegAngles / JointAngles
// ---------------------------------------------------------------------------

/// Joint angles of one leg in radians: hip yaw, hip pitch, knee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegAngles {
    pub theta1: f64,
    pub theta2: f64,
    pub theta3: f64,
}

impl LegAngles {
    pub const fn new(theta1: f64, theta2: f64, theta3: f64) -> Self {
        Self {
            theta1,
            theta2,
            theta3,
        }
    }

    pub const fn to_array(self) -> [f64; 3] {
        [self.theta1, self.theta2, self.theta3]
    }

    pub const fn is_finite(&self) -> bool {
        self.theta1.is_finite() && self.theta2.is_finite() && self.theta3.is_finite()
    }
}

/// The twelve actuator angles handed to the servo driver, in leg order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    legs: [LegAngles; 4],
}

impl JointAngles {
    pub const fn new(legs: [LegAngles; 4]) -> Self {
        Self { legs }
    }

    pub const fn legs(&self) -> &[LegAngles; 4] {
        &self.legs
    }

    /// Flattened `[lf.θ1, lf.θ2, lf.θ3, rf.θ1, ...]`.
    pub fn to_array(&self) -> [f64; 12] {
        let mut out = [0.0; 12];
        for (chunk, leg) in out.chunks_exact_mut(3).zip(&self.legs) {
            chunk.copy_from_slice(&leg.to_array());
        }
        out
    }

    /// Flattened angles converted to degrees.
    pub fn to_degrees(&self) -> [f64; 12] {
        self.to_array().map(f64::to_degrees)
    }

    pub fn is_finite(&self) -> bool {
        self.legs.iter().all(LegAngles::is_finite)
    }
}

impl Index<LegId> for JointAngles {
    type Output = LegAngles;

    fn index(&self, leg: LegId) -> &LegAngles {
        &self.legs[leg.index()]
    }
}

impl IndexMut<LegId> for JointAngles {
    fn index_mut(&mut self, leg: LegId) -> &mut LegAngles {
        &mut self.legs[leg.index()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
