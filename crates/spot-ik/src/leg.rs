//! Closed-form three-joint leg solver.
//!
//! Works in the leg's own mount frame: the hip-yaw offset `l1`, the hip-roll
//! offset `l2`, then the planar thigh/shank pair `l3`/`l4`. Targets outside
//! the workspace never fail; the two square roots fall back to finite values
//! and the leg reaches as far as it can.

use nalgebra::Vector3;

use spot_core::config::LegGeometry;
use spot_core::types::LegAngles;

/// Analytic inverse and forward kinematics for one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegKinematics {
    geometry: LegGeometry,
}

impl LegKinematics {
    pub const fn new(geometry: LegGeometry) -> Self {
        Self { geometry }
    }

    pub const fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    /// Horizontal distance from the hip-yaw axis past the `l1` offset.
    ///
    /// Falls back to `l1` when the target lies inside the offset cylinder.
    fn hip_reach(&self, x: f64, y: f64) -> f64 {
        let l1 = self.geometry.l1;
        let radicand = x * x + y * y - l1 * l1;
        if radicand.is_nan() || radicand < 0.0 {
            l1
        } else {
            radicand.sqrt()
        }
    }

    /// Law-of-cosines term for the knee; `|D| > 1` means out of reach.
    fn knee_cosine(&self, g: f64, z: f64) -> f64 {
        let LegGeometry { l3, l4, .. } = self.geometry;
        let h_sq = g * g + z * z;
        (h_sq - l3 * l3 - l4 * l4) / (2.0 * l3 * l4)
    }

    /// Joint angles that place the leg tip at `point` (mount frame).
    pub fn leg_ik(&self, point: &Vector3<f64>) -> LegAngles {
        let LegGeometry { l1, l2, l3, l4, .. } = self.geometry;
        let (x, y, z) = (point.x, point.y, point.z);

        let f = self.hip_reach(x, y);
        let g = f - l2;

        let theta1 = -y.atan2(x) - f.atan2(-l1);

        let d = self.knee_cosine(g, z);
        let mut theta3 = (1.0 - d * d).sqrt().atan2(d);
        if theta3.is_nan() {
            theta3 = 0.0;
        }

        let theta2 = z.atan2(g) - (l4 * theta3.sin()).atan2(l3 + l4 * theta3.cos());

        LegAngles::new(theta1, theta2, theta3)
    }

    /// Leg-tip position (mount frame) for a joint configuration.
    pub fn leg_fk(&self, angles: &LegAngles) -> Vector3<f64> {
        let LegGeometry { l1, l2, l3, l4, .. } = self.geometry;
        let LegAngles {
            theta1,
            theta2,
            theta3,
        } = *angles;

        let g = l3 * theta2.cos() + l4 * (theta2 + theta3).cos();
        let z = l3 * theta2.sin() + l4 * (theta2 + theta3).sin();
        let f = g + l2;

        let (s1, c1) = theta1.sin_cos();
        Vector3::new(-l1 * c1 - f * s1, l1 * s1 - f * c1, z)
    }

    /// True when `leg_ik` can solve `point` without either fallback.
    pub fn is_reachable(&self, point: &Vector3<f64>) -> bool {
        let l1 = self.geometry.l1;
        let radicand = point.x * point.x + point.y * point.y - l1 * l1;
        if radicand.is_nan() || radicand < 0.0 {
            return false;
        }
        let g = radicand.sqrt() - self.geometry.l2;
        self.knee_cosine(g, point.z).abs() <= 1.0
    }
}

impl Default for LegKinematics {
    fn default() -> Self {
        Self::new(LegGeometry::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
