//! Whole-body kinematics: body pose plus foot targets to twelve joint angles.
//!
//! The body pose matrix is composed with four fixed leg-mount transforms. Each
//! foot target is brought into its mount frame through the general inverse in
//! [`crate::linalg`], mirrored across the sagittal plane for right-side legs,
//! and handed to the closed-form leg solver.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{DMatrix, DVector, Matrix4, Vector3, Vector4};

use spot_core::config::LegGeometry;
use spot_core::error::KinematicsError;
use spot_core::types::{BodyState, JointAngles, LegId};

use crate::leg::LegKinematics;
use crate::linalg;

/// Sagittal mirror `diag(-1, 1, 1, 1)` for right-side legs.
fn mirror() -> Matrix4<f64> {
    Matrix4::from_diagonal(&Vector4::new(-1.0, 1.0, 1.0, 1.0))
}

fn to_dynamic(m: &Matrix4<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(4, 4, m.as_slice())
}

/// Mount transform of one leg: a quarter turn about Y, then the hip offset.
fn mount_transform(geometry: &LegGeometry, leg: LegId) -> Matrix4<f64> {
    let (s, c) = FRAC_PI_2.sin_cos();
    let sx = if leg.is_front() { 1.0 } else { -1.0 };
    let sz = if leg.is_right() { -1.0 } else { 1.0 };
    let (x, z) = (sx * geometry.length / 2.0, sz * geometry.width / 2.0);
    #[rustfmt::skip]
    let m = Matrix4::new(
        c,   0.0, s,   x,
        0.0, 1.0, 0.0, 0.0,
        -s,  0.0, c,   z,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Body pose matrix from roll `omega`, pitch `phi`, yaw `psi` (degrees) and
/// the `xm, ym, zm` translation.
pub fn pose_matrix(state: &BodyState) -> Matrix4<f64> {
    let (so, co) = state.omega.to_radians().sin_cos();
    let (sp, cp) = state.phi.to_radians().sin_cos();
    let (ss, cs) = state.psi.to_radians().sin_cos();
    #[rustfmt::skip]
    let tm = Matrix4::new(
        cp * cs,                 -ss * cp,                  sp,       state.xm,
        so * sp * cs + ss * co,  -so * sp * ss + co * cs,   -so * cp, state.ym,
        so * ss - sp * co * cs,  so * cs + sp * ss * co,    co * cp,  state.zm,
        0.0,                     0.0,                       0.0,      1.0,
    );
    tm
}

/// Pose-dependent transforms from the body frame into each leg's mount.
#[derive(Debug, Clone)]
pub struct BodyKinematics {
    leg: LegKinematics,
    mounts: [Matrix4<f64>; 4],
}

impl BodyKinematics {
    pub fn new(geometry: LegGeometry) -> Self {
        Self {
            leg: LegKinematics::new(geometry),
            mounts: LegId::ALL.map(|leg| mount_transform(&geometry, leg)),
        }
    }

    pub const fn leg(&self) -> &LegKinematics {
        &self.leg
    }

    pub const fn geometry(&self) -> &LegGeometry {
        self.leg.geometry()
    }

    /// Fixed mount transform of `leg` relative to the body centre.
    pub fn mount(&self, leg: LegId) -> &Matrix4<f64> {
        &self.mounts[leg.index()]
    }

    /// `Tm * mount` for every leg, in leg order.
    pub fn body_ik(&self, state: &BodyState) -> [Matrix4<f64>; 4] {
        let tm = pose_matrix(state);
        self.mounts.map(|mount| tm * mount)
    }

    /// Twelve joint angles that realise `state`.
    ///
    /// # Errors
    ///
    /// Structural errors from the matrix algebra: a singular leg transform
    /// (malformed pose) or a shape mismatch.
    pub fn calc_ik(&self, state: &BodyState) -> Result<JointAngles, KinematicsError> {
        let transforms = self.body_ik(state);
        let ix = to_dynamic(&mirror());
        let mut angles = JointAngles::default();

        for leg in LegId::ALL {
            let inv = linalg::inverse(&to_dynamic(&transforms[leg.index()]))?;
            let foot = DVector::from_column_slice(state.foot(leg).as_slice());
            let mut local = linalg::multiply_vector(&inv, &foot)?;
            if leg.is_right() {
                local = linalg::multiply_vector(&ix, &local)?;
            }
            angles[leg] = self.leg.leg_ik(&Vector3::new(local[0], local[1], local[2]));
        }

        Ok(angles)
    }

    /// Leg-tip positions in the body frame for a joint solution at `state`'s
    /// pose; the inverse of [`Self::calc_ik`] for reachable targets.
    pub fn calc_fk(&self, state: &BodyState, angles: &JointAngles) -> [Vector3<f64>; 4] {
        let transforms = self.body_ik(state);
        let ix = mirror();
        LegId::ALL.map(|leg| {
            let mut local = self.leg.leg_fk(&angles[leg]).push(1.0);
            if leg.is_right() {
                local = ix * local;
            }
            (transforms[leg.index()] * local).xyz()
        })
    }
}

impl Default for BodyKinematics {
    fn default() -> Self {
        Self::new(LegGeometry::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spot_test_utils::neutral_body_state;

    #[test]
    fn level_pose_is_pure_translation() {
        let mut state = neutral_body_state();
        state.set_translation(0.1, 0.7, -0.2);
        let tm = pose_matrix(&state);
        let mut expected = Matrix4::identity();
        expected[(0, 3)] = 0.1;
        expected[(1, 3)] = 0.7;
        expected[(2, 3)] = -0.2;
        assert_relative_eq!(tm, expected, epsilon = 1e-12);
    }

    #[test]
    fn pose_rotation_is_orthonormal() {
        let mut state = neutral_body_state();
        state.set_rotation(12.0, -7.0, 30.0);
        let r = pose_matrix(&state).fixed_view::<3, 3>(0, 0).into_owned();
        assert_relative_eq!(r.transpose() * r, nalgebra::Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pose_matrix_entries() {
        let mut state = neutral_body_state();
        state.set_rotation(90.0, 0.0, 0.0);
        let tm = pose_matrix(&state);
        // Pure roll: Y maps onto Z.
        assert_relative_eq!(tm[(2, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(tm[(1, 2)], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn mounts_sit_at_body_corners() {
        let body = BodyKinematics::default();
        let g = *body.geometry();
        let signs = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];
        for (leg, (sx, sz)) in LegId::ALL.into_iter().zip(signs) {
            let m = body.mount(leg);
            assert_relative_eq!(m[(0, 3)], sx * g.length / 2.0);
            assert_relative_eq!(m[(2, 3)], sz * g.width / 2.0);
            assert_relative_eq!(m[(0, 2)], 1.0, epsilon = 1e-12);
            assert_relative_eq!(m[(2, 0)], -1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn neutral_stance_is_mirror_symmetric() {
        let body = BodyKinematics::default();
        let angles = body.calc_ik(&neutral_body_state()).unwrap();
        assert!(angles.is_finite());

        let fl = angles[LegId::FrontLeft];
        let fr = angles[LegId::FrontRight];
        let bl = angles[LegId::BackLeft];
        let br = angles[LegId::BackRight];
        assert_relative_eq!(fl.theta1, fr.theta1, epsilon = 1e-9);
        assert_relative_eq!(fl.theta2, fr.theta2, epsilon = 1e-9);
        assert_relative_eq!(fl.theta3, fr.theta3, epsilon = 1e-9);
        assert_relative_eq!(bl.theta1, br.theta1, epsilon = 1e-9);
        assert_relative_eq!(bl.theta2, br.theta2, epsilon = 1e-9);
        assert_relative_eq!(bl.theta3, br.theta3, epsilon = 1e-9);
    }

    #[test]
    fn neutral_stance_targets_are_reachable() {
        let body = BodyKinematics::default();
        let state = neutral_body_state();
        let transforms = body.body_ik(&state);
        for leg in LegId::ALL {
            let inv = transforms[leg.index()].try_inverse().unwrap();
            let mut local = inv * state.foot(leg);
            if leg.is_right() {
                local.x = -local.x;
            }
            assert!(body.leg().is_reachable(&local.xyz()), "{leg} unreachable");
        }
    }

    #[test]
    fn fk_inverts_ik_at_neutral() {
        let body = BodyKinematics::default();
        let state = neutral_body_state();
        let angles = body.calc_ik(&state).unwrap();
        let feet = body.calc_fk(&state, &angles);
        for leg in LegId::ALL {
            assert_relative_eq!(feet[leg.index()], state.foot_position(leg), epsilon = 1e-9);
        }
    }

    #[test]
    fn fk_inverts_ik_for_tilted_body() {
        let body = BodyKinematics::default();
        let mut state = neutral_body_state();
        state.set_rotation(6.0, -4.0, 10.0);
        state.set_translation(0.1, 0.65, -0.05);
        state.set_foot(LegId::FrontLeft, Vector3::new(1.2, -1.0, 0.9));
        let angles = body.calc_ik(&state).unwrap();
        assert!(angles.is_finite());
        let feet = body.calc_fk(&state, &angles);
        for leg in LegId::ALL {
            assert_relative_eq!(feet[leg.index()], state.foot_position(leg), epsilon = 1e-9);
        }
    }

    #[test]
    fn nan_pose_is_singular() {
        let body = BodyKinematics::default();
        let mut state = neutral_body_state();
        state.omega = f64::NAN;
        assert!(matches!(
            body.calc_ik(&state),
            Err(KinematicsError::SingularMatrix { .. })
        ));
    }
}
