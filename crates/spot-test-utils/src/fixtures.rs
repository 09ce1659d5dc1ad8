//! Geometric fixtures: neutral body states, random rigid transforms,
//! well-conditioned matrices and leg configurations inside the workspace.

use nalgebra::{DMatrix, Isometry3, Matrix4, Translation3, UnitQuaternion};
use rand::Rng;

use spot_core::config::StanceConfig;
use spot_core::types::{BodyState, LegAngles};

/// Level body at stand height with the feet on the default rest corners.
pub fn neutral_body_state() -> BodyState {
    let stance = StanceConfig::default();
    let mut state = BodyState::new(stance.neutral_feet());
    state.ym = stance.stand_height;
    state
}

/// Random rotation + translation as a homogeneous 4x4 matrix.
pub fn random_rigid_transform(rng: &mut impl Rng) -> Matrix4<f64> {
    let rotation = UnitQuaternion::from_euler_angles(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.0..3.0),
    );
    let translation = Translation3::new(
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
    );
    Isometry3::from_parts(translation, rotation).to_homogeneous()
}

/// Random strictly diagonally dominant `n x n` matrix (always invertible).
pub fn random_invertible(rng: &mut impl Rng, n: usize) -> DMatrix<f64> {
    let mut m = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0));
    #[allow(clippy::cast_precision_loss)]
    let dominance = n as f64 + 1.0;
    for i in 0..n {
        let sign = if m[(i, i)] < 0.0 { -1.0 } else { 1.0 };
        m[(i, i)] = sign * (dominance + rng.gen_range(0.0..1.0));
    }
    m
}

/// Random joint angles whose forward solution stays on the knee-back branch
/// with the foot outside the hip-offset cylinder.
pub fn random_leg_angles(rng: &mut impl Rng) -> LegAngles {
    LegAngles::new(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-0.8..0.8),
        rng.gen_range(0.2..1.4),
    )
}
