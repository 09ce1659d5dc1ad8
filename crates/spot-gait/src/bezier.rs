//! Stance sweep and degree-11 Bezier swing curves for the continuous planner.
//!
//! Both curves return a displacement in the trajectory frame
//! `(forward, lateral, vertical)`, to be added to a foot's neutral position.

use std::f64::consts::PI;

use nalgebra::Vector3;

/// Degree of the swing Bezier (12 control points).
pub const BEZIER_DEGREE: usize = 11;

/// Forward control points of the swing curve, per unit speed.
pub const SWING_X: [f64; 12] = [
    -0.04, -0.056, -0.06, -0.06, -0.06, 0.0, 0.0, 0.0, 0.06, 0.06, 0.056, 0.04,
];

/// Vertical control points of the swing curve, per unit speed.
pub const SWING_Z: [f64; 12] = [
    0.0, 0.0, 0.0405, 0.0405, 0.0405, 0.0405, 0.0405, 0.0495, 0.0495, 0.0495, 0.0, 0.0,
];

// ---------------------------------------------------------------------------
// BinomialCache
// ---------------------------------------------------------------------------

/// Lazily grown factorial table backing the Bernstein coefficients.
#[derive(Debug, Clone)]
pub struct BinomialCache {
    factorials: Vec<u128>,
}

impl BinomialCache {
    /// Largest `n` whose factorial fits in a `u128`.
    pub const MAX_EXACT: usize = 34;

    pub fn new() -> Self {
        Self {
            factorials: vec![1, 1],
        }
    }

    /// Number of factorials currently memoized.
    pub fn len(&self) -> usize {
        self.factorials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factorials.is_empty()
    }

    /// `n!`, extending the table up to `n` on first use. `None` past
    /// [`Self::MAX_EXACT`].
    pub fn factorial(&mut self, n: usize) -> Option<u128> {
        if n > Self::MAX_EXACT {
            return None;
        }
        while self.factorials.len() <= n {
            let i = self.factorials.len();
            let prev = self.factorials[i - 1];
            self.factorials.push(prev * i as u128);
        }
        Some(self.factorials[n])
    }

    /// Binomial coefficient `C(n, k)`; zero when `k > n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn solve_bin_factor(&mut self, n: usize, k: usize) -> f64 {
        if k > n {
            return 0.0;
        }
        match (self.factorial(n), self.factorial(k), self.factorial(n - k)) {
            (Some(n_f), Some(k_f), Some(nk_f)) => (n_f / (k_f * nk_f)) as f64,
            _ => (1..=k.min(n - k)).fold(1.0, |acc, i| acc * (n + 1 - i) as f64 / i as f64),
        }
    }

    /// Weighted Bernstein term `point * C(11, k) * t^k * (1 - t)^(11 - k)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn bezier_term(&mut self, t: f64, k: usize, point: f64) -> f64 {
        let n = BEZIER_DEGREE;
        point * self.solve_bin_factor(n, k) * t.powi(k as i32) * (1.0 - t).powi((n - k) as i32)
    }

    /// Evaluate a 12-point Bezier at `t`, summing every control point.
    pub fn evaluate(&mut self, points: &[f64; 12], t: f64) -> f64 {
        points
            .iter()
            .enumerate()
            .map(|(k, &p)| self.bezier_term(t, k, p))
            .sum()
    }
}

impl Default for BinomialCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Curves
// ---------------------------------------------------------------------------

/// Ground-contact sweep for stance progress `phi_st` in `[0, 1]`.
///
/// The foot travels from `+half_length` to `-half_length` along `angle`
/// (degrees), scaled by `|v|`, with a shallow cosine dip of amplitude
/// `depth` that vanishes at both ends.
pub fn calculate_stance(phi_st: f64, v: f64, angle: f64, half_length: f64, depth: f64) -> Vector3<f64> {
    let (s, c) = angle.to_radians().sin_cos();
    let p_stance = half_length * (1.0 - 2.0 * phi_st);
    Vector3::new(
        c * p_stance * v.abs(),
        -s * p_stance * v.abs(),
        -depth * (PI / (2.0 * half_length) * p_stance).cos(),
    )
}

/// Swing arc for swing progress `phi_sw` in `[0, 1]`, heading `angle`
/// (degrees), speed `v` and travel `direction` (+1 forward, -1 reverse).
pub fn calculate_bezier_swing(
    cache: &mut BinomialCache,
    phi_sw: f64,
    v: f64,
    angle: f64,
    direction: f64,
) -> Vector3<f64> {
    let (s, c) = angle.to_radians().sin_cos();
    let speed = v.abs();

    let x = SWING_X.map(|p| speed * c * p * direction);
    let y = SWING_X.map(|p| -speed * s * p * direction);
    let z = SWING_Z.map(|p| speed * p);

    Vector3::new(
        cache.evaluate(&x, phi_sw),
        cache.evaluate(&y, phi_sw),
        cache.evaluate(&z, phi_sw),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
