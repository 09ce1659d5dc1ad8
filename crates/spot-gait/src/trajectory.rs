//! Continuous, time-driven gait planner.
//!
//! A single phase `φ = (now - epoch) / period` is shared by all legs; each
//! leg reads it through its own offset. The first `step_offset` of a leg's
//! cycle is a stance sweep, the rest a Bezier swing. Translation and turning
//! are planned separately and summed: turning uses the same curves along the
//! tangent of the circle through the foot.

use std::f64::consts::PI;

use log::debug;
use nalgebra::{Vector2, Vector3, Vector4};

use spot_core::config::GaitConfig;
use spot_core::types::LegId;

use crate::bezier::{BinomialCache, calculate_bezier_swing, calculate_stance};
use crate::command::GaitCommand;

// ---------------------------------------------------------------------------
// PhaseOffsets
// ---------------------------------------------------------------------------

/// Per-leg phase offsets in leg order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseOffsets(pub [f64; 4]);

impl PhaseOffsets {
    /// Diagonal pairs in antiphase.
    pub const TROT: Self = Self([0.0, 0.5, 0.5, 0.0]);
    /// Front pair leads the back pair by 0.2 of a cycle.
    ///
    /// This is the default `gait.walk_offsets`. A walk on the diagonal
    /// schedule is obtained by setting `gait.walk_offsets` to the
    /// [`Self::TROT`] table.
    pub const BOUND: Self = Self([0.0, 0.0, 0.8, 0.8]);

    pub const fn get(&self, leg: LegId) -> f64 {
        self.0[leg.index()]
    }
}

impl Default for PhaseOffsets {
    fn default() -> Self {
        Self::BOUND
    }
}

// ---------------------------------------------------------------------------
// Frame mapping
// ---------------------------------------------------------------------------

/// Body-frame point `(x, y, z)` as trajectory coordinates
/// `(forward, lateral, vertical)`.
fn to_trajectory_frame(body: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(body.x, body.z, body.y)
}

fn to_body_frame(traj: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(traj.x, traj.z, traj.y)
}

// ---------------------------------------------------------------------------
// BezierGaitPlanner
// ---------------------------------------------------------------------------

/// Time-driven stance/Bezier-swing planner.
#[derive(Debug, Clone)]
pub struct BezierGaitPlanner {
    offsets: PhaseOffsets,
    step_offset: f64,
    min_step_period: f64,
    rewind_threshold: f64,
    stance_half_length: f64,
    stance_depth: f64,
    phi: f64,
    epoch: Option<f64>,
    cycles: u64,
    /// Heading correction from the last rotational displacement, per leg.
    alpha: [f64; 4],
    binomial: BinomialCache,
}

impl BezierGaitPlanner {
    pub fn new(offsets: PhaseOffsets, config: &GaitConfig) -> Self {
        Self {
            offsets,
            step_offset: config.step_offset,
            min_step_period: config.min_step_period,
            rewind_threshold: config.rewind_threshold,
            stance_half_length: config.stance_half_length,
            stance_depth: config.stance_depth,
            phi: 0.0,
            epoch: None,
            cycles: 0,
            alpha: [0.0; 4],
            binomial: BinomialCache::new(),
        }
    }

    /// Planner using the configured trot offsets.
    pub fn trot(config: &GaitConfig) -> Self {
        Self::new(PhaseOffsets(config.trot_offsets), config)
    }

    /// Planner using the configured walk offsets.
    pub fn walk(config: &GaitConfig) -> Self {
        Self::new(PhaseOffsets(config.walk_offsets), config)
    }

    /// Shared phase from the last [`Self::run_loop`] call (not wrapped).
    pub const fn phi(&self) -> f64 {
        self.phi
    }

    /// Completed cycles, counted at each epoch re-anchor.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    pub const fn offsets(&self) -> &PhaseOffsets {
        &self.offsets
    }

    pub const fn epoch(&self) -> Option<f64> {
        self.epoch
    }

    pub const fn alpha(&self, leg: LegId) -> f64 {
        self.alpha[leg.index()]
    }

    /// Forget the epoch and heading state; the next call starts at `φ = 0`.
    pub const fn reset(&mut self) {
        self.phi = 0.0;
        self.epoch = None;
        self.cycles = 0;
        self.alpha = [0.0; 4];
    }

    /// Displacement of one leg at phase `phi` (wrapped into `[0, 1)`).
    ///
    /// `center_to_foot` is the horizontal `(forward, lateral)` vector from
    /// the body centre to the foot's neutral position; positive lateral is
    /// the left side. Returns `(forward, lateral, vertical)`.
    #[allow(clippy::too_many_arguments)]
    pub fn step_trajectory(
        &mut self,
        leg: LegId,
        phi: f64,
        v: f64,
        angle: f64,
        w_rot: f64,
        center_to_foot: Vector2<f64>,
        direction: f64,
    ) -> Vector3<f64> {
        let phi = phi.rem_euclid(1.0);
        let r = center_to_foot.norm();
        let foot_angle = center_to_foot.y.atan2(center_to_foot.x);
        let alpha = self.alpha[leg.index()];

        let tangent = (foot_angle - alpha) * 180.0 / PI;
        let circle_trajectory = if w_rot >= 0.0 { 90.0 - tangent } else { 270.0 - tangent };

        let (long, rot) = if phi <= self.step_offset {
            let phi_stance = phi / self.step_offset;
            let (half, depth) = (self.stance_half_length, self.stance_depth);
            (
                calculate_stance(phi_stance, v, angle, half, depth),
                calculate_stance(phi_stance, w_rot, circle_trajectory, half, depth),
            )
        } else {
            let phi_swing = (phi - self.step_offset) / (1.0 - self.step_offset);
            (
                calculate_bezier_swing(&mut self.binomial, phi_swing, v, angle, direction),
                calculate_bezier_swing(&mut self.binomial, phi_swing, w_rot, circle_trajectory, direction),
            )
        };

        let swept = rot.x.hypot(rot.y).atan2(r);
        let left = center_to_foot.y > 0.0;
        self.alpha[leg.index()] = match (left, rot.x < 0.0) {
            (true, true) | (false, false) => -swept,
            (true, false) | (false, true) => swept,
        };

        long + rot
    }

    /// Feet for time `now` (seconds).
    ///
    /// `frames` are the neutral body-frame foot positions. The first call
    /// anchors the epoch; once the shared phase reaches the rewind threshold
    /// the next call re-anchors it to `now`.
    pub fn run_loop(
        &mut self,
        now: f64,
        command: &GaitCommand,
        frames: &[Vector3<f64>; 4],
    ) -> [Vector4<f64>; 4] {
        let period = command.step_period.max(self.min_step_period);

        let epoch = match self.epoch {
            Some(epoch) if self.phi < self.rewind_threshold => epoch,
            Some(_) => {
                self.cycles += 1;
                debug!("bezier planner re-anchored at t={now:.3}s (cycle {})", self.cycles);
                now
            }
            None => now,
        };
        self.epoch = Some(epoch);
        self.phi = (now - epoch) / period;

        LegId::ALL.map(|leg| {
            let frame = to_trajectory_frame(&frames[leg.index()]);
            let step = self.step_trajectory(
                leg,
                self.phi + self.offsets.get(leg),
                command.step_velocity,
                command.step_angle,
                command.yaw_rate,
                frame.xy(),
                command.direction,
            );
            to_body_frame(&(frame + step)).push(1.0)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
