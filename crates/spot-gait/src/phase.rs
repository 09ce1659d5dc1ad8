//! Discrete tick-counted gait planner.
//!
//! A cycle of `total_phase_ticks` is split into `num_phases` equal sub-phases.
//! A static contact table says, per leg and sub-phase, whether the foot is in
//! stance (drifts backwards under the body) or swing (steps forwards, or
//! relaxes towards its rest position on an axis with no command, and lifts
//! along a half-sine).

use std::f64::consts::PI;

use log::debug;
use nalgebra::Vector3;

use spot_core::config::{GaitConfig, StanceConfig};
use spot_core::types::{BodyState, LegId};

use crate::command::GaitCommand;

/// Tick-driven stance/swing planner with a fixed contact schedule.
#[derive(Debug, Clone)]
pub struct PhaseGaitPlanner {
    tick: u32,
    phase: usize,
    phase_time: f64,
    phase_length: u32,
    num_phases: usize,
    contact_phases: Vec<Vec<u8>>,
    default_feet: [Vector3<f64>; 4],
    stance_drift_divisor: f64,
    recenter_rate: f64,
}

impl PhaseGaitPlanner {
    /// A zero-phase schedule is treated as a single always-swing phase.
    pub fn new(config: &GaitConfig, stance: &StanceConfig) -> Self {
        Self {
            tick: 0,
            phase: 0,
            phase_time: 0.0,
            phase_length: config.phase_length(),
            num_phases: config.num_phases.max(1),
            contact_phases: config.contact_phases.clone(),
            default_feet: stance.neutral_feet(),
            stance_drift_divisor: config.stance_drift_divisor,
            recenter_rate: config.recenter_rate,
        }
    }

    /// Current sub-phase index in `[0, num_phases)`.
    pub const fn phase(&self) -> usize {
        self.phase
    }

    /// Progress through the current sub-phase, `tick / phase_length`.
    pub const fn phase_time(&self) -> f64 {
        self.phase_time
    }

    pub const fn tick(&self) -> u32 {
        self.tick
    }

    pub const fn num_phases(&self) -> usize {
        self.num_phases
    }

    /// Whether `leg` is in stance during the current sub-phase.
    pub fn is_contact(&self, leg: LegId) -> bool {
        self.contact_phases
            .get(leg.index())
            .and_then(|row| row.get(self.phase))
            .is_some_and(|&c| c != 0)
    }

    /// Advance one tick; rolls over to the next sub-phase every
    /// `phase_length` ticks.
    pub fn update_phase(&mut self) {
        self.tick += 1;
        self.phase_time = f64::from(self.tick) / f64::from(self.phase_length);

        if self.tick % self.phase_length == 0 {
            self.phase = (self.phase + 1) % self.num_phases;
            self.tick = 0;
            debug!("phase planner advanced to sub-phase {}", self.phase);
        }
    }

    /// Body attitude `[omega, phi, psi]` for the eight-phase schedule.
    ///
    /// The eight-phase schedule has no shift profile yet, so the body is held
    /// level.
    pub const fn body_shift(&self) -> [f64; 3] {
        [0.0, 0.0, 0.0]
    }

    fn stance(&self, foot: &mut Vector3<f64>, leg: LegId, command: &GaitCommand, dt: f64) {
        foot.x -= command.step_x * dt / self.stance_drift_divisor;
        foot.y = self.default_feet[leg.index()].y;
        foot.z -= command.step_z * dt / self.stance_drift_divisor;
    }

    #[allow(clippy::float_cmp)]
    fn swing(&self, foot: &mut Vector3<f64>, leg: LegId, command: &GaitCommand, dt: f64) {
        let rest = self.default_feet[leg.index()];

        let dx = if command.step_x == 0.0 {
            (rest.x - foot.x) * dt * self.recenter_rate
        } else {
            command.step_x * dt
        };
        let dz = if command.step_z == 0.0 {
            (rest.z - foot.z) * dt * self.recenter_rate
        } else {
            command.step_z * dt
        };

        foot.x += dx;
        foot.y = rest.y + (self.phase_time * PI).sin() * command.step_height;
        foot.z += dz;
    }

    /// One control tick: advance the schedule and move every foot of `body`.
    pub fn step(&mut self, body: &mut BodyState, command: &GaitCommand, dt: f64) {
        self.update_phase();

        for leg in LegId::ALL {
            let mut foot = body.foot_position(leg);
            if self.is_contact(leg) {
                self.stance(&mut foot, leg, command, dt);
            } else {
                self.swing(&mut foot, leg, command, dt);
            }
            body.set_foot(leg, foot);
        }

        if self.num_phases == 8 {
            let [omega, phi, psi] = self.body_shift();
            body.set_rotation(omega, phi, psi);
        }
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

    fn planner() -> PhaseGaitPlanner {
        PhaseGaitPlanner::new(&GaitConfig::default(), &StanceConfig::default())
    }

    fn command(step_x: f64, step_z: f64) -> GaitCommand {
        GaitCommand {
            step_x,
            step_z,
            ..GaitCommand::default()
        }
    }

    #[test]
    fn phases_cycle_in_order() {
        let mut p = planner();
        let mut seen = vec![p.phase()];
        for _ in 0..60 {
            p.update_phase();
            if seen.last() != Some(&p.phase()) {
                seen.push(p.phase());
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 0]);
        assert_eq!(p.tick(), 0);
    }

    #[test]
    fn phase_rolls_over_on_fifteenth_tick() {
        let mut p = planner();
        for _ in 0..14 {
            p.update_phase();
        }
        assert_eq!(p.phase(), 0);
        assert_eq!(p.tick(), 14);
        assert_relative_eq!(p.phase_time(), 14.0 / 15.0);

        p.update_phase();
        assert_eq!(p.phase(), 1);
        assert_eq!(p.tick(), 0);
        assert_relative_eq!(p.phase_time(), 1.0);
    }

    #[test]
    fn contact_table_lookup() {
        let mut p = planner();
        assert!(LegId::ALL.iter().all(|&leg| p.is_contact(leg)));

        for _ in 0..15 {
            p.update_phase();
        }
        assert!(!p.is_contact(LegId::FrontLeft));
        assert!(p.is_contact(LegId::FrontRight));
        assert!(p.is_contact(LegId::BackLeft));
        assert!(!p.is_contact(LegId::BackRight));
    }

    #[test]
    fn stance_feet_drift_backwards() {
        let mut p = planner();
        let mut body = neutral_body_state();
        let cmd = command(0.3, 0.0);
        p.step(&mut body, &cmd, 0.02);
        for leg in LegId::ALL {
            let foot = body.foot_position(leg);
            let rest = StanceConfig::default().neutral_feet()[leg.index()];
            assert_relative_eq!(foot.x, rest.x - 0.3 * 0.02 / 3.0, epsilon = 1e-12);
            assert_relative_eq!(foot.y, rest.y);
            assert_relative_eq!(foot.z, rest.z);
        }
    }

    #[test]
    fn swing_foot_steps_forward_and_lifts() {
        let mut p = planner();
        let mut body = neutral_body_state();
        let cmd = command(0.3, 0.0);
        for _ in 0..15 {
            p.step(&mut body, &cmd, 0.02);
        }
        assert_eq!(p.phase(), 1);
        let before = body.foot_position(LegId::FrontLeft);

        // Mid-swing: tick 7 of 15.
        for _ in 0..7 {
            p.step(&mut body, &cmd, 0.02);
        }
        let after = body.foot_position(LegId::FrontLeft);
        assert_relative_eq!(after.x, before.x + 7.0 * 0.3 * 0.02, epsilon = 1e-12);
        let lift = (7.0 / 15.0 * PI).sin() * cmd.step_height;
        assert_relative_eq!(after.y, -1.0 + lift, epsilon = 1e-12);
        assert!(after.y > -1.0);
    }

    #[test]
    fn swing_without_command_recenters() {
        let mut p = planner();
        let mut body = neutral_body_state();
        body.set_foot(LegId::FrontLeft, Vector3::new(0.5, -1.0, 1.4));
        for _ in 0..15 {
            p.update_phase();
        }
        p.step(&mut body, &command(0.0, 0.0), 0.02);
        let foot = body.foot_position(LegId::FrontLeft);
        assert_relative_eq!(foot.x, 0.5 + (1.0 - 0.5) * 0.02 * 8.0, epsilon = 1e-12);
        assert_relative_eq!(foot.z, 1.4 + (1.0 - 1.4) * 0.02 * 8.0, epsilon = 1e-12);
    }

    #[test]
    fn foot_returns_to_default_height_in_stance() {
        let mut p = planner();
        let mut body = neutral_body_state();
        let cmd = command(0.2, 0.1);
        for _ in 0..30 {
            p.step(&mut body, &cmd, 0.02);
        }
        // Sub-phase 2 puts the front-left foot back in stance.
        assert_eq!(p.phase(), 2);
        assert!(p.is_contact(LegId::FrontLeft));
        assert_relative_eq!(body.foot_position(LegId::FrontLeft).y, -1.0);
    }

    #[test]
    fn every_leg_lifts_only_in_its_swing_phases() {
        let config = GaitConfig::default();
        let rest = StanceConfig::default().neutral_feet();
        let mut p = planner();
        let mut body = neutral_body_state();
        let cmd = command(0.2, 0.0);
        let mut lifted = [0_u32; 4];

        for _ in 0..2 * config.total_phase_ticks {
            p.step(&mut body, &cmd, 0.02);
            for leg in LegId::ALL {
                let y = body.foot_position(leg).y;
                let base = rest[leg.index()].y;
                if config.contact_phases[leg.index()][p.phase()] != 0 {
                    assert_relative_eq!(y, base);
                } else if p.phase_time() < 1.0 {
                    assert!(y > base + 1e-6, "{leg} grounded during swing");
                } else {
                    // Rollover tick: swing starts at the rest height.
                    assert_relative_eq!(y, base, epsilon = 1e-12);
                }
                if y > base + 1e-6 {
                    lifted[leg.index()] += 1;
                }
            }
        }

        for leg in LegId::ALL {
            let swing_phases = config.contact_phases[leg.index()]
                .iter()
                .filter(|&&c| c == 0)
                .count();
            let expected = 2 * u32::try_from(swing_phases).unwrap() * (config.phase_length() - 1);
            assert_eq!(lifted[leg.index()], expected, "{leg}");
        }
    }

    #[test]
    fn degenerate_schedule_steps_without_panicking() {
        let config = GaitConfig {
            num_phases: 0,
            contact_phases: vec![Vec::new(); 4],
            ..GaitConfig::default()
        };
        let mut p = PhaseGaitPlanner::new(&config, &StanceConfig::default());
        let mut body = neutral_body_state();
        for _ in 0..5 {
            p.step(&mut body, &command(0.1, 0.0), 0.02);
        }
        assert_eq!(p.num_phases(), 1);
        assert_eq!(p.phase(), 0);
        assert!(body.feet().iter().all(|f| f.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn eight_phase_schedule_levels_the_body() {
        let config = GaitConfig {
            num_phases: 8,
            total_phase_ticks: 64,
            contact_phases: vec![vec![1; 8]; 4],
            ..GaitConfig::default()
        };
        let mut p = PhaseGaitPlanner::new(&config, &StanceConfig::default());
        let mut body = neutral_body_state();
        body.set_rotation(3.0, 2.0, 1.0);
        p.step(&mut body, &command(0.0, 0.0), 0.02);
        assert_eq!(body.rotation(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn four_phase_schedule_leaves_attitude_alone() {
        let mut p = planner();
        let mut body = neutral_body_state();
        body.set_rotation(3.0, 2.0, 1.0);
        p.step(&mut body, &command(0.0, 0.0), 0.02);
        assert_eq!(body.rotation(), [3.0, 2.0, 1.0]);
    }
}
