//! Gait state machine.
//!
//! Exactly one of Idle, Stand, Walk or Trot is active. The machine owns the
//! body state and lends it to the active state on every call. Walk and Trot
//! drive a foot planner; Idle and Stand leave the feet where they are.

use log::info;

use spot_core::config::{GaitConfig, GeneratorKind, StanceConfig};
use spot_core::types::BodyState;

use crate::command::{GaitCommand, GaitMode, OperatorCommand};
use crate::phase::PhaseGaitPlanner;
use crate::trajectory::BezierGaitPlanner;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Foot planner driving a locomotion state.
#[derive(Debug, Clone)]
pub enum Generator {
    Bezier(BezierGaitPlanner),
    Phase(PhaseGaitPlanner),
}

impl Generator {
    fn for_mode(mode: GaitMode, config: &GaitConfig, stance: &StanceConfig) -> Self {
        match config.walk_generator {
            GeneratorKind::Phase => Self::Phase(PhaseGaitPlanner::new(config, stance)),
            GeneratorKind::Bezier if mode == GaitMode::Trot => {
                Self::Bezier(BezierGaitPlanner::trot(config))
            }
            GeneratorKind::Bezier => Self::Bezier(BezierGaitPlanner::walk(config)),
        }
    }

    pub const fn kind(&self) -> GeneratorKind {
        match self {
            Self::Bezier(_) => GeneratorKind::Bezier,
            Self::Phase(_) => GeneratorKind::Phase,
        }
    }

    fn step(
        &mut self,
        body: &mut BodyState,
        command: &GaitCommand,
        now: f64,
        dt: f64,
        stance: &StanceConfig,
    ) {
        match self {
            Self::Bezier(planner) => {
                let feet = planner.run_loop(now, command, &stance.neutral_feet());
                body.set_feet(feet);
            }
            Self::Phase(planner) => planner.step(body, command, dt),
        }
    }
}

// ---------------------------------------------------------------------------
// GaitState
// ---------------------------------------------------------------------------

/// Active gait state; each variant carries only its own data.
#[derive(Debug, Clone)]
pub enum GaitState {
    Idle,
    Stand,
    Walk(Generator),
    Trot(Generator),
}

impl GaitState {
    fn build(mode: GaitMode, config: &GaitConfig, stance: &StanceConfig) -> Self {
        match mode {
            GaitMode::Idle => Self::Idle,
            GaitMode::Stand => Self::Stand,
            GaitMode::Walk => Self::Walk(Generator::for_mode(mode, config, stance)),
            GaitMode::Trot => Self::Trot(Generator::for_mode(mode, config, stance)),
        }
    }

    pub const fn mode(&self) -> GaitMode {
        match self {
            Self::Idle => GaitMode::Idle,
            Self::Stand => GaitMode::Stand,
            Self::Walk(_) => GaitMode::Walk,
            Self::Trot(_) => GaitMode::Trot,
        }
    }

    pub const fn generator(&self) -> Option<&Generator> {
        match self {
            Self::Walk(g) | Self::Trot(g) => Some(g),
            Self::Idle | Self::Stand => None,
        }
    }

    fn begin(&mut self, body: &mut BodyState, stance: &StanceConfig) {
        info!("Starting {}", self.mode());
        match self {
            Self::Idle => {}
            Self::Stand | Self::Walk(_) | Self::Trot(_) => reset_to_neutral(body, stance),
        }
    }

    fn step(
        &mut self,
        body: &mut BodyState,
        command: &GaitCommand,
        now: f64,
        dt: f64,
        stance: &StanceConfig,
    ) {
        match self {
            Self::Idle | Self::Stand => {}
            Self::Walk(generator) | Self::Trot(generator) => {
                generator.step(body, command, now, dt, stance);
            }
        }
    }

    fn end(&mut self) {
        info!("Ending {}", self.mode());
    }
}

/// Feet on the rest corners, level body at the default stand height.
pub fn reset_to_neutral(body: &mut BodyState, stance: &StanceConfig) {
    *body = BodyState::new(stance.neutral_feet());
    body.ym = stance.stand_height;
}

// ---------------------------------------------------------------------------
// GaitStateMachine
// ---------------------------------------------------------------------------

/// Owner of the body state and the single active gait state.
#[derive(Debug, Clone)]
pub struct GaitStateMachine {
    state: GaitState,
    body: BodyState,
    command: GaitCommand,
    config: GaitConfig,
    stance: StanceConfig,
    elapsed: f64,
}

impl GaitStateMachine {
    /// Machine in `Idle` with the body at the neutral stance. `config` is
    /// not validated here.
    pub fn new(config: GaitConfig, stance: StanceConfig) -> Self {
        let mut body = BodyState::new(stance.neutral_feet());
        body.ym = stance.stand_height;
        Self {
            state: GaitState::Idle,
            body,
            command: GaitCommand::stationary(&config),
            config,
            stance,
            elapsed: 0.0,
        }
    }

    pub const fn mode(&self) -> GaitMode {
        self.state.mode()
    }

    pub const fn state(&self) -> &GaitState {
        &self.state
    }

    pub const fn body(&self) -> &BodyState {
        &self.body
    }

    pub const fn body_mut(&mut self) -> &mut BodyState {
        &mut self.body
    }

    pub const fn command(&self) -> &GaitCommand {
        &self.command
    }

    pub const fn set_command(&mut self, command: GaitCommand) {
        self.command = command;
    }

    /// Seconds of stepping accumulated so far; the clock seen by the
    /// continuous planner.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Switch to `mode`: `end` the current state, build the new one and
    /// `begin` it. No-op when `mode` is already active.
    pub fn transition(&mut self, mode: GaitMode) {
        if mode == self.mode() {
            return;
        }
        info!("Transition {} -> {}", self.mode(), mode);
        self.state.end();
        self.state = GaitState::build(mode, &self.config, &self.stance);
        self.state.begin(&mut self.body, &self.stance);
    }

    /// Apply an operator request: mode change, step command, and for the
    /// Stand state the commanded body attitude.
    pub fn handle(&mut self, operator: &OperatorCommand) {
        if let Some(mode) = operator.mode {
            self.transition(mode);
        }
        self.command = operator.to_gait_command(&self.config);
        if self.mode() == GaitMode::Stand {
            let [omega, phi, psi] = operator.attitude_degrees();
            self.body.set_rotation(omega, phi, psi);
        }
    }

    /// Advance the active state by one tick of `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.elapsed += dt;
        self.state.step(
            &mut self.body,
            &self.command,
            self.elapsed,
            dt,
            &self.stance,
        );
    }
}

impl Default for GaitStateMachine {
    fn default() -> Self {
        Self::new(GaitConfig::default(), StanceConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use spot_core::types::LegId;
    use spot_test_utils::neutral_body_state;

    fn displaced(machine: &mut GaitStateMachine) {
        let body = machine.body_mut();
        body.set_foot(LegId::FrontLeft, Vector3::new(0.3, -0.9, 0.8));
        body.set_rotation(5.0, 5.0, 5.0);
        body.xm = 0.2;
    }

    #[test]
    fn starts_idle_at_neutral() {
        let machine = GaitStateMachine::default();
        assert_eq!(machine.mode(), GaitMode::Idle);
        assert_eq!(machine.body(), &neutral_body_state());
        assert!(machine.state().generator().is_none());
    }

    #[test]
    fn walk_begin_resets_body() {
        let mut machine = GaitStateMachine::default();
        displaced(&mut machine);
        machine.transition(GaitMode::Walk);
        assert_eq!(machine.mode(), GaitMode::Walk);
        assert_eq!(machine.body(), &neutral_body_state());
    }

    #[test]
    fn stand_begin_resets_body() {
        let mut machine = GaitStateMachine::default();
        displaced(&mut machine);
        machine.transition(GaitMode::Stand);
        assert_eq!(machine.body(), &neutral_body_state());
    }

    #[test]
    fn idle_begin_keeps_body() {
        let mut machine = GaitStateMachine::default();
        machine.transition(GaitMode::Stand);
        displaced(&mut machine);
        let before = machine.body().clone();
        machine.transition(GaitMode::Idle);
        assert_eq!(machine.body(), &before);
    }

    #[test]
    fn same_mode_transition_is_noop() {
        let mut machine = GaitStateMachine::default();
        machine.transition(GaitMode::Trot);
        machine.set_command(GaitCommand::heading(&GaitConfig::default(), 1.0, 0.0));
        for _ in 0..5 {
            machine.step(0.02);
        }
        let feet = *machine.body().feet();
        machine.transition(GaitMode::Trot);
        assert_eq!(machine.body().feet(), &feet);
    }

    #[test]
    fn idle_and_stand_do_not_move_feet() {
        for mode in [GaitMode::Idle, GaitMode::Stand] {
            let mut machine = GaitStateMachine::default();
            machine.transition(mode);
            machine.set_command(GaitCommand::heading(&GaitConfig::default(), 1.0, 0.0));
            let feet = *machine.body().feet();
            for _ in 0..10 {
                machine.step(0.02);
            }
            assert_eq!(machine.body().feet(), &feet);
        }
    }

    #[test]
    fn walking_states_use_configured_offsets() {
        let mut machine = GaitStateMachine::default();
        machine.transition(GaitMode::Walk);
        let Some(Generator::Bezier(planner)) = machine.state().generator() else {
            panic!("walk should use the bezier planner");
        };
        assert_eq!(planner.offsets().0, [0.0, 0.0, 0.8, 0.8]);

        machine.transition(GaitMode::Trot);
        let Some(Generator::Bezier(planner)) = machine.state().generator() else {
            panic!("trot should use the bezier planner");
        };
        assert_eq!(planner.offsets().0, [0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn phase_generator_selectable() {
        let config = GaitConfig {
            walk_generator: GeneratorKind::Phase,
            ..GaitConfig::default()
        };
        let mut machine = GaitStateMachine::new(config, StanceConfig::default());
        machine.transition(GaitMode::Walk);
        let generator = machine.state().generator().map(Generator::kind);
        assert_eq!(generator, Some(GeneratorKind::Phase));

        machine.set_command(GaitCommand {
            step_x: 0.3,
            ..GaitCommand::default()
        });
        machine.step(0.02);
        let fl = machine.body().foot_position(LegId::FrontLeft);
        assert_relative_eq!(fl.x, 1.0 - 0.3 * 0.02 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn trot_moves_feet() {
        let mut machine = GaitStateMachine::default();
        machine.handle(
            &OperatorCommand::new()
                .with_mode(GaitMode::Trot)
                .with_velocity(1.0, 0.0, 0.0),
        );
        machine.step(0.02);
        let first = *machine.body().feet();
        for _ in 0..5 {
            machine.step(0.02);
        }
        assert_ne!(machine.body().feet(), &first);
        assert!(machine.body().feet().iter().all(|f| (f.w - 1.0).abs() < f64::EPSILON));
        assert_relative_eq!(machine.elapsed(), 0.12, epsilon = 1e-12);
    }

    #[test]
    fn handle_sets_stand_attitude() {
        let mut machine = GaitStateMachine::default();
        machine.handle(
            &OperatorCommand::new()
                .with_mode(GaitMode::Stand)
                .with_attitude(0.1, -0.05, 0.0),
        );
        assert_eq!(machine.mode(), GaitMode::Stand);
        assert_relative_eq!(machine.body().omega, 0.1_f64.to_degrees());
        assert_relative_eq!(machine.body().phi, (-0.05_f64).to_degrees());
    }

    #[test]
    fn handle_without_mode_keeps_state() {
        let mut machine = GaitStateMachine::default();
        machine.transition(GaitMode::Walk);
        machine.handle(&OperatorCommand::new().with_velocity(0.2, 0.0, 0.0));
        assert_eq!(machine.mode(), GaitMode::Walk);
        assert_relative_eq!(machine.command().step_velocity, 0.2);
    }
}
