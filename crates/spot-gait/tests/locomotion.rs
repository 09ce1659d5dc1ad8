//! End-to-end locomotion: operator command through the state machine, the
//! planners and whole-body IK.

use approx::assert_relative_eq;

use spot_core::config::{GaitConfig, GeneratorKind, RobotConfig, StanceConfig};
use spot_core::time::{Clock, ManualClock};
use spot_core::types::LegId;
use spot_gait::{BezierGaitPlanner, GaitCommand, GaitMode, MotionController, OperatorCommand};
use spot_ik::BodyKinematics;
use spot_test_utils::neutral_body_state;

#[test]
fn bezier_cycle_returns_to_start() {
    let config = GaitConfig::default();
    let frames = StanceConfig::default().neutral_feet();
    let command = GaitCommand::heading(&config, 0.05, 0.0).with_step_period(0.5);
    let mut planner = BezierGaitPlanner::trot(&config);
    let mut clock = ManualClock::new();

    let start = planner.run_loop(clock.now_secs(), &command, &frames);
    // 0.5 s period at 50 Hz: phase reaches 1.0 on call 25, re-anchors on 26.
    let mut last = start;
    for _ in 0..26 {
        clock.advance_secs(0.02);
        last = planner.run_loop(clock.now_secs(), &command, &frames);
    }

    assert_eq!(planner.cycles(), 1);
    assert_relative_eq!(planner.phi(), 0.0);
    for (a, b) in start.iter().zip(&last) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn bezier_feet_stay_close_to_neutral() {
    let config = GaitConfig::default();
    let frames = StanceConfig::default().neutral_feet();
    let command = GaitCommand::heading(&config, 0.5, 30.0).with_yaw_rate(0.3);
    let mut planner = BezierGaitPlanner::walk(&config);
    let mut clock = ManualClock::new();

    for _ in 0..200 {
        let feet = planner.run_loop(clock.now_secs(), &command, &frames);
        for (foot, rest) in feet.iter().zip(&frames) {
            assert!((foot.xyz() - rest).norm() < 0.1);
            assert_relative_eq!(foot.w, 1.0);
        }
        clock.advance_secs(0.02);
    }
    assert!(planner.cycles() >= 7);
}

#[test]
fn trot_produces_finite_joint_angles_every_tick() {
    let mut controller = MotionController::default();
    controller.handle(
        &OperatorCommand::new()
            .with_mode(GaitMode::Trot)
            .with_velocity(0.8, 0.2, 0.4),
    );
    let mut clock = ManualClock::new();
    for _ in 0..150 {
        let angles = controller.tick_with(&clock).unwrap();
        assert!(angles.is_finite());
        clock.advance_secs(0.02);
    }
    assert_eq!(controller.holds(), 0);
}

#[test]
fn walk_joint_angles_reproduce_planned_feet() {
    let mut controller = MotionController::default();
    controller.handle(
        &OperatorCommand::new()
            .with_mode(GaitMode::Walk)
            .with_velocity(0.5, 0.0, 0.0),
    );
    let mut clock = ManualClock::new();
    for _ in 0..40 {
        let angles = controller.tick_with(&clock).unwrap();
        let body = controller.machine().body();
        let feet = controller.kinematics().calc_fk(body, &angles);
        for leg in LegId::ALL {
            assert_relative_eq!(feet[leg.index()], body.foot_position(leg), epsilon = 1e-9);
        }
        clock.advance_secs(0.02);
    }
}

#[test]
fn phase_generator_walks_through_contact_schedule() {
    let config = RobotConfig {
        gait: GaitConfig {
            walk_generator: GeneratorKind::Phase,
            ..GaitConfig::default()
        },
        ..RobotConfig::default()
    };
    let mut controller = MotionController::from_config(&config).unwrap();
    controller.handle(
        &OperatorCommand::new()
            .with_mode(GaitMode::Walk)
            .with_velocity(0.3, 0.0, 0.0),
    );

    let mut max_lift: f64 = 0.0;
    let mut t = 0.0;
    for _ in 0..60 {
        let angles = controller.tick(t).unwrap();
        assert!(angles.is_finite());
        let fl = controller.machine().body().foot_position(LegId::FrontLeft);
        max_lift = max_lift.max(fl.y - config.stance.foot_height);
        t += config.control_dt;
    }
    // Front-left swings during sub-phase 1.
    assert!(max_lift > 0.9 * config.gait.default_step_height);
}

#[test]
fn switching_gaits_restores_neutral_pose() {
    let mut controller = MotionController::default();
    controller.handle(
        &OperatorCommand::new()
            .with_mode(GaitMode::Trot)
            .with_velocity(1.0, 0.0, 0.0),
    );
    for i in 0..20 {
        controller.tick(f64::from(i) * 0.02).unwrap();
    }
    controller.handle(&OperatorCommand::new().with_mode(GaitMode::Stand));
    assert_eq!(controller.mode(), GaitMode::Stand);
    assert_eq!(controller.machine().body(), &neutral_body_state());

    let stand = controller.tick(0.5).unwrap();
    let neutral = BodyKinematics::default()
        .calc_ik(&neutral_body_state())
        .unwrap();
    assert_eq!(stand, neutral);
}
