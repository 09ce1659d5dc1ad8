//! Gait generation for the spot quadruped.
//!
//! # Architecture
//!
//! ```text
//! OperatorCommand ──► GaitStateMachine ──► planner ──► BodyState.feet ──► BodyKinematics ──► JointAngles
//! ```
//!
//! Two planners are available to the walking states: the time-driven
//! [`BezierGaitPlanner`] (stance sweep plus degree-11 Bezier swing) and the
//! tick-counted [`PhaseGaitPlanner`] with a fixed contact table.
//! [`MotionController`] runs one state-machine step and one IK solve per
//! control tick.

pub mod bezier;
pub mod command;
pub mod controller;
pub mod phase;
pub mod state;
pub mod trajectory;

pub use bezier::BinomialCache;
pub use command::{GaitCommand, GaitMode, OperatorCommand};
pub use controller::MotionController;
pub use phase::PhaseGaitPlanner;
pub use state::{GaitState, GaitStateMachine, Generator};
pub use trajectory::{BezierGaitPlanner, PhaseOffsets};
