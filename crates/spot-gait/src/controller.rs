//! Per-tick motion controller: gait step followed by whole-body IK.
//!
//! A structural kinematics failure never reaches the actuators as garbage:
//! the controller logs it and repeats the last solution that succeeded.

use log::{debug, warn};

use spot_core::config::RobotConfig;
use spot_core::error::{ConfigError, KinematicsError};
use spot_core::time::Clock;
use spot_core::types::JointAngles;
use spot_ik::BodyKinematics;

use crate::command::{GaitMode, OperatorCommand};
use crate::state::GaitStateMachine;

/// Gait state machine plus body kinematics, driven once per control tick.
#[derive(Debug, Clone)]
pub struct MotionController {
    machine: GaitStateMachine,
    kinematics: BodyKinematics,
    control_dt: f64,
    last_tick: Option<f64>,
    last_good: Option<JointAngles>,
    holds: u64,
}

impl MotionController {
    /// Build without validation; [`Self::from_config`] is the checked
    /// constructor.
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            machine: GaitStateMachine::new(config.gait.clone(), config.stance),
            kinematics: BodyKinematics::new(config.geometry),
            control_dt: config.control_dt,
            last_tick: None,
            last_good: None,
            holds: 0,
        }
    }

    /// Validate `config` before building the controller.
    pub fn from_config(config: &RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub const fn machine(&self) -> &GaitStateMachine {
        &self.machine
    }

    pub const fn machine_mut(&mut self) -> &mut GaitStateMachine {
        &mut self.machine
    }

    pub const fn kinematics(&self) -> &BodyKinematics {
        &self.kinematics
    }

    pub const fn mode(&self) -> GaitMode {
        self.machine.mode()
    }

    /// Last joint solution that succeeded.
    pub const fn last_good(&self) -> Option<&JointAngles> {
        self.last_good.as_ref()
    }

    /// Ticks that fell back to the held solution.
    pub const fn holds(&self) -> u64 {
        self.holds
    }

    pub fn handle(&mut self, operator: &OperatorCommand) {
        self.machine.handle(operator);
    }

    /// One control tick at time `now` (seconds).
    ///
    /// The step length is the time since the previous tick; the very first
    /// tick uses the configured control period.
    ///
    /// # Errors
    ///
    /// A structural kinematics error when no earlier tick has succeeded;
    /// otherwise the error is logged and the held solution returned.
    pub fn tick(&mut self, now: f64) -> Result<JointAngles, KinematicsError> {
        let dt = match self.last_tick {
            Some(prev) if now > prev => now - prev,
            _ => self.control_dt,
        };
        self.last_tick = Some(now);

        self.machine.step(dt);

        match self.kinematics.calc_ik(self.machine.body()) {
            Ok(angles) => {
                self.last_good = Some(angles);
                Ok(angles)
            }
            Err(err) => match self.last_good {
                Some(held) => {
                    self.holds += 1;
                    warn!("IK failed ({err}); holding last solution");
                    Ok(held)
                }
                None => {
                    debug!("IK failed before any solution was available");
                    Err(err)
                }
            },
        }
    }

    /// [`Self::tick`] at `clock`'s current time.
    pub fn tick_with(&mut self, clock: &impl Clock) -> Result<JointAngles, KinematicsError> {
        self.tick(clock.now_secs())
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(&RobotConfig::default())
    }
}
