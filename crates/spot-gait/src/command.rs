//! Operator input and the per-tick gait command derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use spot_core::config::GaitConfig;
use spot_core::error::GaitError;

// ---------------------------------------------------------------------------
// GaitMode
// ---------------------------------------------------------------------------

/// The four gait states the machine can be in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaitMode {
    #[default]
    Idle,
    Stand,
    Walk,
    Trot,
}

impl GaitMode {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Stand, Self::Walk, Self::Trot];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Stand => "Stand",
            Self::Walk => "Walk",
            Self::Trot => "Trot",
        }
    }

    /// True for the modes that move the feet.
    pub const fn is_locomotion(self) -> bool {
        matches!(self, Self::Walk | Self::Trot)
    }
}

impl fmt::Display for GaitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GaitMode {
    type Err = GaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "stand" => Ok(Self::Stand),
            "walk" => Ok(Self::Walk),
            "trot" => Ok(Self::Trot),
            _ => Err(GaitError::UnknownMode(s.into())),
        }
    }
}

// ---------------------------------------------------------------------------
// GaitCommand
// ---------------------------------------------------------------------------

/// Step parameters read by the planners each tick.
///
/// `step_x`/`step_z` drive the discrete planner (body-frame units per
/// second). `step_velocity`, `step_angle` (degrees), `yaw_rate` and
/// `step_period` drive the continuous planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitCommand {
    pub step_x: f64,
    pub step_z: f64,
    pub step_height: f64,
    pub step_angle: f64,
    pub step_velocity: f64,
    pub yaw_rate: f64,
    pub step_period: f64,
    pub direction: f64,
}

impl GaitCommand {
    /// Zero-velocity command with the configured step height and period.
    pub const fn stationary(config: &GaitConfig) -> Self {
        Self {
            step_x: 0.0,
            step_z: 0.0,
            step_height: config.default_step_height,
            step_angle: 0.0,
            step_velocity: 0.0,
            yaw_rate: 0.0,
            step_period: config.default_step_period,
            direction: 1.0,
        }
    }

    /// Straight-line command at `velocity` along `angle` degrees.
    pub const fn heading(config: &GaitConfig, velocity: f64, angle: f64) -> Self {
        Self {
            step_velocity: velocity,
            step_angle: angle,
            ..Self::stationary(config)
        }
    }

    pub const fn with_yaw_rate(mut self, yaw_rate: f64) -> Self {
        self.yaw_rate = yaw_rate;
        self
    }

    pub const fn with_step_period(mut self, step_period: f64) -> Self {
        self.step_period = step_period;
        self
    }

    /// True when neither planner would translate or turn the body.
    #[allow(clippy::float_cmp)]
    pub fn is_stationary(&self) -> bool {
        self.step_x == 0.0 && self.step_z == 0.0 && self.step_velocity == 0.0 && self.yaw_rate == 0.0
    }
}

impl Default for GaitCommand {
    fn default() -> Self {
        Self::stationary(&GaitConfig::default())
    }
}

// ---------------------------------------------------------------------------
// OperatorCommand
// ---------------------------------------------------------------------------

/// Raw operator request: body velocities, body attitude and an optional
/// mode change.
///
/// Attitude commands are roll (`phi_cmd`), pitch (`theta_cmd`) and yaw
/// (`psi_cmd`) in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorCommand {
    pub x_vel_cmd_mps: f64,
    pub y_vel_cmd_mps: f64,
    pub yaw_rate_cmd_rps: f64,
    pub phi_cmd: f64,
    pub theta_cmd: f64,
    pub psi_cmd: f64,
    pub mode: Option<GaitMode>,
}

impl OperatorCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `mode` on the next update.
    pub const fn with_mode(mut self, mode: GaitMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub const fn with_velocity(mut self, x_mps: f64, y_mps: f64, yaw_rps: f64) -> Self {
        self.x_vel_cmd_mps = x_mps;
        self.y_vel_cmd_mps = y_mps;
        self.yaw_rate_cmd_rps = yaw_rps;
        self
    }

    pub const fn with_attitude(mut self, phi: f64, theta: f64, psi: f64) -> Self {
        self.phi_cmd = phi;
        self.theta_cmd = theta;
        self.psi_cmd = psi;
        self
    }

    /// Zero every velocity and attitude command and clear the mode request.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Attitude as body-pose `[omega, phi, psi]` in degrees.
    pub fn attitude_degrees(&self) -> [f64; 3] {
        [
            self.phi_cmd.to_degrees(),
            self.theta_cmd.to_degrees(),
            self.psi_cmd.to_degrees(),
        ]
    }

    /// Step command for the planners.
    ///
    /// Forward velocity maps to the body X axis and lateral velocity to the
    /// body Z axis. The continuous planner gets the same motion as a speed
    /// plus heading.
    pub fn to_gait_command(&self, config: &GaitConfig) -> GaitCommand {
        let (vx, vy) = (self.x_vel_cmd_mps, self.y_vel_cmd_mps);
        GaitCommand {
            step_x: vx,
            step_z: vy,
            step_angle: vy.atan2(vx).to_degrees(),
            step_velocity: vx.hypot(vy),
            yaw_rate: self.yaw_rate_cmd_rps,
            ..GaitCommand::stationary(config)
        }
    }
}
