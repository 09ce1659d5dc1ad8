use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GaitError};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_control_dt() -> f64 {
    0.02
}
const fn default_total_phase_ticks() -> u32 {
    60
}
const fn default_num_phases() -> usize {
    4
}
fn default_contact_phases() -> Vec<Vec<u8>> {
    vec![
        vec![1, 0, 1, 1],
        vec![1, 1, 1, 0],
        vec![1, 1, 1, 0],
        vec![1, 0, 1, 1],
    ]
}
const fn default_stance_drift_divisor() -> f64 {
    3.0
}
const fn default_recenter_rate() -> f64 {
    8.0
}
const fn default_trot_offsets() -> [f64; 4] {
    [0.0, 0.5, 0.5, 0.0]
}
const fn default_walk_offsets() -> [f64; 4] {
    [0.0, 0.0, 0.8, 0.8]
}
const fn default_step_offset() -> f64 {
    0.5
}
const fn default_min_step_period() -> f64 {
    0.01
}
const fn default_rewind_threshold() -> f64 {
    0.99
}
const fn default_stance_half_length() -> f64 {
    0.05
}
const fn default_stance_depth() -> f64 {
    0.001
}
const fn default_step_height() -> f64 {
    0.4
}
const fn default_step_period() -> f64 {
    0.5
}
const fn default_one() -> f64 {
    1.0
}
const fn default_foot_height() -> f64 {
    -1.0
}
const fn default_stand_height() -> f64 {
    0.7
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// LegGeometry
// ---------------------------------------------------------------------------

/// Link lengths and body dimensions, in units of 100 mm.
///
/// `l1` is the hip-yaw offset, `l2` the hip-roll offset, `l3` the thigh and
/// `l4` the shank. `length`/`width` are the full distances between the leg
/// mounts along X and Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegGeometry {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
    pub length: f64,
    pub width: f64,
}

impl Default for LegGeometry {
    fn default() -> Self {
        Self {
            l1: 60.5 / 100.0,
            l2: 10.0 / 100.0,
            l3: 100.7 / 100.0,
            l4: 118.5 / 100.0,
            length: 207.5 / 100.0,
            width: 78.0 / 100.0,
        }
    }
}

impl LegGeometry {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("geometry.l1", self.l1),
            ("geometry.l2", self.l2),
            ("geometry.l3", self.l3),
            ("geometry.l4", self.l4),
            ("geometry.length", self.length),
            ("geometry.width", self.width),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be finite and >= 0"));
            }
        }
        if self.l3 <= 0.0 || self.l4 <= 0.0 {
            return Err(invalid("geometry.l3/l4", "thigh and shank must be > 0"));
        }
        Ok(())
    }

    /// Longest hip-to-foot distance the knee chain can reach.
    pub fn max_reach(&self) -> f64 {
        self.l3 + self.l4
    }
}

// ---------------------------------------------------------------------------
// StanceConfig
// ---------------------------------------------------------------------------

/// Rest pose: where the feet sit when the robot stands still.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StanceConfig {
    /// Foot X offset from the body centre (front positive).
    #[serde(default = "default_one")]
    pub half_length: f64,
    /// Foot Z offset from the body centre (left positive).
    #[serde(default = "default_one")]
    pub half_width: f64,
    /// Foot Y in the body frame (negative is below the body).
    #[serde(default = "default_foot_height")]
    pub foot_height: f64,
    /// Body `ym` translation applied when a gait state begins.
    #[serde(default = "default_stand_height")]
    pub stand_height: f64,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            half_length: default_one(),
            half_width: default_one(),
            foot_height: default_foot_height(),
            stand_height: default_stand_height(),
        }
    }
}

impl StanceConfig {
    /// Feet at the four rest corners, in leg order.
    pub fn neutral_feet(&self) -> [Vector3<f64>; 4] {
        let (x, y, z) = (self.half_length, self.foot_height, self.half_width);
        [
            Vector3::new(x, y, z),
            Vector3::new(x, y, -z),
            Vector3::new(-x, y, z),
            Vector3::new(-x, y, -z),
        ]
    }
}

// ---------------------------------------------------------------------------
// GeneratorKind
// ---------------------------------------------------------------------------

/// Which trajectory model drives the walking states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Continuous Bezier swing planner (time-driven).
    #[default]
    Bezier,
    /// Discrete tick-counted stance/swing planner.
    Phase,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bezier => f.write_str("bezier"),
            Self::Phase => f.write_str("phase"),
        }
    }
}

impl FromStr for GeneratorKind {
    type Err = GaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bezier" => Ok(Self::Bezier),
            "phase" => Ok(Self::Phase),
            _ => Err(GaitError::UnknownGenerator(s.into())),
        }
    }
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Timing tables and trajectory constants for both planners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Ticks in one full discrete gait cycle.
    #[serde(default = "default_total_phase_ticks")]
    pub total_phase_ticks: u32,
    /// Number of equal sub-phases in the discrete cycle.
    #[serde(default = "default_num_phases")]
    pub num_phases: usize,
    /// `contact_phases[leg][phase]`: 1 = stance, 0 = swing.
    #[serde(default = "default_contact_phases")]
    pub contact_phases: Vec<Vec<u8>>,
    /// Stance legs drift by `step * dt / stance_drift_divisor`.
    #[serde(default = "default_stance_drift_divisor")]
    pub stance_drift_divisor: f64,
    /// Swing legs with no command on an axis relax to rest at `dt * rate`.
    #[serde(default = "default_recenter_rate")]
    pub recenter_rate: f64,
    /// Continuous-model phase offsets for the trot state.
    #[serde(default = "default_trot_offsets")]
    pub trot_offsets: [f64; 4],
    /// Continuous-model phase offsets for the walk state.
    #[serde(default = "default_walk_offsets")]
    pub walk_offsets: [f64; 4],
    /// Fraction of each continuous cycle spent in stance.
    #[serde(default = "default_step_offset")]
    pub step_offset: f64,
    /// Floor applied to the commanded step period (seconds).
    #[serde(default = "default_min_step_period")]
    pub min_step_period: f64,
    /// Phase at or above which the next call re-anchors the epoch.
    #[serde(default = "default_rewind_threshold")]
    pub rewind_threshold: f64,
    /// Half stride of the stance sweep.
    #[serde(default = "default_stance_half_length")]
    pub stance_half_length: f64,
    /// Amplitude of the stance vertical dip.
    #[serde(default = "default_stance_depth")]
    pub stance_depth: f64,
    #[serde(default = "default_step_height")]
    pub default_step_height: f64,
    #[serde(default = "default_step_period")]
    pub default_step_period: f64,
    #[serde(default)]
    pub walk_generator: GeneratorKind,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            total_phase_ticks: default_total_phase_ticks(),
            num_phases: default_num_phases(),
            contact_phases: default_contact_phases(),
            stance_drift_divisor: default_stance_drift_divisor(),
            recenter_rate: default_recenter_rate(),
            trot_offsets: default_trot_offsets(),
            walk_offsets: default_walk_offsets(),
            step_offset: default_step_offset(),
            min_step_period: default_min_step_period(),
            rewind_threshold: default_rewind_threshold(),
            stance_half_length: default_stance_half_length(),
            stance_depth: default_stance_depth(),
            default_step_height: default_step_height(),
            default_step_period: default_step_period(),
            walk_generator: GeneratorKind::default(),
        }
    }
}

impl GaitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_phases == 0 {
            return Err(invalid("gait.num_phases", "must be > 0"));
        }
        if self.total_phase_ticks == 0 || self.total_phase_ticks as usize % self.num_phases != 0 {
            return Err(invalid(
                "gait.total_phase_ticks",
                "must be a positive multiple of num_phases",
            ));
        }
        if self.contact_phases.len() != 4 {
            return Err(ConfigError::ContactTableRows {
                got: self.contact_phases.len(),
            });
        }
        for (leg, row) in self.contact_phases.iter().enumerate() {
            if row.len() != self.num_phases {
                return Err(ConfigError::ContactTableColumns {
                    leg,
                    expected: self.num_phases,
                    got: row.len(),
                });
            }
        }
        if !(self.step_offset > 0.0 && self.step_offset < 1.0) {
            return Err(invalid("gait.step_offset", "must be in (0, 1)"));
        }
        if self.min_step_period <= 0.0 {
            return Err(invalid("gait.min_step_period", "must be > 0"));
        }
        if self.stance_drift_divisor == 0.0 {
            return Err(invalid("gait.stance_drift_divisor", "must be non-zero"));
        }
        if self.stance_half_length <= 0.0 {
            return Err(invalid("gait.stance_half_length", "must be > 0"));
        }
        if !self.stance_depth.is_finite() {
            return Err(invalid("gait.stance_depth", "must be finite"));
        }
        if !(self.rewind_threshold > 0.0 && self.rewind_threshold <= 1.0) {
            return Err(invalid("gait.rewind_threshold", "must be in (0, 1]"));
        }
        if !self.trot_offsets.iter().all(|o| o.is_finite()) {
            return Err(invalid("gait.trot_offsets", "must be finite"));
        }
        if !self.walk_offsets.iter().all(|o| o.is_finite()) {
            return Err(invalid("gait.walk_offsets", "must be finite"));
        }
        Ok(())
    }

    /// Ticks per discrete sub-phase, at least 1 even for an unvalidated
    /// config.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn phase_length(&self) -> u32 {
        match self.total_phase_ticks.checked_div(self.num_phases as u32) {
            Some(len) if len > 0 => len,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// RobotConfig
// ---------------------------------------------------------------------------

/// Everything needed to construct the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub geometry: LegGeometry,
    #[serde(default)]
    pub stance: StanceConfig,
    #[serde(default)]
    pub gait: GaitConfig,
    /// Control tick in seconds (default: 0.02 = 50 Hz).
    #[serde(default = "default_control_dt")]
    pub control_dt: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            geometry: LegGeometry::default(),
            stance: StanceConfig::default(),
            gait: GaitConfig::default(),
            control_dt: default_control_dt(),
        }
    }
}

impl RobotConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        self.gait.validate()?;
        if self.control_dt <= 0.0 {
            return Err(invalid("control_dt", "must be > 0"));
        }
        Ok(())
    }

    /// Control rate in Hz.
    pub fn control_hz(&self) -> f64 {
        1.0 / self.control_dt
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
