//! spot-core: types, config, clocks and errors shared by the spot quadruped
//! controller crates.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{GaitConfig, GeneratorKind, LegGeometry, RobotConfig, StanceConfig};
    pub use crate::error::{ConfigError, GaitError, KinematicsError, SpotError};
    pub use crate::time::{Clock, ManualClock, MonotonicClock};
    pub use crate::types::{BodyState, JointAngles, LegAngles, LegId};
}
