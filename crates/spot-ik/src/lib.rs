//! Analytic kinematics for a 12-DOF quadruped.
//!
//! ```text
//! BodyState ──► BodyKinematics::body_ik ──► inverse mount ──► LegKinematics::leg_ik ──► JointAngles
//! ```
//!
//! [`linalg`] holds the general square-matrix algebra the body solver uses
//! to invert leg transforms; [`leg`] solves one leg in its mount frame.

pub mod body;
pub mod leg;
pub mod linalg;

pub use body::{BodyKinematics, pose_matrix};
pub use leg::LegKinematics;
