//! Shared test fixtures and utilities for spot crates.
//!
//! Provides deterministic RNG setup and geometric fixtures (neutral stance,
//! random transforms, reachable leg configurations).

pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    neutral_body_state, random_invertible, random_leg_angles, random_rigid_transform,
};
pub use rng::{deterministic_vec, seeded_rng};
