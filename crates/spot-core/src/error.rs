use thiserror::Error;

/// Top-level error type for the spot crates.
#[derive(Debug, Error)]
pub enum SpotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Gait error: {0}")]
    Gait(#[from] GaitError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Contact table has {got} rows, expected one per leg (4)")]
    ContactTableRows { got: usize },

    #[error("Contact table row {leg} has {got} entries, expected {expected}")]
    ContactTableColumns {
        leg: usize,
        expected: usize,
        got: usize,
    },
}

/// Structural errors raised by the matrix algebra behind the kinematics.
///
/// These are integration errors, never recoverable inside a tick. Copy +
/// plain data so they are cheap to propagate from the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Dimension mismatch: left operand has {left} columns, right operand has {right} rows")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Singular matrix: determinant {determinant:e}")]
    SingularMatrix { determinant: f64 },
}

/// Gait selection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaitError {
    #[error("Unknown gait mode: {0} (expected idle, stand, walk or trot)")]
    UnknownMode(String),

    #[error("Unknown trajectory generator: {0} (expected bezier or phase)")]
    UnknownGenerator(String),
}
