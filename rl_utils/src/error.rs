//! Error types for the utility routines.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for utility operations.
pub type Result<T> = std::result::Result<T, UtilsError>;

/// Errors raised by argument validation and checkpoint IO.
///
/// Every routine validates its inputs up front and returns immediately;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum UtilsError {
    /// Argument outside its admissible range (tau, damping, period, ...).
    #[error("invalid argument '{param}': {message}")]
    InvalidArgument { param: &'static str, message: String },

    /// Paired tensors whose shapes cannot be combined.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// An action index outside `[0, num_actions)`.
    #[error("action {action} out of range for action dimension {dim} with {num_actions} actions")]
    ActionOutOfRange {
        action: i64,
        dim: usize,
        num_actions: usize,
    },

    /// Distribution and action tuples that do not line up.
    #[error("structure mismatch: {0}")]
    StructureMismatch(String),

    /// Filesystem error while saving or loading checkpoints.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Burn recorder failure.
    #[error("recorder error: {0}")]
    Recorder(String),

    /// Corrupt or unreadable checkpoint state file.
    #[error("checkpoint state error at {path:?}: {message}")]
    State { path: PathBuf, message: String },

    /// No checkpoint available in the directory.
    #[error("no checkpoints found in {0:?}")]
    NoCheckpoints(PathBuf),

    /// Tensor data could not be read back from the backend.
    #[error("tensor data error: {0}")]
    Data(String),
}

impl UtilsError {
    pub(crate) fn invalid(param: &'static str, message: impl Into<String>) -> Self {
        UtilsError::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    pub(crate) fn shape(what: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        UtilsError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Check that a probability-like coefficient lies in `[0, 1]`.
pub(crate) fn check_unit_interval(param: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(UtilsError::invalid(
            param,
            format!("should be in [0, 1], got {}", value),
        ));
    }
    Ok(())
}
