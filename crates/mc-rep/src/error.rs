//! Error types for problem reconciliation.

use mc_problem::ProblemError;
use thiserror::Error;

pub type RepResult<T> = Result<T, RepError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepError {
    #[error("State info provided for nonexistent state variable '{name}'")]
    NonexistentState { name: String },

    #[error("Control info provided for nonexistent actuator '{name}'")]
    NonexistentControl { name: String },

    #[error("Failed to bind to model: {0}")]
    Bind(#[from] ProblemError),

    #[error("Duplicate {what} name '{name}'")]
    DuplicateName { what: &'static str, name: String },

    #[error("Expected {expected} parameter values, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("No {what} with name '{name}' found")]
    NotFound { what: &'static str, name: String },

    #[error("Trajectory does not match the model: {what}")]
    TrajectoryMismatch { what: String },

    #[error("Problem has no phases")]
    NoPhase,
}
