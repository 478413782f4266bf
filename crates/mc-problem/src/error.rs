//! Error types for problem declarations.

use mc_core::CoreError;
use mc_model::ModelError;
use thiserror::Error;

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Errors raised while declaring a problem or binding its parts to a model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    #[error("{owner}: reference to nonexistent state '{name}'")]
    UnknownState { owner: String, name: String },

    #[error("{owner}: reference to nonexistent control '{name}'")]
    UnknownControl { owner: String, name: String },

    #[error("{owner}: reference to nonexistent coordinate '{path}'")]
    UnknownCoordinate { owner: String, path: String },

    #[error("{owner}: reference to nonexistent component '{path}'")]
    UnknownComponent { owner: String, path: String },

    #[error("{owner}: {reason}")]
    Property { owner: String, reason: String },

    #[error("{owner}: invalid configuration: {what}")]
    Configuration { owner: String, what: String },

    #[error("Unknown {category} type '{name}'")]
    UnknownType { category: &'static str, name: String },

    #[error("Duplicate {what} name '{name}'")]
    DuplicateName { what: &'static str, name: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
