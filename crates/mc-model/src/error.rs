//! Model-specific error types.

use mc_core::CoreError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Model construction, lookup and editing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Two components in the same set share a name.
    #[error("Duplicate {set} name '{name}'")]
    DuplicateName { set: &'static str, name: String },

    /// A component refers to another component that doesn't exist.
    #[error("{owner} refers to non-existent {what} {index}")]
    DanglingReference {
        owner: String,
        what: &'static str,
        index: u32,
    },

    /// A joint was given the wrong number of coordinates for its kind.
    #[error("Joint '{joint}' has {count} coordinates (expected {expected})")]
    CoordinateCount {
        joint: String,
        count: usize,
        expected: usize,
    },

    /// No component lives at the given path.
    #[error("No component at path '{path}'")]
    UnknownComponent { path: String },

    /// The component exists but has no property with this name.
    #[error("Component '{path}' has no property '{property}'")]
    UnknownProperty { path: String, property: String },

    /// A property was read or written with the wrong shape.
    #[error("Property '{property}' of '{path}' is {actual}, not {expected}")]
    PropertyKind {
        path: String,
        property: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid value for {what}: {reason}")]
    InvalidValue { what: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
