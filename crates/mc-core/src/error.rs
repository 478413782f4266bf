use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors from constructing core values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Lower bound {lower} is above upper bound {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("No {what} at index {index} (have {len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}
