//! Environment-driven settings.
//!
//! `MC_PARALLEL` selects how many worker threads evaluate trajectory points:
//! `0` forces serial evaluation, `n > 0` requests `n` threads. Unset, negative
//! or unparsable values leave the choice to the caller.

use tracing::warn;

pub const PARALLEL_ENV_VAR: &str = "MC_PARALLEL";

/// Requested degree of parallelism.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// No preference was expressed.
    #[default]
    Unset,
    Serial,
    Threads(usize),
}

impl Parallelism {
    /// Read [`PARALLEL_ENV_VAR`] from the process environment.
    pub fn from_env() -> Self {
        match std::env::var(PARALLEL_ENV_VAR) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Parallelism::Unset,
        }
    }

    /// Parse a raw setting. Invalid input is ignored with a warning.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(0) => Parallelism::Serial,
            Ok(n) if n > 0 => Parallelism::Threads(n as usize),
            _ => {
                warn!(
                    value = raw,
                    "{PARALLEL_ENV_VAR} must be an integer >= 0; ignoring"
                );
                Parallelism::Unset
            }
        }
    }

    pub fn is_serial(self) -> bool {
        matches!(self, Parallelism::Serial)
    }
}
