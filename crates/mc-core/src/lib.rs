//! mc-core: shared foundation of the muscollo workspace.
//!
//! - bounds: intervals on variables and constraint equations, plus the
//!   initial and final sub-bounds
//! - numeric: `Real`, tolerant comparison, linspace and trapezoid
//! - ids: compact indices into the model's component sets
//! - config: `MC_PARALLEL` parsing
//! - timing: opt-in step timers (`MC_TIMING`)

pub mod bounds;
pub mod config;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

pub use bounds::{Bounds, FinalBounds, InitialBounds};
pub use config::Parallelism;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
