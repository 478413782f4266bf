//! mc-problem: what the user declares about an optimal-control problem.
//!
//! A [`Problem`] pairs a model with state and control bounds, goals, path
//! constraints and design parameters. Nothing here is resolved against the
//! model until the declarations are bound:
//!
//! - [`Goal::bind`] gives a [`BoundGoal`] with a fixed output count
//! - [`PathConstraint::bind`] gives a [`BoundPathConstraint`]; its
//!   `finalize(first_index)` assigns the global equation block
//! - [`Parameter::bind`] gives a [`BoundParameter`] that can write values
//!   into the model
//!
//! The [`Registry`] maps type names used in problem files to goal and
//! path-constraint kinds.

pub mod error;
pub mod eval;
pub mod goal;
pub mod info;
pub mod parameter;
pub mod path;
pub mod problem;
pub mod registry;

pub use error::{ProblemError, ProblemResult};
pub use eval::{GoalInput, Point};
pub use goal::{BoundGoal, Goal, GoalKind, GoalMode, StateTarget};
pub use info::{ConstraintInfo, VariableInfo};
pub use parameter::{BoundParameter, Parameter};
pub use path::{BoundPathConstraint, FinalizedPathConstraint, PathConstraint, PathConstraintKind};
pub use problem::{DEFAULT_MULTIPLIER_LIMIT, DEFAULT_SPEED_LIMIT, Phase, Problem};
pub use registry::{ComponentArgs, GoalFactory, PathConstraintFactory, Registry};
