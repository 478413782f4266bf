//! Inputs handed to bound goals and path constraints.
//!
//! Slices are in model order: `states` follows
//! `Model::state_variable_names`, `controls` follows `Model::control_names`.

use mc_core::Real;

/// States and controls at a single time point.
#[derive(Debug, Clone, Copy)]
pub struct Point<'a> {
    pub time: Real,
    pub states: &'a [Real],
    pub controls: &'a [Real],
}

/// Everything an endpoint evaluation sees: both endpoints and the
/// integral of the goal's integrand over the phase.
#[derive(Debug, Clone, Copy)]
pub struct GoalInput<'a> {
    pub initial: Point<'a>,
    pub final_: Point<'a>,
    pub integral: Real,
}
