//! The user-authored optimal-control problem.

use mc_core::{Bounds, FinalBounds, InitialBounds};
use mc_model::Model;

use crate::goal::Goal;
use crate::info::VariableInfo;
use crate::parameter::Parameter;
use crate::path::PathConstraint;

pub const DEFAULT_SPEED_LIMIT: f64 = 50.0;
pub const DEFAULT_MULTIPLIER_LIMIT: f64 = 1000.0;

/// One phase of a problem: a model plus everything declared on it.
///
/// Names of state and control infos are unique; setting an info whose name
/// already exists replaces the old declaration in place.
#[derive(Debug, Clone)]
pub struct Phase {
    pub model: Model,
    pub time_initial_bounds: InitialBounds,
    pub time_final_bounds: FinalBounds,
    pub state_infos: Vec<VariableInfo>,
    pub control_infos: Vec<VariableInfo>,
    pub goals: Vec<Goal>,
    pub path_constraints: Vec<PathConstraint>,
    pub parameters: Vec<Parameter>,
    /// Bounds for speed states without a declaration.
    pub default_speed_bounds: Bounds,
    /// Applied to every scalar multibody constraint equation.
    pub multibody_constraint_bounds: Bounds,
    /// Applied to every Lagrange multiplier, including its endpoint bounds.
    pub multiplier_bounds: Bounds,
}

impl Phase {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            time_initial_bounds: InitialBounds(Bounds::zero()),
            time_final_bounds: FinalBounds(Bounds::unbounded()),
            state_infos: Vec::new(),
            control_infos: Vec::new(),
            goals: Vec::new(),
            path_constraints: Vec::new(),
            parameters: Vec::new(),
            default_speed_bounds: symmetric(DEFAULT_SPEED_LIMIT),
            multibody_constraint_bounds: Bounds::zero(),
            multiplier_bounds: symmetric(DEFAULT_MULTIPLIER_LIMIT),
        }
    }

    pub fn set_time_bounds(&mut self, initial: InitialBounds, final_: FinalBounds) -> &mut Self {
        self.time_initial_bounds = initial;
        self.time_final_bounds = final_;
        self
    }

    pub fn set_state_info(
        &mut self,
        name: impl Into<String>,
        bounds: Bounds,
        initial: Option<InitialBounds>,
        final_: Option<FinalBounds>,
    ) -> &mut Self {
        upsert(
            &mut self.state_infos,
            VariableInfo::new(name, bounds, initial, final_),
        );
        self
    }

    pub fn set_control_info(
        &mut self,
        name: impl Into<String>,
        bounds: Bounds,
        initial: Option<InitialBounds>,
        final_: Option<FinalBounds>,
    ) -> &mut Self {
        upsert(
            &mut self.control_infos,
            VariableInfo::new(name, bounds, initial, final_),
        );
        self
    }

    pub fn add_goal(&mut self, goal: Goal) -> &mut Self {
        self.goals.push(goal);
        self
    }

    pub fn add_path_constraint(&mut self, constraint: PathConstraint) -> &mut Self {
        self.path_constraints.push(constraint);
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    pub fn set_default_speed_bounds(&mut self, bounds: Bounds) -> &mut Self {
        self.default_speed_bounds = bounds;
        self
    }

    pub fn set_multibody_constraint_bounds(&mut self, bounds: Bounds) -> &mut Self {
        self.multibody_constraint_bounds = bounds;
        self
    }

    pub fn set_multiplier_bounds(&mut self, bounds: Bounds) -> &mut Self {
        self.multiplier_bounds = bounds;
        self
    }
}

fn symmetric(limit: f64) -> Bounds {
    Bounds::new(-limit, limit).unwrap_or_default()
}

fn upsert(infos: &mut Vec<VariableInfo>, info: VariableInfo) {
    match infos.iter_mut().find(|i| i.name() == info.name()) {
        Some(existing) => *existing = info,
        None => infos.push(info),
    }
}

/// A named problem. Only the first phase is used.
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    pub phases: Vec<Phase>,
}

impl Problem {
    /// A problem with a single phase on `model`.
    pub fn new(name: impl Into<String>, model: Model) -> Self {
        Self {
            name: name.into(),
            phases: vec![Phase::new(model)],
        }
    }

    pub fn phase(&self) -> Option<&Phase> {
        self.phases.first()
    }

    pub fn phase_mut(&mut self) -> Option<&mut Phase> {
        self.phases.first_mut()
    }
}
