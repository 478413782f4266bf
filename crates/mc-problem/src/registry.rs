//! Explicit registry of goal and path-constraint types.
//!
//! File loaders name component types by string. A [`Registry`] maps each
//! name to a factory that turns loosely typed [`ComponentArgs`] into a
//! concrete kind. Build one at startup and pass it to whatever needs it.

use std::collections::BTreeMap;

use mc_core::{Bounds, Real};
use mc_table::TimeSeriesTable;

use crate::error::{ProblemError, ProblemResult};
use crate::goal::{GoalKind, StateTarget};
use crate::path::PathConstraintKind;

/// Arguments a file may supply for any component type. Each factory reads
/// the fields it needs.
#[derive(Debug, Clone, Default)]
pub struct ComponentArgs {
    pub weights: BTreeMap<String, Real>,
    pub reference: Option<TimeSeriesTable>,
    pub targets: Vec<StateTarget>,
    pub controls: Vec<String>,
    pub independent: Option<String>,
    pub dependent: Option<String>,
    pub ratio: Option<Real>,
    pub bounds: Option<Bounds>,
}

/// `owner` is the declared component name, for error messages.
pub type GoalFactory = fn(owner: &str, args: &ComponentArgs) -> ProblemResult<GoalKind>;
pub type PathConstraintFactory =
    fn(owner: &str, args: &ComponentArgs) -> ProblemResult<PathConstraintKind>;

#[derive(Clone)]
struct Entry<F> {
    description: &'static str,
    factory: F,
}

#[derive(Clone, Default)]
pub struct Registry {
    goals: BTreeMap<String, Entry<GoalFactory>>,
    path_constraints: BTreeMap<String, Entry<PathConstraintFactory>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in type.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let goals: [(&str, &'static str, GoalFactory); 5] = [
            ("final_time", "final time of the phase", builtin::final_time),
            (
                "control_effort",
                "integral of weighted squared controls",
                builtin::control_effort,
            ),
            (
                "sum_squared_state",
                "integral of weighted squared states",
                builtin::sum_squared_state,
            ),
            (
                "state_tracking",
                "integral of weighted squared error to a reference table",
                builtin::state_tracking,
            ),
            (
                "final_state",
                "final state values relative to targets",
                builtin::final_state,
            ),
        ];
        for (name, description, factory) in goals {
            registry.goals.insert(
                name.to_string(),
                Entry {
                    description,
                    factory,
                },
            );
        }
        let paths: [(&str, &'static str, PathConstraintFactory); 3] = [
            (
                "control_reference",
                "controls follow a reference table",
                builtin::control_reference,
            ),
            (
                "coordinate_coupling",
                "dependent coordinate equals ratio times independent",
                builtin::coordinate_coupling,
            ),
            (
                "control_sum",
                "bounded sum of controls",
                builtin::control_sum,
            ),
        ];
        for (name, description, factory) in paths {
            registry.path_constraints.insert(
                name.to_string(),
                Entry {
                    description,
                    factory,
                },
            );
        }
        registry
    }

    pub fn register_goal(
        &mut self,
        name: impl Into<String>,
        description: &'static str,
        factory: GoalFactory,
    ) -> ProblemResult<()> {
        let name = name.into();
        if self.goals.contains_key(&name) {
            return Err(ProblemError::DuplicateName {
                what: "goal type",
                name,
            });
        }
        self.goals.insert(
            name,
            Entry {
                description,
                factory,
            },
        );
        Ok(())
    }

    pub fn register_path_constraint(
        &mut self,
        name: impl Into<String>,
        description: &'static str,
        factory: PathConstraintFactory,
    ) -> ProblemResult<()> {
        let name = name.into();
        if self.path_constraints.contains_key(&name) {
            return Err(ProblemError::DuplicateName {
                what: "path constraint type",
                name,
            });
        }
        self.path_constraints.insert(
            name,
            Entry {
                description,
                factory,
            },
        );
        Ok(())
    }

    pub fn make_goal(&self, type_name: &str, owner: &str, args: &ComponentArgs) -> ProblemResult<GoalKind> {
        let entry = self
            .goals
            .get(type_name)
            .ok_or_else(|| ProblemError::UnknownType {
                category: "goal",
                name: type_name.to_string(),
            })?;
        (entry.factory)(owner, args)
    }

    pub fn make_path_constraint(
        &self,
        type_name: &str,
        owner: &str,
        args: &ComponentArgs,
    ) -> ProblemResult<PathConstraintKind> {
        let entry = self
            .path_constraints
            .get(type_name)
            .ok_or_else(|| ProblemError::UnknownType {
                category: "path constraint",
                name: type_name.to_string(),
            })?;
        (entry.factory)(owner, args)
    }

    /// `(name, description)` of every goal type, sorted by name.
    pub fn goal_types(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.goals.iter().map(|(k, e)| (k.as_str(), e.description))
    }

    pub fn path_constraint_types(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.path_constraints
            .iter()
            .map(|(k, e)| (k.as_str(), e.description))
    }
}

mod builtin {
    use super::*;

    fn missing(owner: &str, field: &str) -> ProblemError {
        ProblemError::Configuration {
            owner: owner.to_string(),
            what: format!("missing '{field}'"),
        }
    }

    pub(super) fn final_time(_: &str, _: &ComponentArgs) -> ProblemResult<GoalKind> {
        Ok(GoalKind::FinalTime)
    }

    pub(super) fn control_effort(_: &str, args: &ComponentArgs) -> ProblemResult<GoalKind> {
        Ok(GoalKind::ControlEffort {
            weights: args.weights.clone(),
        })
    }

    pub(super) fn sum_squared_state(_: &str, args: &ComponentArgs) -> ProblemResult<GoalKind> {
        Ok(GoalKind::SumSquaredState {
            weights: args.weights.clone(),
        })
    }

    pub(super) fn state_tracking(owner: &str, args: &ComponentArgs) -> ProblemResult<GoalKind> {
        let reference = args
            .reference
            .clone()
            .ok_or_else(|| missing(owner, "reference"))?;
        Ok(GoalKind::StateTracking {
            reference,
            weights: args.weights.clone(),
        })
    }

    pub(super) fn final_state(owner: &str, args: &ComponentArgs) -> ProblemResult<GoalKind> {
        if args.targets.is_empty() {
            return Err(missing(owner, "targets"));
        }
        Ok(GoalKind::FinalState {
            targets: args.targets.clone(),
        })
    }

    pub(super) fn control_reference(
        owner: &str,
        args: &ComponentArgs,
    ) -> ProblemResult<PathConstraintKind> {
        let reference = args
            .reference
            .clone()
            .ok_or_else(|| missing(owner, "reference"))?;
        Ok(PathConstraintKind::ControlReference { reference })
    }

    pub(super) fn coordinate_coupling(
        owner: &str,
        args: &ComponentArgs,
    ) -> ProblemResult<PathConstraintKind> {
        Ok(PathConstraintKind::CoordinateCoupling {
            independent: args
                .independent
                .clone()
                .ok_or_else(|| missing(owner, "independent"))?,
            dependent: args
                .dependent
                .clone()
                .ok_or_else(|| missing(owner, "dependent"))?,
            ratio: args.ratio.unwrap_or(1.0),
        })
    }

    pub(super) fn control_sum(_: &str, args: &ComponentArgs) -> ProblemResult<PathConstraintKind> {
        Ok(PathConstraintKind::ControlSum {
            controls: args.controls.clone(),
            bounds: args.bounds.unwrap_or_default(),
        })
    }
}
