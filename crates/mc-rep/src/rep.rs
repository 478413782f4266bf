//! Reconciliation of a problem against its model.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::io;

use mc_core::timing::Timer;
use mc_core::{FinalBounds, InitialBounds, Parallelism, Real};
use mc_model::Model;
use mc_problem::{
    BoundGoal, BoundParameter, FinalizedPathConstraint, Phase, Problem, VariableInfo,
};
use tracing::{debug, info};

use crate::error::{RepError, RepResult};
use crate::multibody::{self, MultibodyConstraint};

/// A fully resolved problem: every declaration checked against the model,
/// defaults filled in, equation indices assigned.
///
/// Read-only once built, apart from [`ProblemRep::apply_parameters_to_model`].
#[derive(Debug, Clone)]
pub struct ProblemRep {
    name: String,
    time_initial_bounds: InitialBounds,
    time_final_bounds: FinalBounds,
    pub(crate) model: Model,
    state_infos: BTreeMap<String, VariableInfo>,
    control_infos: BTreeMap<String, VariableInfo>,
    pub(crate) goals: Vec<BoundGoal>,
    multibody_constraints: Vec<MultibodyConstraint>,
    pub(crate) path_constraints: Vec<FinalizedPathConstraint>,
    parameters: Vec<BoundParameter>,
    num_path_constraint_equations: usize,
    num_multibody_constraint_equations: usize,
    pub(crate) parallelism: Parallelism,
}

impl ProblemRep {
    /// Reconcile the first phase of `problem`. Fails on the first
    /// declaration that does not match the model.
    pub fn new(problem: &Problem) -> RepResult<Self> {
        let timer = Timer::start("problem_rep");
        let phase = problem.phase().ok_or(RepError::NoPhase)?;
        let model = phase.model.clone();

        let state_infos = reconcile_states(phase, &model)?;
        let control_infos = reconcile_controls(phase, &model)?;

        let multibody_constraints = multibody::resolve(
            &model,
            phase.multibody_constraint_bounds,
            phase.multiplier_bounds,
        );
        let num_multibody_constraint_equations = multibody_constraints
            .iter()
            .map(MultibodyConstraint::num_equations)
            .sum();

        let mut names = HashSet::new();
        let mut path_constraints = Vec::with_capacity(phase.path_constraints.len());
        let mut num_path_constraint_equations = 0;
        for pc in &phase.path_constraints {
            if !names.insert(pc.name.as_str()) {
                return Err(RepError::DuplicateName {
                    what: "path constraint",
                    name: pc.name.clone(),
                });
            }
            let bound = pc.bind(&model)?;
            let count = bound.equation_count();
            path_constraints.push(bound.finalize(num_path_constraint_equations));
            num_path_constraint_equations += count;
        }

        let mut names = HashSet::new();
        let mut goals = Vec::with_capacity(phase.goals.len());
        for goal in &phase.goals {
            if !names.insert(goal.name.as_str()) {
                return Err(RepError::DuplicateName {
                    what: "goal",
                    name: goal.name.clone(),
                });
            }
            goals.push(goal.bind(&model)?);
        }

        let mut names = HashSet::new();
        let mut parameters = Vec::with_capacity(phase.parameters.len());
        for parameter in &phase.parameters {
            if !names.insert(parameter.name.as_str()) {
                return Err(RepError::DuplicateName {
                    what: "parameter",
                    name: parameter.name.clone(),
                });
            }
            parameters.push(parameter.bind(&model)?);
        }

        info!(
            problem = %problem.name,
            states = state_infos.len(),
            controls = control_infos.len(),
            multibody_equations = num_multibody_constraint_equations,
            path_equations = num_path_constraint_equations,
            goals = goals.len(),
            parameters = parameters.len(),
            "problem reconciled"
        );
        timer.stop_and_log();

        Ok(Self {
            name: problem.name.clone(),
            time_initial_bounds: phase.time_initial_bounds,
            time_final_bounds: phase.time_final_bounds,
            model,
            state_infos,
            control_infos,
            goals,
            multibody_constraints,
            path_constraints,
            parameters,
            num_path_constraint_equations,
            num_multibody_constraint_equations,
            parallelism: Parallelism::from_env(),
        })
    }

    /// Override the parallelism read from the environment.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_initial_bounds(&self) -> InitialBounds {
        self.time_initial_bounds
    }

    pub fn time_final_bounds(&self) -> FinalBounds {
        self.time_final_bounds
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    // Name lists. States and controls are sorted by name; everything else
    // is in declaration or engine order.

    pub fn state_info_names(&self) -> Vec<String> {
        self.state_infos.keys().cloned().collect()
    }

    pub fn control_info_names(&self) -> Vec<String> {
        self.control_infos.keys().cloned().collect()
    }

    pub fn multiplier_info_names(&self) -> Vec<String> {
        self.multibody_constraints
            .iter()
            .flat_map(|mc| mc.multipliers().iter().map(|m| m.name().to_string()))
            .collect()
    }

    pub fn multibody_constraint_names(&self) -> Vec<String> {
        self.multibody_constraints
            .iter()
            .map(|mc| mc.name().to_string())
            .collect()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn path_constraint_names(&self) -> Vec<String> {
        self.path_constraints
            .iter()
            .map(|pc| pc.name().to_string())
            .collect()
    }

    pub fn goal_names(&self) -> Vec<String> {
        self.goals.iter().map(|g| g.name().to_string()).collect()
    }

    // Lookups

    pub fn state_info(&self, name: &str) -> RepResult<&VariableInfo> {
        self.state_infos
            .get(name)
            .ok_or_else(|| not_found("state info", name))
    }

    pub fn control_info(&self, name: &str) -> RepResult<&VariableInfo> {
        self.control_infos
            .get(name)
            .ok_or_else(|| not_found("control info", name))
    }

    pub fn parameter(&self, name: &str) -> RepResult<&BoundParameter> {
        self.parameters
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| not_found("parameter", name))
    }

    pub fn path_constraint(&self, name: &str) -> RepResult<&FinalizedPathConstraint> {
        self.path_constraints
            .iter()
            .find(|pc| pc.name() == name)
            .ok_or_else(|| not_found("path constraint", name))
    }

    pub fn multibody_constraint(&self, name: &str) -> RepResult<&MultibodyConstraint> {
        self.multibody_constraints
            .iter()
            .find(|mc| mc.name() == name)
            .ok_or_else(|| not_found("multibody constraint", name))
    }

    /// Multipliers of the multibody constraint called `constraint_name`.
    pub fn multiplier_infos(&self, constraint_name: &str) -> RepResult<&[VariableInfo]> {
        self.multibody_constraints
            .iter()
            .find(|mc| mc.name() == constraint_name)
            .map(MultibodyConstraint::multipliers)
            .ok_or_else(|| not_found("multibody constraint", constraint_name))
    }

    pub fn goal(&self, name: &str) -> RepResult<&BoundGoal> {
        self.goals
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| not_found("goal", name))
    }

    pub fn num_path_constraint_equations(&self) -> usize {
        self.num_path_constraint_equations
    }

    pub fn num_multibody_constraint_equations(&self) -> usize {
        self.num_multibody_constraint_equations
    }

    /// Write `values[i]` into the model property of the `i`-th parameter.
    pub fn apply_parameters_to_model(&mut self, values: &[Real]) -> RepResult<()> {
        if values.len() != self.parameters.len() {
            return Err(RepError::ParameterCountMismatch {
                expected: self.parameters.len(),
                actual: values.len(),
            });
        }
        for (parameter, &value) in self.parameters.iter().zip(values) {
            parameter.apply(&mut self.model, value)?;
        }
        debug!(count = values.len(), "applied parameters to model");
        Ok(())
    }

    /// Human-readable summary of every registered entity.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Goals", self.goals.iter().map(BoundGoal::describe));
        section(
            &mut out,
            "Multibody constraints",
            self.multibody_constraints
                .iter()
                .map(|mc| mc.constraint_info().describe()),
        );
        section(
            &mut out,
            "Path constraints",
            self.path_constraints
                .iter()
                .map(FinalizedPathConstraint::describe),
        );
        section(
            &mut out,
            "States",
            self.state_infos.values().map(VariableInfo::describe),
        );
        section(
            &mut out,
            "Controls",
            self.control_infos.values().map(VariableInfo::describe),
        );
        section(
            &mut out,
            "Parameters",
            self.parameters.iter().map(BoundParameter::describe),
        );
        out
    }

    pub fn print_description(&self, stream: &mut impl io::Write) -> io::Result<()> {
        stream.write_all(self.describe().as_bytes())?;
        stream.flush()
    }
}

fn not_found(what: &'static str, name: &str) -> RepError {
    RepError::NotFound {
        what,
        name: name.to_string(),
    }
}

fn section(out: &mut String, title: &str, lines: impl ExactSizeIterator<Item = String>) {
    let _ = match lines.len() {
        0 => writeln!(out, "{title}: none"),
        n => writeln!(out, "{title}: (total: {n})"),
    };
    for line in lines {
        let _ = writeln!(out, "  {line}");
    }
}

fn reconcile_states(phase: &Phase, model: &Model) -> RepResult<BTreeMap<String, VariableInfo>> {
    let index = model.state_index();
    let mut infos = BTreeMap::new();
    for info in &phase.state_infos {
        if index.state_idx(info.name()).is_none() {
            return Err(RepError::NonexistentState {
                name: info.name().to_string(),
            });
        }
        if infos.insert(info.name().to_string(), info.clone()).is_some() {
            return Err(RepError::DuplicateName {
                what: "state info",
                name: info.name().to_string(),
            });
        }
    }
    for coord in model.coordinates() {
        let value = coord.value_state_name();
        if !infos.contains_key(&value) {
            infos.insert(value.clone(), VariableInfo::with_bounds(value, coord.range));
        }
        let speed = coord.speed_state_name();
        if !infos.contains_key(&speed) {
            infos.insert(
                speed.clone(),
                VariableInfo::with_bounds(speed, phase.default_speed_bounds),
            );
        }
    }
    Ok(infos)
}

fn reconcile_controls(phase: &Phase, model: &Model) -> RepResult<BTreeMap<String, VariableInfo>> {
    let mut infos = BTreeMap::new();
    for info in &phase.control_infos {
        if model.find_actuator(info.name()).is_none() {
            return Err(RepError::NonexistentControl {
                name: info.name().to_string(),
            });
        }
        if infos.insert(info.name().to_string(), info.clone()).is_some() {
            return Err(RepError::DuplicateName {
                what: "control info",
                name: info.name().to_string(),
            });
        }
    }
    for actuator in model.actuators() {
        if !infos.contains_key(&actuator.path) {
            infos.insert(
                actuator.path.clone(),
                VariableInfo::with_bounds(actuator.path.clone(), actuator.control_limits),
            );
        }
    }
    Ok(infos)
}
