//! Goals: scalar or vector contributions to the objective.
//!
//! A [`Goal`] is a user declaration. Binding it to a [`Model`] resolves every
//! state and control name to a column index and fixes the number of outputs,
//! producing a read-only [`BoundGoal`].
//!
//! A goal is applied either as a weighted cost term or as an endpoint
//! constraint whose outputs must lie within the goal's endpoint bounds. Only
//! kinds that report `supports_endpoint_constraint` can be used the second way.

use std::collections::BTreeMap;

use mc_core::{Bounds, Real};
use mc_model::Model;
use mc_table::TimeSeriesTable;
use nalgebra::DVector;

use crate::error::{ProblemError, ProblemResult};
use crate::eval::{GoalInput, Point};
use crate::info::ConstraintInfo;

/// Target value for one state at the final time.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTarget {
    pub state: String,
    pub value: Real,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoalKind {
    /// The final time of the phase.
    FinalTime,
    /// Integral of weighted squared controls. Missing weights default to 1.
    ControlEffort { weights: BTreeMap<String, Real> },
    /// Integral of weighted squared state values. Missing weights default to 1.
    SumSquaredState { weights: BTreeMap<String, Real> },
    /// Integral of weighted squared error between states and a reference.
    /// Reference columns name states; missing weights default to 1.
    StateTracking {
        reference: TimeSeriesTable,
        weights: BTreeMap<String, Real>,
    },
    /// Final state values relative to targets.
    FinalState { targets: Vec<StateTarget> },
}

impl GoalKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            GoalKind::FinalTime => "final_time",
            GoalKind::ControlEffort { .. } => "control_effort",
            GoalKind::SumSquaredState { .. } => "sum_squared_state",
            GoalKind::StateTracking { .. } => "state_tracking",
            GoalKind::FinalState { .. } => "final_state",
        }
    }

    pub fn supports_endpoint_constraint(&self) -> bool {
        matches!(self, GoalKind::FinalTime | GoalKind::FinalState { .. })
    }

    /// Mode used when the declaration leaves it unset.
    pub fn default_mode(&self) -> GoalMode {
        match self {
            GoalKind::FinalState { .. } => GoalMode::EndpointConstraint,
            _ => GoalMode::Cost,
        }
    }

    fn num_integrals(&self) -> usize {
        match self {
            GoalKind::FinalTime | GoalKind::FinalState { .. } => 0,
            GoalKind::ControlEffort { .. }
            | GoalKind::SumSquaredState { .. }
            | GoalKind::StateTracking { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalMode {
    Cost,
    EndpointConstraint,
}

impl GoalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalMode::Cost => "cost",
            GoalMode::EndpointConstraint => "endpoint constraint",
        }
    }
}

/// A declared goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub name: String,
    pub kind: GoalKind,
    pub enabled: bool,
    pub weight: Real,
    /// `None` uses the kind's default mode.
    pub apply_as_endpoint_constraint: Option<bool>,
    /// Bounds on each output in endpoint-constraint mode.
    pub endpoint_bounds: Bounds,
}

impl Goal {
    pub fn new(name: impl Into<String>, kind: GoalKind) -> Self {
        Self {
            name: name.into(),
            kind,
            enabled: true,
            weight: 1.0,
            apply_as_endpoint_constraint: None,
            endpoint_bounds: Bounds::zero(),
        }
    }

    pub fn with_weight(mut self, weight: Real) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn as_endpoint_constraint(mut self, apply: bool) -> Self {
        self.apply_as_endpoint_constraint = Some(apply);
        self
    }

    pub fn with_endpoint_bounds(mut self, bounds: Bounds) -> Self {
        self.endpoint_bounds = bounds;
        self
    }

    /// Resolve the goal against `model`.
    pub fn bind(&self, model: &Model) -> ProblemResult<BoundGoal> {
        let mode = match self.apply_as_endpoint_constraint {
            None => self.kind.default_mode(),
            Some(false) => GoalMode::Cost,
            Some(true) if self.kind.supports_endpoint_constraint() => GoalMode::EndpointConstraint,
            Some(true) => {
                return Err(ProblemError::Configuration {
                    owner: self.name.clone(),
                    what: format!(
                        "{} goals cannot be applied as endpoint constraints",
                        self.kind.type_name()
                    ),
                });
            }
        };
        if !self.weight.is_finite() {
            return Err(ProblemError::Configuration {
                owner: self.name.clone(),
                what: format!("weight must be finite, got {}", self.weight),
            });
        }

        let resolved = self.resolve_kind(model)?;
        let num_outputs = match (&resolved, mode) {
            (ResolvedGoal::FinalState { targets }, GoalMode::EndpointConstraint) => targets.len(),
            _ => 1,
        };
        let constraint_info = (mode == GoalMode::EndpointConstraint)
            .then(|| ConstraintInfo::uniform(self.name.clone(), num_outputs, self.endpoint_bounds));

        tracing::debug!(
            goal = %self.name,
            kind = self.kind.type_name(),
            mode = mode.as_str(),
            num_outputs,
            "bound goal"
        );

        Ok(BoundGoal {
            name: self.name.clone(),
            type_name: self.kind.type_name(),
            resolved,
            enabled: self.enabled,
            weight: self.weight,
            mode,
            num_outputs,
            num_integrals: self.kind.num_integrals(),
            constraint_info,
        })
    }

    fn resolve_kind(&self, model: &Model) -> ProblemResult<ResolvedGoal> {
        let index = model.state_index();
        let resolved = match &self.kind {
            GoalKind::FinalTime => ResolvedGoal::FinalTime,
            GoalKind::ControlEffort { weights } => {
                for name in weights.keys() {
                    if index.control_idx(name).is_none() {
                        return Err(ProblemError::UnknownControl {
                            owner: self.name.clone(),
                            name: name.clone(),
                        });
                    }
                }
                let weights = model
                    .control_names()
                    .iter()
                    .map(|name| weights.get(name).copied().unwrap_or(1.0))
                    .collect();
                ResolvedGoal::ControlEffort { weights }
            }
            GoalKind::SumSquaredState { weights } => {
                for name in weights.keys() {
                    if index.state_idx(name).is_none() {
                        return Err(self.unknown_state(name));
                    }
                }
                let weights = model
                    .state_variable_names()
                    .iter()
                    .map(|name| weights.get(name).copied().unwrap_or(1.0))
                    .collect();
                ResolvedGoal::SumSquaredState { weights }
            }
            GoalKind::StateTracking { reference, weights } => {
                if reference.num_rows() == 0 {
                    return Err(ProblemError::Configuration {
                        owner: self.name.clone(),
                        what: "reference table has no rows".into(),
                    });
                }
                for name in weights.keys() {
                    if reference.column_index(name).is_none() {
                        return Err(ProblemError::Configuration {
                            owner: self.name.clone(),
                            what: format!("weight given for '{name}', which is not a reference column"),
                        });
                    }
                }
                let mut columns = Vec::with_capacity(reference.num_columns());
                for (col, label) in reference.labels().iter().enumerate() {
                    let state = index
                        .state_idx(label)
                        .ok_or_else(|| self.unknown_state(label))?;
                    let weight = weights.get(label).copied().unwrap_or(1.0);
                    columns.push((state, col, weight));
                }
                ResolvedGoal::StateTracking {
                    reference: reference.clone(),
                    columns,
                }
            }
            GoalKind::FinalState { targets } => {
                let mut resolved = Vec::with_capacity(targets.len());
                for target in targets {
                    let state = index
                        .state_idx(&target.state)
                        .ok_or_else(|| self.unknown_state(&target.state))?;
                    resolved.push((state, target.value));
                }
                ResolvedGoal::FinalState { targets: resolved }
            }
        };
        Ok(resolved)
    }

    fn unknown_state(&self, name: &str) -> ProblemError {
        ProblemError::UnknownState {
            owner: self.name.clone(),
            name: name.to_string(),
        }
    }
}

/// Goal configuration with names resolved to column indices.
#[derive(Debug, Clone)]
enum ResolvedGoal {
    FinalTime,
    /// One weight per model control.
    ControlEffort { weights: Vec<Real> },
    /// One weight per model state.
    SumSquaredState { weights: Vec<Real> },
    /// `(state index, reference column, weight)` per tracked column.
    StateTracking {
        reference: TimeSeriesTable,
        columns: Vec<(usize, usize, Real)>,
    },
    /// `(state index, target)` per target.
    FinalState { targets: Vec<(usize, Real)> },
}

/// A goal bound to one model. Read-only.
#[derive(Debug, Clone)]
pub struct BoundGoal {
    name: String,
    type_name: &'static str,
    resolved: ResolvedGoal,
    enabled: bool,
    weight: Real,
    mode: GoalMode,
    num_outputs: usize,
    num_integrals: usize,
    constraint_info: Option<ConstraintInfo>,
}

impl BoundGoal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn weight(&self) -> Real {
        self.weight
    }

    pub fn mode(&self) -> GoalMode {
        self.mode
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// 0 for endpoint-only goals, 1 for goals with an integrand.
    pub fn num_integrals(&self) -> usize {
        self.num_integrals
    }

    /// Present only in endpoint-constraint mode.
    pub fn constraint_info(&self) -> Option<&ConstraintInfo> {
        self.constraint_info.as_ref()
    }

    /// Integrand at one point. Zero for disabled goals and goals without one.
    pub fn calc_integrand(&self, point: &Point<'_>) -> Real {
        if !self.enabled {
            return 0.0;
        }
        match &self.resolved {
            ResolvedGoal::ControlEffort { weights } => weights
                .iter()
                .zip(point.controls)
                .map(|(w, u)| w * u * u)
                .sum(),
            ResolvedGoal::SumSquaredState { weights } => weights
                .iter()
                .zip(point.states)
                .map(|(w, x)| w * x * x)
                .sum(),
            ResolvedGoal::StateTracking { reference, columns } => columns
                .iter()
                .map(|&(state, col, w)| {
                    let err = point.states[state] - reference.sample(col, point.time);
                    w * err * err
                })
                .sum(),
            ResolvedGoal::FinalTime | ResolvedGoal::FinalState { .. } => 0.0,
        }
    }

    /// Goal outputs. Disabled goals yield zeros; the weight is applied only
    /// in cost mode.
    pub fn calc_goal(&self, input: &GoalInput<'_>) -> DVector<Real> {
        if !self.enabled {
            return DVector::zeros(self.num_outputs);
        }
        let mut out = match &self.resolved {
            ResolvedGoal::FinalTime => DVector::from_element(1, input.final_.time),
            ResolvedGoal::ControlEffort { .. }
            | ResolvedGoal::SumSquaredState { .. }
            | ResolvedGoal::StateTracking { .. } => DVector::from_element(1, input.integral),
            ResolvedGoal::FinalState { targets } => {
                let errors = targets
                    .iter()
                    .map(|&(state, target)| input.final_.states[state] - target);
                match self.mode {
                    GoalMode::EndpointConstraint => DVector::from_iterator(targets.len(), errors),
                    GoalMode::Cost => {
                        DVector::from_element(1, errors.map(|e| e * e).sum::<Real>())
                    }
                }
            }
        };
        if self.mode == GoalMode::Cost {
            out *= self.weight;
        }
        out
    }

    pub fn describe(&self) -> String {
        let mut line = format!(
            "{}. {} enabled: {} mode: {}",
            self.name,
            self.type_name,
            self.enabled,
            self.mode.as_str()
        );
        match &self.constraint_info {
            Some(info) => {
                let bounds: Vec<String> = info.bounds().iter().map(|b| b.to_string()).collect();
                line.push_str(&format!(" bounds: {}", bounds.join(", ")));
            }
            None => line.push_str(&format!(" weight: {}", self.weight)),
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_model::{ActuatorKind, Frame, JointKind, ModelBuilder};

    fn slider() -> Model {
        let mut b = ModelBuilder::new("slider");
        let body = b.add_body("block", 1.0);
        let j = b.add_joint("slide", JointKind::Slider, Frame::Ground, Frame::Body(body));
        let q = b.add_coordinate(j, "x", Bounds::new(-1.0, 1.0).unwrap());
        b.add_actuator(
            "force",
            ActuatorKind::Coordinate { coordinate: q },
            1.0,
            Bounds::new(-5.0, 5.0).unwrap(),
        );
        b.build().unwrap()
    }

    fn point<'a>(time: Real, states: &'a [Real], controls: &'a [Real]) -> Point<'a> {
        Point {
            time,
            states,
            controls,
        }
    }

    #[test]
    fn control_effort_integrand_uses_weights() {
        let model = slider();
        let goal = Goal::new(
            "effort",
            GoalKind::ControlEffort {
                weights: BTreeMap::from([("/forceset/force".to_string(), 2.0)]),
            },
        )
        .with_weight(10.0);
        let bound = goal.bind(&model).unwrap();
        assert_eq!(bound.mode(), GoalMode::Cost);
        assert_eq!(bound.num_integrals(), 1);
        assert_eq!(bound.calc_integrand(&point(0.0, &[0.0, 0.0], &[3.0])), 18.0);

        let p = point(1.0, &[0.0, 0.0], &[0.0]);
        let out = bound.calc_goal(&GoalInput {
            initial: p,
            final_: p,
            integral: 1.5,
        });
        assert_eq!(out.as_slice(), &[15.0]);
    }

    #[test]
    fn final_state_defaults_to_endpoint_constraint() {
        let model = slider();
        let goal = Goal::new(
            "reach",
            GoalKind::FinalState {
                targets: vec![StateTarget {
                    state: "/jointset/slide/x/value".into(),
                    value: 0.5,
                }],
            },
        )
        .with_weight(100.0);
        let bound = goal.bind(&model).unwrap();
        assert_eq!(bound.mode(), GoalMode::EndpointConstraint);
        assert_eq!(bound.constraint_info().unwrap().num_equations(), 1);

        let initial = point(0.0, &[0.0, 0.0], &[0.0]);
        let final_ = point(1.0, &[0.75, 0.0], &[0.0]);
        let out = bound.calc_goal(&GoalInput {
            initial,
            final_,
            integral: 0.0,
        });
        // Weight ignored as a constraint
        assert_eq!(out.as_slice(), &[0.25]);
    }

    #[test]
    fn endpoint_mode_rejected_for_integral_goal() {
        let goal = Goal::new(
            "effort",
            GoalKind::ControlEffort {
                weights: BTreeMap::new(),
            },
        )
        .as_endpoint_constraint(true);
        assert!(matches!(
            goal.bind(&slider()),
            Err(ProblemError::Configuration { .. })
        ));
    }

    #[test]
    fn disabled_goal_is_zero() {
        let bound = Goal::new("t", GoalKind::FinalTime)
            .with_enabled(false)
            .bind(&slider())
            .unwrap();
        let p = point(2.0, &[0.0, 0.0], &[0.0]);
        let out = bound.calc_goal(&GoalInput {
            initial: p,
            final_: p,
            integral: 0.0,
        });
        assert_eq!(out.as_slice(), &[0.0]);
    }

    #[test]
    fn unknown_names_fail_at_bind() {
        let goal = Goal::new(
            "sq",
            GoalKind::SumSquaredState {
                weights: BTreeMap::from([("/no/such/state".to_string(), 1.0)]),
            },
        );
        assert!(matches!(
            goal.bind(&slider()),
            Err(ProblemError::UnknownState { .. })
        ));
    }
}
