//! Path constraints: equations enforced at every time point.
//!
//! Initialization happens in two explicit steps:
//!
//! 1. [`PathConstraint::bind`] resolves names against a model and fixes the
//!    equation count, giving a [`BoundPathConstraint`].
//! 2. [`BoundPathConstraint::finalize`] assigns the block of global equation
//!    indices starting at `first_index`, giving a read-only
//!    [`FinalizedPathConstraint`].

use std::ops::Range;

use mc_core::{Bounds, Real};
use mc_model::Model;
use mc_table::TimeSeriesTable;

use crate::error::{ProblemError, ProblemResult};
use crate::eval::Point;
use crate::info::ConstraintInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum PathConstraintKind {
    /// Controls follow a reference: one equation per reference column,
    /// `control(t) - reference(t)`. Columns name actuators.
    ControlReference { reference: TimeSeriesTable },
    /// `q_dependent - ratio * q_independent`. Both are coordinate paths.
    CoordinateCoupling {
        independent: String,
        dependent: String,
        ratio: Real,
    },
    /// Sum of the listed controls, or of every control when empty.
    ControlSum { controls: Vec<String>, bounds: Bounds },
}

impl PathConstraintKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PathConstraintKind::ControlReference { .. } => "control_reference",
            PathConstraintKind::CoordinateCoupling { .. } => "coordinate_coupling",
            PathConstraintKind::ControlSum { .. } => "control_sum",
        }
    }

    fn default_bounds(&self) -> Bounds {
        match self {
            PathConstraintKind::ControlSum { bounds, .. } => *bounds,
            _ => Bounds::zero(),
        }
    }
}

/// A declared path constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct PathConstraint {
    pub name: String,
    pub kind: PathConstraintKind,
    /// Overrides the kind's default bounds for every equation.
    pub bounds: Option<Bounds>,
}

impl PathConstraint {
    pub fn new(name: impl Into<String>, kind: PathConstraintKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn bind(&self, model: &Model) -> ProblemResult<BoundPathConstraint> {
        let index = model.state_index();
        let (resolved, suffixes) = match &self.kind {
            PathConstraintKind::ControlReference { reference } => {
                if reference.num_rows() == 0 || reference.num_columns() == 0 {
                    return Err(ProblemError::Configuration {
                        owner: self.name.clone(),
                        what: "reference table is empty".into(),
                    });
                }
                let mut controls = Vec::with_capacity(reference.num_columns());
                for label in reference.labels() {
                    let idx = index
                        .control_idx(label)
                        .ok_or_else(|| self.unknown_control(label))?;
                    controls.push(idx);
                }
                let resolved = ResolvedPath::ControlReference {
                    reference: reference.clone(),
                    controls,
                };
                (resolved, Some(reference.labels().to_vec()))
            }
            PathConstraintKind::CoordinateCoupling {
                independent,
                dependent,
                ratio,
            } => {
                if !ratio.is_finite() {
                    return Err(ProblemError::Configuration {
                        owner: self.name.clone(),
                        what: format!("ratio must be finite, got {ratio}"),
                    });
                }
                let independent = self.coordinate_value_index(model, independent)?;
                let dependent = self.coordinate_value_index(model, dependent)?;
                let resolved = ResolvedPath::CoordinateCoupling {
                    independent,
                    dependent,
                    ratio: *ratio,
                };
                (resolved, None)
            }
            PathConstraintKind::ControlSum { controls, .. } => {
                let indices = if controls.is_empty() {
                    (0..index.num_controls()).collect()
                } else {
                    let mut indices = Vec::with_capacity(controls.len());
                    for name in controls {
                        indices.push(
                            index
                                .control_idx(name)
                                .ok_or_else(|| self.unknown_control(name))?,
                        );
                    }
                    indices
                };
                (ResolvedPath::ControlSum { controls: indices }, None)
            }
        };

        let num_equations = resolved.num_equations();
        tracing::debug!(
            constraint = %self.name,
            kind = self.kind.type_name(),
            num_equations,
            "bound path constraint"
        );
        Ok(BoundPathConstraint {
            name: self.name.clone(),
            type_name: self.kind.type_name(),
            resolved,
            bounds: self.bounds.unwrap_or_else(|| self.kind.default_bounds()),
            suffixes,
        })
    }

    fn coordinate_value_index(&self, model: &Model, path: &str) -> ProblemResult<usize> {
        let coordinate = model
            .find_coordinate(path)
            .ok_or_else(|| ProblemError::UnknownCoordinate {
                owner: self.name.clone(),
                path: path.to_string(),
            })?;
        let state = coordinate.value_state_name();
        model
            .state_index()
            .state_idx(&state)
            .ok_or_else(|| ProblemError::UnknownState {
                owner: self.name.clone(),
                name: state,
            })
    }

    fn unknown_control(&self, name: &str) -> ProblemError {
        ProblemError::UnknownControl {
            owner: self.name.clone(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum ResolvedPath {
    ControlReference {
        reference: TimeSeriesTable,
        /// Control index per reference column.
        controls: Vec<usize>,
    },
    /// Indices of the coordinate value states.
    CoordinateCoupling {
        independent: usize,
        dependent: usize,
        ratio: Real,
    },
    ControlSum { controls: Vec<usize> },
}

impl ResolvedPath {
    fn num_equations(&self) -> usize {
        match self {
            ResolvedPath::ControlReference { controls, .. } => controls.len(),
            ResolvedPath::CoordinateCoupling { .. } | ResolvedPath::ControlSum { .. } => 1,
        }
    }

    fn calc_errors(&self, point: &Point<'_>, errors: &mut [Real]) {
        match self {
            ResolvedPath::ControlReference { reference, controls } => {
                for (col, (&control, out)) in controls.iter().zip(errors.iter_mut()).enumerate() {
                    *out = point.controls[control] - reference.sample(col, point.time);
                }
            }
            ResolvedPath::CoordinateCoupling {
                independent,
                dependent,
                ratio,
            } => {
                errors[0] = point.states[*dependent] - ratio * point.states[*independent];
            }
            ResolvedPath::ControlSum { controls } => {
                errors[0] = controls.iter().map(|&c| point.controls[c]).sum();
            }
        }
    }
}

/// A path constraint bound to one model, awaiting its equation indices.
#[derive(Debug, Clone)]
pub struct BoundPathConstraint {
    name: String,
    type_name: &'static str,
    resolved: ResolvedPath,
    bounds: Bounds,
    suffixes: Option<Vec<String>>,
}

impl BoundPathConstraint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn equation_count(&self) -> usize {
        self.resolved.num_equations()
    }

    /// Assign equations `first_index..first_index + equation_count()`.
    pub fn finalize(self, first_index: usize) -> FinalizedPathConstraint {
        let count = self.equation_count();
        let mut info = ConstraintInfo::uniform(self.name.clone(), count, self.bounds);
        if let Some(suffixes) = self.suffixes {
            info = info.with_suffixes(suffixes);
        }
        FinalizedPathConstraint {
            type_name: self.type_name,
            resolved: self.resolved,
            info,
            first_index,
        }
    }
}

/// A bound path constraint owning a contiguous block of equation indices.
#[derive(Debug, Clone)]
pub struct FinalizedPathConstraint {
    type_name: &'static str,
    resolved: ResolvedPath,
    info: ConstraintInfo,
    first_index: usize,
}

impl FinalizedPathConstraint {
    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn constraint_info(&self) -> &ConstraintInfo {
        &self.info
    }

    pub fn num_equations(&self) -> usize {
        self.info.num_equations()
    }

    pub fn first_index(&self) -> usize {
        self.first_index
    }

    pub fn index_range(&self) -> Range<usize> {
        self.first_index..self.first_index + self.num_equations()
    }

    /// Write this constraint's errors into `errors`, which must hold exactly
    /// `num_equations()` values.
    pub fn calc_errors(&self, point: &Point<'_>, errors: &mut [Real]) {
        debug_assert_eq!(errors.len(), self.num_equations());
        self.resolved.calc_errors(point, errors);
    }

    pub fn describe(&self) -> String {
        format!(
            "{} ({}). equations {}..{}",
            self.info.describe(),
            self.type_name,
            self.index_range().start,
            self.index_range().end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_model::{ActuatorKind, Frame, JointKind, ModelBuilder};

    fn two_link() -> Model {
        let mut b = ModelBuilder::new("two_link");
        let upper = b.add_body("upper", 1.0);
        let lower = b.add_body("lower", 1.0);
        let j0 = b.add_joint("shoulder", JointKind::Pin, Frame::Ground, Frame::Body(upper));
        let j1 = b.add_joint("elbow", JointKind::Pin, Frame::Body(upper), Frame::Body(lower));
        let q0 = b.add_coordinate(j0, "q", Bounds::new(-3.0, 3.0).unwrap());
        let q1 = b.add_coordinate(j1, "q", Bounds::new(-3.0, 3.0).unwrap());
        let limits = Bounds::new(-1.0, 1.0).unwrap();
        b.add_actuator("tau0", ActuatorKind::Coordinate { coordinate: q0 }, 1.0, limits);
        b.add_actuator("tau1", ActuatorKind::Coordinate { coordinate: q1 }, 1.0, limits);
        b.build().unwrap()
    }

    #[test]
    fn coupling_error() {
        let model = two_link();
        let pc = PathConstraint::new(
            "couple",
            PathConstraintKind::CoordinateCoupling {
                independent: "/jointset/shoulder/q".into(),
                dependent: "/jointset/elbow/q".into(),
                ratio: 2.0,
            },
        );
        let bound = pc.bind(&model).unwrap();
        assert_eq!(bound.equation_count(), 1);
        let fin = bound.finalize(3);
        assert_eq!(fin.index_range(), 3..4);
        assert_eq!(fin.constraint_info().bounds(), &[Bounds::zero()]);

        // states: shoulder value, speed, elbow value, speed
        let states = [0.5, 0.0, 1.5, 0.0];
        let mut errors = [0.0];
        fin.calc_errors(
            &Point {
                time: 0.0,
                states: &states,
                controls: &[0.0, 0.0],
            },
            &mut errors,
        );
        assert_eq!(errors, [0.5]);
    }

    #[test]
    fn control_sum_defaults_to_all_controls() {
        let model = two_link();
        let bounds = Bounds::new(-0.5, 0.5).unwrap();
        let fin = PathConstraint::new(
            "budget",
            PathConstraintKind::ControlSum {
                controls: vec![],
                bounds,
            },
        )
        .bind(&model)
        .unwrap()
        .finalize(0);
        assert_eq!(fin.constraint_info().bounds(), &[bounds]);

        let mut errors = [0.0];
        fin.calc_errors(
            &Point {
                time: 0.0,
                states: &[0.0; 4],
                controls: &[0.25, 0.5],
            },
            &mut errors,
        );
        assert_eq!(errors, [0.75]);
    }

    #[test]
    fn control_reference_one_equation_per_column() {
        let model = two_link();
        let reference = TimeSeriesTable::from_rows(
            vec![0.0, 1.0],
            vec!["/forceset/tau1".into(), "/forceset/tau0".into()],
            &[vec![0.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap();
        let fin = PathConstraint::new("track", PathConstraintKind::ControlReference { reference })
            .bind(&model)
            .unwrap()
            .finalize(1);
        assert_eq!(fin.index_range(), 1..3);
        assert_eq!(
            fin.constraint_info().equation_labels(),
            vec!["track_/forceset/tau1", "track_/forceset/tau0"]
        );

        let mut errors = [0.0; 2];
        fin.calc_errors(
            &Point {
                time: 0.5,
                states: &[0.0; 4],
                controls: &[0.0, 1.0],
            },
            &mut errors,
        );
        assert_eq!(errors, [0.5, -1.0]);
    }

    #[test]
    fn unknown_references_fail_at_bind() {
        let model = two_link();
        let pc = PathConstraint::new(
            "bad",
            PathConstraintKind::ControlSum {
                controls: vec!["/no/such/actuator".into()],
                bounds: Bounds::unbounded(),
            },
        );
        assert!(matches!(
            pc.bind(&model),
            Err(ProblemError::UnknownControl { .. })
        ));

        let pc = PathConstraint::new(
            "bad",
            PathConstraintKind::CoordinateCoupling {
                independent: "/jointset/shoulder/q".into(),
                dependent: "/bodyset/upper".into(),
                ratio: 1.0,
            },
        );
        assert!(matches!(
            pc.bind(&model),
            Err(ProblemError::UnknownCoordinate { .. })
        ));
    }
}
