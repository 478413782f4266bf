//! Turning a validated [`Project`] into a model and a [`Problem`].

use std::collections::HashMap;
use std::path::Path;

use mc_core::timing::Timer;
use mc_core::{Bounds, CoordId, FinalBounds, InitialBounds};
use mc_model::{
    ActuatorKind, ConstraintKind, EquationCounts, Frame, JointKind, Model, ModelBuilder,
};
use mc_problem::{
    ComponentArgs, Goal, Parameter, PathConstraint, Phase, Problem, Registry, StateTarget,
};
use tracing::info;

use crate::reference::load_reference;
use crate::schema::{
    ActuatorKindDef, ArgsDef, ConstraintKindDef, JointKindDef, ModelDef, PhaseDef, Project,
};
use crate::validate::{GROUND, ValidationError};
use crate::{ProjectError, ProjectResult};

/// Compile a project. Reference files are resolved against `base_dir`;
/// goal and path-constraint types are looked up in `registry`.
pub fn compile(project: &Project, registry: &Registry, base_dir: &Path) -> ProjectResult<Problem> {
    let timer = Timer::start("compile");
    let model = build_model(&project.model)?;
    let phase = build_phase(&project.phase, model, registry, base_dir)?;
    info!(
        project = %project.name,
        goals = phase.goals.len(),
        path_constraints = phase.path_constraints.len(),
        parameters = phase.parameters.len(),
        "compiled project"
    );
    timer.stop_and_log();
    Ok(Problem {
        name: project.name.clone(),
        phases: vec![phase],
    })
}

/// Assemble the model section through [`ModelBuilder`].
pub fn build_model(def: &ModelDef) -> ProjectResult<Model> {
    let mut builder = ModelBuilder::new(def.name.clone());

    let mut bodies = HashMap::new();
    for body in &def.bodies {
        let id = builder.add_body_with(
            body.name.clone(),
            body.mass,
            body.mass_center.unwrap_or([0.0; 3]),
            body.inertia.unwrap_or([1.0; 3]),
        );
        bodies.insert(body.name.as_str(), id);
    }
    let frame = |name: &str| -> ProjectResult<Frame> {
        if name == GROUND {
            return Ok(Frame::Ground);
        }
        bodies
            .get(name)
            .map(|&id| Frame::Body(id))
            .ok_or_else(|| missing(name, "frame"))
    };

    let mut coordinates: HashMap<String, CoordId> = HashMap::new();
    for joint in &def.joints {
        let id = builder.add_joint(
            joint.name.clone(),
            joint_kind(joint.kind),
            frame(&joint.parent)?,
            frame(&joint.child)?,
        );
        for coord in &joint.coordinates {
            let q = builder.add_coordinate(
                id,
                coord.name.clone(),
                coord.range.unwrap_or(Bounds::unbounded()),
            );
            builder.set_coordinate_default(q, coord.default_value, coord.default_speed);
            coordinates.insert(format!("{}/{}", joint.name, coord.name), q);
        }
    }
    let coordinate = |name: &str| -> ProjectResult<CoordId> {
        coordinates
            .get(name)
            .copied()
            .ok_or_else(|| missing(name, "coordinate"))
    };

    for actuator in &def.actuators {
        let kind = match &actuator.kind {
            ActuatorKindDef::Coordinate { coordinate: c } => ActuatorKind::Coordinate {
                coordinate: coordinate(c)?,
            },
            ActuatorKindDef::ActivationCoordinate { coordinate: c } => {
                ActuatorKind::ActivationCoordinate {
                    coordinate: coordinate(c)?,
                }
            }
            ActuatorKindDef::Point { body, direction } => ActuatorKind::Point {
                body: bodies
                    .get(body.as_str())
                    .copied()
                    .ok_or_else(|| missing(body, "actuator body"))?,
                direction: *direction,
            },
        };
        builder.add_actuator(
            actuator.name.clone(),
            kind,
            actuator.optimal_force,
            actuator.control_limits.unwrap_or(Bounds::unbounded()),
        );
    }

    for constraint in &def.constraints {
        let kind = match &constraint.kind {
            ConstraintKindDef::Weld { frame_a, frame_b } => ConstraintKind::Weld {
                frame_a: frame(frame_a)?,
                frame_b: frame(frame_b)?,
            },
            ConstraintKindDef::Point { frame_a, frame_b } => ConstraintKind::Point {
                frame_a: frame(frame_a)?,
                frame_b: frame(frame_b)?,
            },
            ConstraintKindDef::PointOnLine {
                line_frame,
                follower,
            } => ConstraintKind::PointOnLine {
                line_frame: frame(line_frame)?,
                follower: frame(follower)?,
            },
            ConstraintKindDef::PointInPlane {
                plane_frame,
                follower,
            } => ConstraintKind::PointInPlane {
                plane_frame: frame(plane_frame)?,
                follower: frame(follower)?,
            },
            ConstraintKindDef::CoordinateCoupler {
                independent,
                dependent,
                ratio,
            } => ConstraintKind::CoordinateCoupler {
                independent: coordinate(independent)?,
                dependent: coordinate(dependent)?,
                ratio: *ratio,
            },
            ConstraintKindDef::ConstantSpeed { coordinate: c, speed } => {
                ConstraintKind::ConstantSpeed {
                    coordinate: coordinate(c)?,
                    speed: *speed,
                }
            }
            ConstraintKindDef::NoSlip1D { frame_a, frame_b } => ConstraintKind::NoSlip1D {
                frame_a: frame(frame_a)?,
                frame_b: frame(frame_b)?,
            },
            ConstraintKindDef::ConstantAcceleration {
                coordinate: c,
                acceleration,
            } => ConstraintKind::ConstantAcceleration {
                coordinate: coordinate(c)?,
                acceleration: *acceleration,
            },
            ConstraintKindDef::Custom { mp, mv, ma } => ConstraintKind::Custom {
                counts: EquationCounts::new(*mp, *mv, *ma),
            },
        };
        let index = builder.add_constraint(constraint.name.clone(), kind);
        builder.set_constraint_enabled(index, constraint.enabled);
    }

    for name in &def.remove_actuators {
        builder.remove_actuator(name)?;
    }
    if let Some(force) = def.reserve_actuators {
        builder.add_reserve_actuators(force)?;
    }
    Ok(builder.build()?)
}

fn build_phase(
    def: &PhaseDef,
    model: Model,
    registry: &Registry,
    base_dir: &Path,
) -> ProjectResult<Phase> {
    let mut phase = Phase::new(model);
    phase.set_time_bounds(
        InitialBounds(def.time_initial.unwrap_or(Bounds::zero())),
        FinalBounds(def.time_final.unwrap_or(Bounds::unbounded())),
    );
    for info in &def.states {
        phase.set_state_info(
            info.name.clone(),
            info.bounds.unwrap_or(Bounds::unbounded()),
            info.initial.map(InitialBounds),
            info.final_.map(FinalBounds),
        );
    }
    for info in &def.controls {
        phase.set_control_info(
            info.name.clone(),
            info.bounds.unwrap_or(Bounds::unbounded()),
            info.initial.map(InitialBounds),
            info.final_.map(FinalBounds),
        );
    }

    for goal in &def.goals {
        let args = component_args(&goal.args, base_dir, &phase.model)?;
        let kind = registry.make_goal(&goal.type_name, &goal.name, &args)?;
        let mut built = Goal::new(goal.name.clone(), kind)
            .with_weight(goal.weight)
            .with_enabled(goal.enabled);
        if let Some(apply) = goal.endpoint_constraint {
            built = built.as_endpoint_constraint(apply);
        }
        if let Some(bounds) = goal.endpoint_bounds {
            built = built.with_endpoint_bounds(bounds);
        }
        phase.add_goal(built);
    }

    for pc in &def.path_constraints {
        let args = component_args(&pc.args, base_dir, &phase.model)?;
        let kind = registry.make_path_constraint(&pc.type_name, &pc.name, &args)?;
        let mut built = PathConstraint::new(pc.name.clone(), kind);
        if let Some(bounds) = pc.bounds {
            built = built.with_bounds(bounds);
        }
        phase.add_path_constraint(built);
    }

    for param in &def.parameters {
        let mut built = Parameter::new(
            param.name.clone(),
            param.components.clone(),
            param.property.clone(),
            param.bounds,
        );
        if let Some(element) = param.element {
            built = built.with_element(element);
        }
        phase.add_parameter(built);
    }

    if let Some(bounds) = def.default_speed_bounds {
        phase.set_default_speed_bounds(bounds);
    }
    if let Some(bounds) = def.multibody_constraint_bounds {
        phase.set_multibody_constraint_bounds(bounds);
    }
    if let Some(bounds) = def.multiplier_bounds {
        phase.set_multiplier_bounds(bounds);
    }
    Ok(phase)
}

fn component_args(def: &ArgsDef, base_dir: &Path, model: &Model) -> ProjectResult<ComponentArgs> {
    let reference = def
        .reference
        .as_ref()
        .map(|r| load_reference(r, base_dir, model))
        .transpose()?;
    Ok(ComponentArgs {
        weights: def.weights.clone(),
        reference,
        targets: def
            .targets
            .iter()
            .map(|t| StateTarget {
                state: t.state.clone(),
                value: t.value,
            })
            .collect(),
        controls: def.controls.clone(),
        independent: def.independent.clone(),
        dependent: def.dependent.clone(),
        ratio: def.ratio,
        bounds: def.bounds,
    })
}

fn joint_kind(kind: JointKindDef) -> JointKind {
    match kind {
        JointKindDef::Pin => JointKind::Pin,
        JointKindDef::Slider => JointKind::Slider,
        JointKindDef::Planar => JointKind::Planar,
        JointKindDef::Weld => JointKind::Weld,
        JointKindDef::Custom => JointKind::Custom,
    }
}

fn missing(id: &str, context: &str) -> ProjectError {
    ProjectError::Validation(ValidationError::MissingReference {
        id: id.to_string(),
        context: context.to_string(),
    })
}
