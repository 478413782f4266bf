//! Project validation logic.
//!
//! Checks what can be decided from the file alone: unique names and
//! references between model sections. Whether goals and constraints name
//! existing states or controls is decided later, when they bind to the
//! compiled model.

use std::collections::HashSet;

use crate::schema::{ActuatorKindDef, ConstraintKindDef, ModelDef, PhaseDef, Project};

/// Name accepted wherever a frame is referenced.
pub const GROUND: &str = "ground";

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    validate_model(&project.model)?;
    validate_phase(&project.phase)
}

fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    let mut bodies = HashSet::new();
    for body in &model.bodies {
        if body.name == GROUND {
            return Err(ValidationError::InvalidValue {
                field: "body name".to_string(),
                value: body.name.clone(),
                reason: "reserved for the ground frame".to_string(),
            });
        }
        unique(&mut bodies, &body.name, "bodies")?;
        finite("body mass", body.mass)?;
    }

    let mut joints = HashSet::new();
    let mut coordinates = HashSet::new();
    for joint in &model.joints {
        unique(&mut joints, &joint.name, "joints")?;
        frame(&bodies, &joint.parent, "joint parent")?;
        frame(&bodies, &joint.child, "joint child")?;
        let context = format!("joint '{}' coordinates", joint.name);
        for coord in &joint.coordinates {
            let qualified = format!("{}/{}", joint.name, coord.name);
            if !coordinates.insert(qualified) {
                return Err(ValidationError::DuplicateId {
                    id: coord.name.clone(),
                    context,
                });
            }
        }
    }

    let mut actuators = HashSet::new();
    for actuator in &model.actuators {
        unique(&mut actuators, &actuator.name, "actuators")?;
        finite("optimal force", actuator.optimal_force)?;
        match &actuator.kind {
            ActuatorKindDef::Coordinate { coordinate }
            | ActuatorKindDef::ActivationCoordinate { coordinate } => {
                reference(&coordinates, coordinate, "actuator coordinate")?
            }
            ActuatorKindDef::Point { body, .. } => reference(&bodies, body, "actuator body")?,
        }
    }

    let mut constraints = HashSet::new();
    for constraint in &model.constraints {
        unique(&mut constraints, &constraint.name, "constraints")?;
        match &constraint.kind {
            ConstraintKindDef::Weld { frame_a, frame_b }
            | ConstraintKindDef::Point { frame_a, frame_b }
            | ConstraintKindDef::NoSlip1D { frame_a, frame_b } => {
                frame(&bodies, frame_a, "constraint frame")?;
                frame(&bodies, frame_b, "constraint frame")?;
            }
            ConstraintKindDef::PointOnLine {
                line_frame: a,
                follower: b,
            }
            | ConstraintKindDef::PointInPlane {
                plane_frame: a,
                follower: b,
            } => {
                frame(&bodies, a, "constraint frame")?;
                frame(&bodies, b, "constraint follower")?;
            }
            ConstraintKindDef::CoordinateCoupler {
                independent,
                dependent,
                ratio,
            } => {
                reference(&coordinates, independent, "coupler independent coordinate")?;
                reference(&coordinates, dependent, "coupler dependent coordinate")?;
                finite("coupler ratio", *ratio)?;
            }
            ConstraintKindDef::ConstantSpeed { coordinate, .. }
            | ConstraintKindDef::ConstantAcceleration { coordinate, .. } => {
                reference(&coordinates, coordinate, "constraint coordinate")?
            }
            ConstraintKindDef::Custom { .. } => {}
        }
    }

    for name in &model.remove_actuators {
        reference(&actuators, name, "remove_actuators")?;
    }
    if let Some(force) = model.reserve_actuators
        && !(force > 0.0 && force.is_finite())
    {
        return Err(ValidationError::InvalidValue {
            field: "reserve_actuators".to_string(),
            value: force.to_string(),
            reason: "optimal force must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_phase(phase: &PhaseDef) -> Result<(), ValidationError> {
    let mut states = HashSet::new();
    for info in &phase.states {
        unique(&mut states, &info.name, "states")?;
    }
    let mut controls = HashSet::new();
    for info in &phase.controls {
        unique(&mut controls, &info.name, "controls")?;
    }

    let mut goals = HashSet::new();
    for goal in &phase.goals {
        unique(&mut goals, &goal.name, "goals")?;
        finite("goal weight", goal.weight)?;
        for (name, weight) in &goal.args.weights {
            finite(&format!("weight of '{name}'"), *weight)?;
        }
    }

    let mut path_constraints = HashSet::new();
    for pc in &phase.path_constraints {
        unique(&mut path_constraints, &pc.name, "path_constraints")?;
    }

    let mut parameters = HashSet::new();
    for param in &phase.parameters {
        unique(&mut parameters, &param.name, "parameters")?;
        if param.components.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("parameter '{}' components", param.name),
                value: "[]".to_string(),
                reason: "at least one component is required".to_string(),
            });
        }
    }
    Ok(())
}

fn unique<'a>(
    seen: &mut HashSet<&'a str>,
    id: &'a str,
    context: &str,
) -> Result<(), ValidationError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(ValidationError::DuplicateId {
            id: id.to_string(),
            context: context.to_string(),
        })
    }
}

fn reference<S: std::borrow::Borrow<str> + std::hash::Hash + Eq>(
    known: &HashSet<S>,
    id: &str,
    context: &str,
) -> Result<(), ValidationError> {
    if known.contains(id) {
        Ok(())
    } else {
        Err(ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        })
    }
}

fn frame(bodies: &HashSet<&str>, id: &str, context: &str) -> Result<(), ValidationError> {
    if id == GROUND {
        return Ok(());
    }
    reference(bodies, id, context)
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}
