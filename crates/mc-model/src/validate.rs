//! Model validation logic.

use std::collections::HashSet;

use crate::constraint::{ConstraintKind, Frame, KinematicConstraint};
use crate::error::{ModelError, ModelResult};
use crate::model::{Actuator, ActuatorKind, Body, Coordinate, Joint};

/// Validate the model structure: names are unique, all references exist,
/// joints carry the right number of coordinates.
pub(crate) fn validate_structure(
    bodies: &[Body],
    joints: &[Joint],
    coordinates: &[Coordinate],
    actuators: &[Actuator],
    constraints: &[KinematicConstraint],
) -> ModelResult<()> {
    validate_names("body", bodies.iter().map(|b| b.name.as_str()))?;
    validate_names("joint", joints.iter().map(|j| j.name.as_str()))?;
    validate_names("actuator", actuators.iter().map(|a| a.name.as_str()))?;
    validate_names("constraint", constraints.iter().map(|c| c.name.as_str()))?;

    // Coordinate names only need to be unique within their joint
    for joint in joints {
        validate_names(
            "coordinate",
            coordinates
                .iter()
                .filter(|c| c.joint == joint.id)
                .map(|c| c.name.as_str()),
        )?;
    }

    for body in bodies {
        let mass = body
            .properties
            .get("mass")
            .and_then(|m| m.as_scalar())
            .unwrap_or(0.0);
        if !mass.is_finite() || mass < 0.0 {
            return Err(ModelError::InvalidValue {
                what: format!("mass of body '{}'", body.name),
                reason: format!("must be finite and non-negative, got {mass}"),
            });
        }
    }

    for joint in joints {
        check_frame(&joint.name, joint.parent, bodies)?;
        check_frame(&joint.name, joint.child, bodies)?;
        if joint.parent == joint.child {
            return Err(ModelError::InvalidValue {
                what: format!("joint '{}'", joint.name),
                reason: "parent and child frames are the same".to_string(),
            });
        }
        if let Some(expected) = joint.kind.coordinate_count() {
            if joint.coordinates.len() != expected {
                return Err(ModelError::CoordinateCount {
                    joint: joint.name.clone(),
                    count: joint.coordinates.len(),
                    expected,
                });
            }
        }
    }

    for coord in coordinates {
        if coord.joint.index() as usize >= joints.len() {
            return Err(ModelError::DanglingReference {
                owner: format!("coordinate '{}'", coord.name),
                what: "joint",
                index: coord.joint.index(),
            });
        }
    }

    for actu in actuators {
        let owner = format!("actuator '{}'", actu.name);
        match actu.kind {
            ActuatorKind::Coordinate { coordinate }
            | ActuatorKind::ActivationCoordinate { coordinate } => {
                if coordinate.index() as usize >= coordinates.len() {
                    return Err(ModelError::DanglingReference {
                        owner,
                        what: "coordinate",
                        index: coordinate.index(),
                    });
                }
            }
            ActuatorKind::Point { body, direction } => {
                check_frame(&actu.name, Frame::Body(body), bodies)?;
                if direction.iter().all(|d| *d == 0.0) {
                    return Err(ModelError::InvalidValue {
                        what: owner,
                        reason: "direction must be non-zero".to_string(),
                    });
                }
            }
        }
    }

    for constraint in constraints {
        for frame in constraint.kind.frames() {
            check_frame(&constraint.name, frame, bodies)?;
        }
        for coord in constraint.kind.coordinates() {
            if coord.index() as usize >= coordinates.len() {
                return Err(ModelError::DanglingReference {
                    owner: format!("constraint '{}'", constraint.name),
                    what: "coordinate",
                    index: coord.index(),
                });
            }
        }
        if let ConstraintKind::CoordinateCoupler { ratio, .. } = constraint.kind {
            mc_core::ensure_finite(ratio, "coupler ratio")?;
        }
    }

    Ok(())
}

fn validate_names<'a>(set: &'static str, names: impl Iterator<Item = &'a str>) -> ModelResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() || name.contains('/') {
            return Err(ModelError::InvalidValue {
                what: format!("{set} name '{name}'"),
                reason: "names must be non-empty and must not contain '/'".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ModelError::DuplicateName {
                set,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_frame(owner: &str, frame: Frame, bodies: &[Body]) -> ModelResult<()> {
    match frame {
        Frame::Ground => Ok(()),
        Frame::Body(id) if (id.index() as usize) < bodies.len() => Ok(()),
        Frame::Body(id) => Err(ModelError::DanglingReference {
            owner: owner.to_string(),
            what: "body",
            index: id.index(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::ModelBuilder;
    use crate::constraint::{ConstraintKind, Frame};
    use crate::error::ModelError;
    use crate::model::{ActuatorKind, JointKind};
    use mc_core::{BodyId, Bounds, CoordId};

    fn range() -> Bounds {
        Bounds::new(-1.0, 1.0).unwrap()
    }

    #[test]
    fn duplicate_body_names_rejected() {
        let mut b = ModelBuilder::new("m");
        b.add_body("b", 1.0);
        b.add_body("b", 1.0);
        assert!(matches!(
            b.build(),
            Err(ModelError::DuplicateName { set: "body", .. })
        ));
    }

    #[test]
    fn same_coordinate_name_on_different_joints_is_fine() {
        let mut b = ModelBuilder::new("m");
        let b0 = b.add_body("b0", 1.0);
        let b1 = b.add_body("b1", 1.0);
        let j0 = b.add_joint("j0", JointKind::Pin, Frame::Ground, Frame::Body(b0));
        let j1 = b.add_joint("j1", JointKind::Pin, Frame::Body(b0), Frame::Body(b1));
        b.add_coordinate(j0, "q", range());
        b.add_coordinate(j1, "q", range());
        assert!(b.build().is_ok());
    }

    #[test]
    fn joint_coordinate_count_checked() {
        let mut b = ModelBuilder::new("m");
        let body = b.add_body("b", 1.0);
        b.add_joint("j", JointKind::Planar, Frame::Ground, Frame::Body(body));
        assert!(matches!(
            b.build(),
            Err(ModelError::CoordinateCount {
                count: 0,
                expected: 3,
                ..
            })
        ));
    }

    #[test]
    fn dangling_body_reference() {
        let mut b = ModelBuilder::new("m");
        b.add_joint(
            "j",
            JointKind::Weld,
            Frame::Ground,
            Frame::Body(BodyId::from_index(7)),
        );
        assert!(matches!(
            b.build(),
            Err(ModelError::DanglingReference { what: "body", index: 7, .. })
        ));
    }

    #[test]
    fn dangling_actuator_coordinate() {
        let mut b = ModelBuilder::new("m");
        b.add_actuator(
            "a",
            ActuatorKind::Coordinate {
                coordinate: CoordId::from_index(0),
            },
            1.0,
            range(),
        );
        assert!(matches!(
            b.build(),
            Err(ModelError::DanglingReference {
                what: "coordinate",
                ..
            })
        ));
    }

    #[test]
    fn dangling_constraint_coordinate() {
        let mut b = ModelBuilder::new("m");
        b.add_constraint(
            "c",
            ConstraintKind::ConstantSpeed {
                coordinate: CoordId::from_index(2),
                speed: 1.0,
            },
        );
        assert!(b.build().is_err());
    }

    #[test]
    fn slash_in_name_rejected() {
        let mut b = ModelBuilder::new("m");
        b.add_body("a/b", 1.0);
        assert!(matches!(b.build(), Err(ModelError::InvalidValue { .. })));
    }

    #[test]
    fn negative_mass_rejected() {
        let mut b = ModelBuilder::new("m");
        b.add_body("b", -1.0);
        assert!(matches!(b.build(), Err(ModelError::InvalidValue { .. })));
    }
}
