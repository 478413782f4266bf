//! Core model data structures.

use std::collections::HashMap;

use mc_core::{ActuatorId, BodyId, Bounds, ConstraintIndex, CoordId, JointId, Real};

use crate::constraint::{Frame, KinematicConstraint};
use crate::error::{ModelError, ModelResult};
use crate::indexing::StateIndex;
use crate::property::{PropertySet, PropertyValue};

/// A rigid body. Properties: `mass`, `mass_center`, `inertia`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub path: String,
    pub properties: PropertySet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// One rotational coordinate.
    Pin,
    /// One translational coordinate.
    Slider,
    /// Rotation about z plus translation in x and y.
    Planar,
    /// No coordinates.
    Weld,
    /// Any number of coordinates.
    Custom,
}

impl JointKind {
    /// Required coordinate count, or `None` when any count is accepted.
    pub fn coordinate_count(&self) -> Option<usize> {
        match self {
            JointKind::Pin | JointKind::Slider => Some(1),
            JointKind::Planar => Some(3),
            JointKind::Weld => Some(0),
            JointKind::Custom => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub id: JointId,
    pub name: String,
    pub path: String,
    pub kind: JointKind,
    pub parent: Frame,
    pub child: Frame,
    pub coordinates: Vec<CoordId>,
    pub properties: PropertySet,
}

/// A generalized coordinate. Properties: `default_value`, `default_speed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub id: CoordId,
    pub name: String,
    pub path: String,
    pub joint: JointId,
    pub range: Bounds,
    pub properties: PropertySet,
}

impl Coordinate {
    pub fn value_state_name(&self) -> String {
        format!("{}/value", self.path)
    }

    pub fn speed_state_name(&self) -> String {
        format!("{}/speed", self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorKind {
    /// Generalized force applied directly to a coordinate.
    Coordinate { coordinate: CoordId },
    /// Coordinate actuator driven through first-order activation dynamics.
    /// Contributes an `activation` state.
    ActivationCoordinate { coordinate: CoordId },
    /// Point force on a body along a fixed direction.
    Point { body: BodyId, direction: [Real; 3] },
}

/// A scalar actuator: one control per actuator.
/// Properties: `optimal_force`, and `activation_time_constant` when it
/// has activation dynamics.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuator {
    pub id: ActuatorId,
    pub name: String,
    pub path: String,
    pub kind: ActuatorKind,
    pub control_limits: Bounds,
    pub properties: PropertySet,
}

impl Actuator {
    pub fn min_control(&self) -> Real {
        self.control_limits.lower()
    }

    pub fn max_control(&self) -> Real {
        self.control_limits.upper()
    }

    pub fn has_activation_state(&self) -> bool {
        matches!(self.kind, ActuatorKind::ActivationCoordinate { .. })
    }

    pub fn activation_state_name(&self) -> Option<String> {
        self.has_activation_state()
            .then(|| format!("{}/activation", self.path))
    }

    pub fn coordinate(&self) -> Option<CoordId> {
        match self.kind {
            ActuatorKind::Coordinate { coordinate }
            | ActuatorKind::ActivationCoordinate { coordinate } => Some(coordinate),
            ActuatorKind::Point { .. } => None,
        }
    }
}

/// What lives at a component path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRef {
    Body(BodyId),
    Joint(JointId),
    Coordinate(CoordId),
    Actuator(ActuatorId),
    Constraint(ConstraintIndex),
}

/// A validated model: bodies, joints, coordinates, actuators and kinematic
/// constraints, addressable by index or by path.
///
/// Topology is frozen at `build()`. Afterwards only property values and
/// constraint enabled flags may change.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) bodies: Vec<Body>,
    pub(crate) joints: Vec<Joint>,
    pub(crate) coordinates: Vec<Coordinate>,
    pub(crate) actuators: Vec<Actuator>,
    pub(crate) constraints: Vec<KinematicConstraint>,
    pub(crate) paths: HashMap<String, ComponentRef>,
    pub(crate) index: StateIndex,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// All scalar actuators, in control order.
    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    /// All kinematic constraints in engine-index order, enabled or not.
    pub fn constraints(&self) -> &[KinematicConstraint] {
        &self.constraints
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index() as usize)
    }

    pub fn coordinate(&self, id: CoordId) -> Option<&Coordinate> {
        self.coordinates.get(id.index() as usize)
    }

    pub fn actuator(&self, id: ActuatorId) -> Option<&Actuator> {
        self.actuators.get(id.index() as usize)
    }

    pub fn constraint(&self, index: ConstraintIndex) -> Option<&KinematicConstraint> {
        self.constraints.get(index.index() as usize)
    }

    /// Name/column index of every state variable and control.
    pub fn state_index(&self) -> &StateIndex {
        &self.index
    }

    /// State variable names in system order.
    pub fn state_variable_names(&self) -> &[String] {
        self.index.state_names()
    }

    /// Control names (actuator paths) in system order.
    pub fn control_names(&self) -> &[String] {
        self.index.control_names()
    }

    pub fn find(&self, path: &str) -> Option<ComponentRef> {
        self.paths.get(path).copied()
    }

    pub fn find_coordinate(&self, path: &str) -> Option<&Coordinate> {
        match self.find(path)? {
            ComponentRef::Coordinate(id) => self.coordinate(id),
            _ => None,
        }
    }

    pub fn find_actuator(&self, path: &str) -> Option<&Actuator> {
        match self.find(path)? {
            ComponentRef::Actuator(id) => self.actuator(id),
            _ => None,
        }
    }

    /// Enable or disable a kinematic constraint. Disabled constraints keep
    /// their engine index.
    pub fn set_constraint_enabled(
        &mut self,
        index: ConstraintIndex,
        enabled: bool,
    ) -> ModelResult<()> {
        let len = self.constraints.len();
        let constraint = self
            .constraints
            .get_mut(index.index() as usize)
            .ok_or(mc_core::CoreError::IndexOob {
                what: "constraint index",
                index: index.index() as usize,
                len,
            })?;
        constraint.enabled = enabled;
        Ok(())
    }

    /// Property table of the component at `path`.
    pub fn properties(&self, path: &str) -> ModelResult<&PropertySet> {
        let component = self.find(path).ok_or_else(|| ModelError::UnknownComponent {
            path: path.to_string(),
        })?;
        let set = match component {
            ComponentRef::Body(id) => &self.bodies[id.index() as usize].properties,
            ComponentRef::Joint(id) => &self.joints[id.index() as usize].properties,
            ComponentRef::Coordinate(id) => &self.coordinates[id.index() as usize].properties,
            ComponentRef::Actuator(id) => &self.actuators[id.index() as usize].properties,
            ComponentRef::Constraint(_) => return Ok(&EMPTY_PROPERTIES),
        };
        Ok(set)
    }

    fn properties_mut(&mut self, path: &str) -> ModelResult<&mut PropertySet> {
        let component = self.find(path).ok_or_else(|| ModelError::UnknownComponent {
            path: path.to_string(),
        })?;
        match component {
            ComponentRef::Body(id) => Ok(&mut self.bodies[id.index() as usize].properties),
            ComponentRef::Joint(id) => Ok(&mut self.joints[id.index() as usize].properties),
            ComponentRef::Coordinate(id) => {
                Ok(&mut self.coordinates[id.index() as usize].properties)
            }
            ComponentRef::Actuator(id) => Ok(&mut self.actuators[id.index() as usize].properties),
            ComponentRef::Constraint(_) => Err(ModelError::InvalidValue {
                what: path.to_string(),
                reason: "constraints carry no editable properties".to_string(),
            }),
        }
    }

    pub fn property(&self, path: &str, name: &str) -> ModelResult<&PropertyValue> {
        self.properties(path)?
            .get(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                path: path.to_string(),
                property: name.to_string(),
            })
    }

    fn property_mut(&mut self, path: &str, name: &str) -> ModelResult<&mut PropertyValue> {
        self.properties_mut(path)?
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                path: path.to_string(),
                property: name.to_string(),
            })
    }

    /// Overwrite a scalar property.
    pub fn set_scalar_property(&mut self, path: &str, name: &str, value: Real) -> ModelResult<()> {
        let slot = self.property_mut(path, name)?;
        match slot {
            PropertyValue::Scalar(v) => {
                *v = value;
                Ok(())
            }
            other => Err(ModelError::PropertyKind {
                path: path.to_string(),
                property: name.to_string(),
                expected: "scalar",
                actual: other.kind_name(),
            }),
        }
    }

    /// Overwrite one element of a vec3 property.
    pub fn set_vec3_element(
        &mut self,
        path: &str,
        name: &str,
        element: usize,
        value: Real,
    ) -> ModelResult<()> {
        let slot = self.property_mut(path, name)?;
        match slot {
            PropertyValue::Vec3(v) => {
                let len = v.len();
                let entry = v.get_mut(element).ok_or(mc_core::CoreError::IndexOob {
                    what: "vec3 element",
                    index: element,
                    len,
                })?;
                *entry = value;
                Ok(())
            }
            other => Err(ModelError::PropertyKind {
                path: path.to_string(),
                property: name.to_string(),
                expected: "vec3",
                actual: other.kind_name(),
            }),
        }
    }
}

static EMPTY_PROPERTIES: PropertySet = PropertySet::empty();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;

    fn slider_model() -> Model {
        let mut b = ModelBuilder::new("slider");
        let body = b.add_body("block", 2.0);
        let j = b.add_joint("slide", JointKind::Slider, Frame::Ground, Frame::Body(body));
        let q = b.add_coordinate(j, "x", Bounds::new(-1.0, 1.0).unwrap());
        b.add_actuator(
            "force",
            ActuatorKind::Coordinate { coordinate: q },
            10.0,
            Bounds::new(-1.0, 1.0).unwrap(),
        );
        b.build().unwrap()
    }

    #[test]
    fn paths_resolve() {
        let model = slider_model();
        assert_eq!(model.find("/bodyset/block"), Some(ComponentRef::Body(BodyId::from_index(0))));
        assert!(model.find_coordinate("/jointset/slide/x").is_some());
        assert!(model.find_actuator("/forceset/force").is_some());
        assert!(model.find("/forceset/missing").is_none());
    }

    #[test]
    fn scalar_property_write() {
        let mut model = slider_model();
        model.set_scalar_property("/bodyset/block", "mass", 3.5).unwrap();
        assert_eq!(
            model.property("/bodyset/block", "mass").unwrap(),
            &PropertyValue::Scalar(3.5)
        );
    }

    #[test]
    fn vec3_property_write_and_kind_mismatch() {
        let mut model = slider_model();
        model
            .set_vec3_element("/bodyset/block", "mass_center", 1, -0.25)
            .unwrap();
        let mc = model
            .property("/bodyset/block", "mass_center")
            .unwrap()
            .as_vec3()
            .unwrap();
        assert_eq!(mc[1], -0.25);

        let err = model
            .set_scalar_property("/bodyset/block", "mass_center", 1.0)
            .unwrap_err();
        assert!(matches!(err, ModelError::PropertyKind { .. }));
    }

    #[test]
    fn unknown_property() {
        let mut model = slider_model();
        let err = model
            .set_scalar_property("/bodyset/block", "color", 1.0)
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownProperty { .. }));
    }
}
