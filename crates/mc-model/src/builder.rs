//! Incremental, declarative model builder.

use std::collections::HashMap;

use mc_core::{ActuatorId, BodyId, Bounds, ConstraintIndex, CoordId, JointId, Real};
use tracing::debug;

use crate::constraint::{ConstraintKind, Frame, KinematicConstraint};
use crate::error::{ModelError, ModelResult};
use crate::indexing::StateIndex;
use crate::model::{
    Actuator, ActuatorKind, Body, ComponentRef, Coordinate, Joint, JointKind, Model,
};
use crate::property::{PropertySet, PropertyValue};
use crate::validate;

/// Activation time constant given to actuators with activation dynamics (s).
pub const DEFAULT_ACTIVATION_TIME_CONSTANT: Real = 0.015;

/// Builder for assembling a model from literal parameters.
///
/// Use the `add_*` methods to declare components, then call `build()` to
/// validate and freeze the topology into a `Model`.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    bodies: Vec<Body>,
    joints: Vec<Joint>,
    coordinates: Vec<Coordinate>,
    actuators: Vec<Actuator>,
    constraints: Vec<KinematicConstraint>,
}

impl ModelBuilder {
    /// Create a new empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a body with its mass at the body origin and unit inertia.
    pub fn add_body(&mut self, name: impl Into<String>, mass: Real) -> BodyId {
        self.add_body_with(name, mass, [0.0; 3], [1.0; 3])
    }

    /// Add a body with explicit mass center and principal inertia.
    pub fn add_body_with(
        &mut self,
        name: impl Into<String>,
        mass: Real,
        mass_center: [Real; 3],
        inertia: [Real; 3],
    ) -> BodyId {
        let id = BodyId::from_index(self.bodies.len() as u32);
        self.bodies.push(Body {
            id,
            name: name.into(),
            path: String::new(),
            properties: PropertySet::new()
                .with("mass", PropertyValue::Scalar(mass))
                .with("mass_center", PropertyValue::Vec3(mass_center))
                .with("inertia", PropertyValue::Vec3(inertia)),
        });
        id
    }

    /// Add a joint between two frames. Coordinates are attached afterwards
    /// with `add_coordinate`.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        kind: JointKind,
        parent: Frame,
        child: Frame,
    ) -> JointId {
        let id = JointId::from_index(self.joints.len() as u32);
        self.joints.push(Joint {
            id,
            name: name.into(),
            path: String::new(),
            kind,
            parent,
            child,
            coordinates: Vec::new(),
            properties: PropertySet::new(),
        });
        id
    }

    /// Add a coordinate to a joint with the given range.
    pub fn add_coordinate(
        &mut self,
        joint: JointId,
        name: impl Into<String>,
        range: Bounds,
    ) -> CoordId {
        let id = CoordId::from_index(self.coordinates.len() as u32);
        if let Some(j) = self.joints.get_mut(joint.index() as usize) {
            j.coordinates.push(id);
        }
        self.coordinates.push(Coordinate {
            id,
            name: name.into(),
            path: String::new(),
            joint,
            range,
            properties: PropertySet::new()
                .with("default_value", PropertyValue::Scalar(0.0))
                .with("default_speed", PropertyValue::Scalar(0.0)),
        });
        id
    }

    /// Set the default value and speed of a coordinate.
    pub fn set_coordinate_default(&mut self, coord: CoordId, value: Real, speed: Real) {
        if let Some(c) = self.coordinates.get_mut(coord.index() as usize) {
            c.properties = PropertySet::new()
                .with("default_value", PropertyValue::Scalar(value))
                .with("default_speed", PropertyValue::Scalar(speed));
        }
    }

    /// Add a scalar actuator.
    pub fn add_actuator(
        &mut self,
        name: impl Into<String>,
        kind: ActuatorKind,
        optimal_force: Real,
        control_limits: Bounds,
    ) -> ActuatorId {
        let id = ActuatorId::from_index(self.actuators.len() as u32);
        let mut properties =
            PropertySet::new().with("optimal_force", PropertyValue::Scalar(optimal_force));
        if matches!(kind, ActuatorKind::ActivationCoordinate { .. }) {
            properties = properties.with(
                "activation_time_constant",
                PropertyValue::Scalar(DEFAULT_ACTIVATION_TIME_CONSTANT),
            );
        }
        self.actuators.push(Actuator {
            id,
            name: name.into(),
            path: String::new(),
            kind,
            control_limits,
            properties,
        });
        id
    }

    /// Add an enabled kinematic constraint. Its engine index is its position
    /// among all constraints.
    pub fn add_constraint(&mut self, name: impl Into<String>, kind: ConstraintKind) -> ConstraintIndex {
        let index = ConstraintIndex::from_index(self.constraints.len() as u32);
        self.constraints.push(KinematicConstraint {
            index,
            name: name.into(),
            path: String::new(),
            kind,
            enabled: true,
        });
        index
    }

    pub fn set_constraint_enabled(&mut self, index: ConstraintIndex, enabled: bool) {
        if let Some(c) = self.constraints.get_mut(index.index() as usize) {
            c.enabled = enabled;
        }
    }

    /// Add an unbounded reserve coordinate actuator to every coordinate that
    /// is not the dependent side of an enabled coupler, whether or not another
    /// actuator already drives it. A reserve is named `reserve_` followed by
    /// the coordinate path with `/` replaced by `_`, e.g.
    /// `reserve__jointset_elbow_flexion`.
    pub fn add_reserve_actuators(&mut self, optimal_force: Real) -> ModelResult<Vec<ActuatorId>> {
        if !(optimal_force > 0.0) {
            return Err(ModelError::InvalidValue {
                what: "reserve optimal force".to_string(),
                reason: format!("must be positive, got {optimal_force}"),
            });
        }

        let coupled: Vec<CoordId> = self
            .constraints
            .iter()
            .filter(|c| c.enabled)
            .filter_map(|c| match c.kind {
                ConstraintKind::CoordinateCoupler { dependent, .. } => Some(dependent),
                _ => None,
            })
            .collect();

        let targets: Vec<(CoordId, String)> = self
            .coordinates
            .iter()
            .filter(|c| !coupled.contains(&c.id))
            .map(|c| {
                let joint = self
                    .joints
                    .get(c.joint.index() as usize)
                    .map(|j| j.name.as_str())
                    .unwrap_or("unknown");
                let path = format!("/jointset/{}/{}", joint, c.name);
                (c.id, format!("reserve_{}", path.replace('/', "_")))
            })
            .collect();

        let mut added = Vec::with_capacity(targets.len());
        for (coordinate, name) in targets {
            debug!(actuator = %name, "adding reserve actuator");
            added.push(self.add_actuator(
                name,
                ActuatorKind::Coordinate { coordinate },
                optimal_force,
                Bounds::unbounded(),
            ));
        }
        Ok(added)
    }

    /// Remove an actuator by name. Later actuators shift down one index.
    pub fn remove_actuator(&mut self, name: &str) -> ModelResult<()> {
        let pos = self
            .actuators
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| ModelError::UnknownComponent {
                path: format!("/forceset/{name}"),
            })?;
        self.actuators.remove(pos);
        for (i, actu) in self.actuators.iter_mut().enumerate().skip(pos) {
            actu.id = ActuatorId::from_index(i as u32);
        }
        Ok(())
    }

    /// Build and validate the model, returning a frozen `Model`.
    pub fn build(mut self) -> ModelResult<Model> {
        validate::validate_structure(
            &self.bodies,
            &self.joints,
            &self.coordinates,
            &self.actuators,
            &self.constraints,
        )?;

        self.assign_paths();
        let paths = self.build_path_map()?;
        let index = StateIndex::new(&self.coordinates, &self.actuators);

        debug!(
            model = %self.name,
            bodies = self.bodies.len(),
            coordinates = self.coordinates.len(),
            actuators = self.actuators.len(),
            constraints = self.constraints.len(),
            "model built"
        );

        Ok(Model {
            name: self.name,
            bodies: self.bodies,
            joints: self.joints,
            coordinates: self.coordinates,
            actuators: self.actuators,
            constraints: self.constraints,
            paths,
            index,
        })
    }

    fn assign_paths(&mut self) {
        for body in &mut self.bodies {
            body.path = format!("/bodyset/{}", body.name);
        }
        for joint in &mut self.joints {
            joint.path = format!("/jointset/{}", joint.name);
        }
        for coord in &mut self.coordinates {
            coord.path = format!("{}/{}", self.joints[coord.joint.index() as usize].path, coord.name);
        }
        for actu in &mut self.actuators {
            actu.path = format!("/forceset/{}", actu.name);
        }
        for constraint in &mut self.constraints {
            constraint.path = format!("/constraintset/{}", constraint.name);
        }
    }

    fn build_path_map(&self) -> ModelResult<HashMap<String, ComponentRef>> {
        let mut paths = HashMap::new();
        let entries = self
            .bodies
            .iter()
            .map(|b| (b.path.clone(), ComponentRef::Body(b.id)))
            .chain(self.joints.iter().map(|j| (j.path.clone(), ComponentRef::Joint(j.id))))
            .chain(
                self.coordinates
                    .iter()
                    .map(|c| (c.path.clone(), ComponentRef::Coordinate(c.id))),
            )
            .chain(
                self.actuators
                    .iter()
                    .map(|a| (a.path.clone(), ComponentRef::Actuator(a.id))),
            )
            .chain(
                self.constraints
                    .iter()
                    .map(|c| (c.path.clone(), ComponentRef::Constraint(c.index))),
            );
        for (path, component) in entries {
            if paths.insert(path.clone(), component).is_some() {
                return Err(ModelError::DuplicateName {
                    set: "component path",
                    name: path,
                });
            }
        }
        Ok(paths)
    }
}
