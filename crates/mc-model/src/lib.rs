//! mc-model: the physical model an optimal-control problem is posed on.
//!
//! Provides:
//! - Model data structures (bodies, joints, coordinates, actuators,
//!   kinematic constraints) with named numeric properties
//! - Incremental declarative builder with validation
//! - Stable state/control indexing for trajectory columns
//!
//! The model is a description only: it answers the questions problem
//! reconciliation asks (which states and controls exist, their ranges, which
//! constraints are enabled and how many equations each has) and lets design
//! parameters rewrite property values. Dynamics live elsewhere.
//!
//! # Example
//!
//! ```
//! use mc_core::Bounds;
//! use mc_model::{ActuatorKind, Frame, JointKind, ModelBuilder};
//!
//! let mut builder = ModelBuilder::new("pendulum");
//! let body = builder.add_body("link", 1.0);
//! let joint = builder.add_joint("pin", JointKind::Pin, Frame::Ground, Frame::Body(body));
//! let q = builder.add_coordinate(joint, "angle", Bounds::new(-3.0, 3.0).unwrap());
//! builder.add_actuator(
//!     "torque",
//!     ActuatorKind::Coordinate { coordinate: q },
//!     1.0,
//!     Bounds::new(-10.0, 10.0).unwrap(),
//! );
//! let model = builder.build().unwrap();
//!
//! assert_eq!(model.state_variable_names().len(), 2);
//! assert_eq!(model.control_names(), &["/forceset/torque".to_string()]);
//! ```

pub mod builder;
pub mod constraint;
pub mod error;
pub mod indexing;
pub mod model;
pub mod property;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::{DEFAULT_ACTIVATION_TIME_CONSTANT, ModelBuilder};
pub use constraint::{ConstraintKind, EquationCounts, Frame, KinematicConstraint};
pub use error::{ModelError, ModelResult};
pub use indexing::StateIndex;
pub use model::{
    Actuator, ActuatorKind, Body, ComponentRef, Coordinate, Joint, JointKind, Model,
};
pub use property::{PropertySet, PropertyValue};
