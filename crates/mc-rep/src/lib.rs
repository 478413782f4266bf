//! mc-rep: reconciliation of an optimal-control problem against its model.
//!
//! [`ProblemRep::new`] takes a [`mc_problem::Problem`] and produces the
//! queryable report a transcription layer consumes:
//!
//! - state and control infos, user-declared ones merged with defaults from
//!   the model's coordinate ranges and actuator control limits
//! - one [`MultibodyConstraint`] per enabled kinematic constraint, with a
//!   Lagrange multiplier per scalar equation (`lambda_cid<i>_p<j>`, `_v<j>`,
//!   `_a<j>`)
//! - bound goals and parameters, and path constraints owning contiguous
//!   equation index ranges in declaration order
//!
//! The report is read-only apart from parameter application, and can
//! evaluate goals and path constraints on a sampled [`Trajectory`].
//!
//! # Example
//!
//! ```
//! use mc_core::Bounds;
//! use mc_model::{ActuatorKind, Frame, JointKind, ModelBuilder};
//! use mc_problem::Problem;
//! use mc_rep::ProblemRep;
//!
//! let mut builder = ModelBuilder::new("slider");
//! let body = builder.add_body("block", 1.0);
//! let joint = builder.add_joint("slide", JointKind::Slider, Frame::Ground, Frame::Body(body));
//! let x = builder.add_coordinate(joint, "x", Bounds::new(0.0, 1.0).unwrap());
//! builder.add_actuator(
//!     "force",
//!     ActuatorKind::Coordinate { coordinate: x },
//!     10.0,
//!     Bounds::new(-1.0, 1.0).unwrap(),
//! );
//!
//! let problem = Problem::new("slide", builder.build().unwrap());
//! let rep = ProblemRep::new(&problem).unwrap();
//!
//! assert_eq!(
//!     rep.state_info_names(),
//!     vec!["/jointset/slide/x/speed", "/jointset/slide/x/value"]
//! );
//! assert!(rep.control_info("/no/such/actuator").is_err());
//! ```

pub mod error;
pub mod evaluate;
pub mod multibody;
pub mod rep;
pub mod trajectory;

pub use error::{RepError, RepResult};
pub use evaluate::GoalValue;
pub use multibody::{MultibodyConstraint, constraint_name, multiplier_name};
pub use rep::ProblemRep;
pub use trajectory::Trajectory;
