//! Problem file schema definitions.
//!
//! A file holds one model and the single phase posed on it. Bounds are
//! written as a number (equality) or a `[lower, upper]` pair; an omitted
//! bound means unbounded unless the field documents another default.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mc_core::Bounds;
use mc_table::TimeSeriesTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub model: ModelDef,
    #[serde(default)]
    pub phase: PhaseDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<BodyDef>,
    #[serde(default)]
    pub joints: Vec<JointDef>,
    #[serde(default)]
    pub actuators: Vec<ActuatorDef>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDef>,
    /// Actuators dropped after the model is assembled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_actuators: Vec<String>,
    /// Optimal force of reserve actuators added to every coordinate that is
    /// not the dependent side of a coupler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_actuators: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyDef {
    pub name: String,
    pub mass: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_center: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<[f64; 3]>,
}

/// `parent` and `child` name a body or `ground`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JointDef {
    pub name: String,
    pub kind: JointKindDef,
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub coordinates: Vec<CoordinateDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JointKindDef {
    Pin,
    Slider,
    Planar,
    Weld,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinateDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Bounds>,
    #[serde(default)]
    pub default_value: f64,
    #[serde(default)]
    pub default_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActuatorDef {
    pub name: String,
    pub kind: ActuatorKindDef,
    pub optimal_force: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_limits: Option<Bounds>,
}

/// Coordinates are referenced as `<joint>/<coordinate>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ActuatorKindDef {
    Coordinate { coordinate: String },
    ActivationCoordinate { coordinate: String },
    Point { body: String, direction: [f64; 3] },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub kind: ConstraintKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConstraintKindDef {
    Weld {
        frame_a: String,
        frame_b: String,
    },
    Point {
        frame_a: String,
        frame_b: String,
    },
    PointOnLine {
        line_frame: String,
        follower: String,
    },
    PointInPlane {
        plane_frame: String,
        follower: String,
    },
    CoordinateCoupler {
        independent: String,
        dependent: String,
        #[serde(default = "default_ratio")]
        ratio: f64,
    },
    ConstantSpeed {
        coordinate: String,
        speed: f64,
    },
    NoSlip1D {
        frame_a: String,
        frame_b: String,
    },
    ConstantAcceleration {
        coordinate: String,
        acceleration: f64,
    },
    Custom {
        #[serde(default)]
        mp: usize,
        #[serde(default)]
        mv: usize,
        #[serde(default)]
        ma: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PhaseDef {
    /// Defaults to `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_initial: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_final: Option<Bounds>,
    #[serde(default)]
    pub states: Vec<VariableDef>,
    #[serde(default)]
    pub controls: Vec<VariableDef>,
    #[serde(default)]
    pub goals: Vec<GoalDef>,
    #[serde(default)]
    pub path_constraints: Vec<PathConstraintDef>,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    /// Bounds for undeclared speed states; defaults to `[-50, 50]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_speed_bounds: Option<Bounds>,
    /// Defaults to `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multibody_constraint_bounds: Option<Bounds>,
    /// Defaults to `[-1000, 1000]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariableDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Bounds>,
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_: Option<Bounds>,
}

/// `type` names a goal registered in the [`mc_problem::Registry`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Unset means the goal type's default mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_constraint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_bounds: Option<Bounds>,
    #[serde(default)]
    pub args: ArgsDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathConstraintDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub args: ArgsDef,
}

/// Arguments handed to a registered factory. Which ones are read depends on
/// the type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ArgsDef {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// A reference table, either stored in a file next to the project or
/// written inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReferenceDef {
    File {
        /// `.sto`/`.mot`, `.csv` or `.json`, relative to the project file.
        file: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lowpass_cutoff_hz: Option<f64>,
    },
    Inline(TimeSeriesTable),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetDef {
    pub state: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDef {
    pub name: String,
    pub components: Vec<String>,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<usize>,
    pub bounds: Bounds,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

fn default_ratio() -> f64 {
    1.0
}
