//! Kinematic constraints intrinsic to the model.

use mc_core::{BodyId, ConstraintIndex, CoordId, Real};

/// A frame a constraint or joint attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Ground,
    Body(BodyId),
}

/// Number of scalar constraint equations at each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquationCounts {
    /// Position-level (holonomic).
    pub mp: usize,
    /// Velocity-level (nonholonomic).
    pub mv: usize,
    /// Acceleration-only.
    pub ma: usize,
}

impl EquationCounts {
    pub const fn new(mp: usize, mv: usize, ma: usize) -> Self {
        Self { mp, mv, ma }
    }

    pub fn total(&self) -> usize {
        self.mp + self.mv + self.ma
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Rigidly attaches two frames.
    Weld { frame_a: Frame, frame_b: Frame },
    /// Coincident points on two frames (ball-and-socket loop closure).
    Point { frame_a: Frame, frame_b: Frame },
    /// A follower point restricted to a line fixed on another frame.
    PointOnLine { line_frame: Frame, follower: Frame },
    /// A follower point restricted to a plane fixed on another frame.
    PointInPlane { plane_frame: Frame, follower: Frame },
    /// `q_dependent = ratio * q_independent`.
    CoordinateCoupler {
        independent: CoordId,
        dependent: CoordId,
        ratio: Real,
    },
    /// Prescribed generalized speed.
    ConstantSpeed { coordinate: CoordId, speed: Real },
    /// One-dimensional rolling without slip between two frames.
    NoSlip1D { frame_a: Frame, frame_b: Frame },
    /// Prescribed generalized acceleration.
    ConstantAcceleration {
        coordinate: CoordId,
        acceleration: Real,
    },
    /// Equation counts supplied directly.
    Custom { counts: EquationCounts },
}

impl ConstraintKind {
    pub fn equation_counts(&self) -> EquationCounts {
        match self {
            ConstraintKind::Weld { .. } => EquationCounts::new(6, 0, 0),
            ConstraintKind::Point { .. } => EquationCounts::new(3, 0, 0),
            ConstraintKind::PointOnLine { .. } => EquationCounts::new(2, 0, 0),
            ConstraintKind::PointInPlane { .. } => EquationCounts::new(1, 0, 0),
            ConstraintKind::CoordinateCoupler { .. } => EquationCounts::new(1, 0, 0),
            ConstraintKind::ConstantSpeed { .. } => EquationCounts::new(0, 1, 0),
            ConstraintKind::NoSlip1D { .. } => EquationCounts::new(0, 1, 0),
            ConstraintKind::ConstantAcceleration { .. } => EquationCounts::new(0, 0, 1),
            ConstraintKind::Custom { counts } => *counts,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConstraintKind::Weld { .. } => "Weld",
            ConstraintKind::Point { .. } => "Point",
            ConstraintKind::PointOnLine { .. } => "PointOnLine",
            ConstraintKind::PointInPlane { .. } => "PointInPlane",
            ConstraintKind::CoordinateCoupler { .. } => "CoordinateCoupler",
            ConstraintKind::ConstantSpeed { .. } => "ConstantSpeed",
            ConstraintKind::NoSlip1D { .. } => "NoSlip1D",
            ConstraintKind::ConstantAcceleration { .. } => "ConstantAcceleration",
            ConstraintKind::Custom { .. } => "Custom",
        }
    }

    pub(crate) fn frames(&self) -> Vec<Frame> {
        match self {
            ConstraintKind::Weld { frame_a, frame_b }
            | ConstraintKind::Point { frame_a, frame_b }
            | ConstraintKind::NoSlip1D { frame_a, frame_b } => vec![*frame_a, *frame_b],
            ConstraintKind::PointOnLine {
                line_frame,
                follower,
            } => vec![*line_frame, *follower],
            ConstraintKind::PointInPlane {
                plane_frame,
                follower,
            } => vec![*plane_frame, *follower],
            _ => Vec::new(),
        }
    }

    pub(crate) fn coordinates(&self) -> Vec<CoordId> {
        match self {
            ConstraintKind::CoordinateCoupler {
                independent,
                dependent,
                ..
            } => vec![*independent, *dependent],
            ConstraintKind::ConstantSpeed { coordinate, .. }
            | ConstraintKind::ConstantAcceleration { coordinate, .. } => vec![*coordinate],
            _ => Vec::new(),
        }
    }
}

/// A kinematic constraint as stored in the model.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicConstraint {
    pub index: ConstraintIndex,
    pub name: String,
    pub path: String,
    pub kind: ConstraintKind,
    pub enabled: bool,
}

impl KinematicConstraint {
    pub fn equation_counts(&self) -> EquationCounts {
        self.kind.equation_counts()
    }
}
