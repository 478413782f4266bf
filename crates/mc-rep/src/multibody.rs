//! Multibody constraints and their Lagrange multipliers.

use mc_core::{Bounds, ConstraintIndex, FinalBounds, InitialBounds};
use mc_model::{EquationCounts, Model};
use mc_problem::{ConstraintInfo, VariableInfo};

/// An enabled kinematic constraint of the model, with the bounds on its
/// equations and one multiplier per equation.
#[derive(Debug, Clone, PartialEq)]
pub struct MultibodyConstraint {
    index: ConstraintIndex,
    path: String,
    counts: EquationCounts,
    info: ConstraintInfo,
    multipliers: Vec<VariableInfo>,
}

impl MultibodyConstraint {
    pub fn index(&self) -> ConstraintIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Path of the model constraint this was resolved from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn equation_counts(&self) -> EquationCounts {
        self.counts
    }

    pub fn num_equations(&self) -> usize {
        self.counts.total()
    }

    pub fn constraint_info(&self) -> &ConstraintInfo {
        &self.info
    }

    /// Position-level multipliers first, then velocity, then acceleration.
    pub fn multipliers(&self) -> &[VariableInfo] {
        &self.multipliers
    }
}

pub fn constraint_name(index: ConstraintIndex) -> String {
    format!("multibody_{}", index.index())
}

pub fn multiplier_name(index: ConstraintIndex, class: char, i: usize) -> String {
    format!("lambda_cid{}_{class}{i}", index.index())
}

/// Every enabled model constraint in engine-index order.
///
/// `constraint_bounds` applies to each scalar equation; `multiplier_bounds`
/// to each multiplier and to its initial and final bounds.
pub(crate) fn resolve(
    model: &Model,
    constraint_bounds: Bounds,
    multiplier_bounds: Bounds,
) -> Vec<MultibodyConstraint> {
    model
        .constraints()
        .iter()
        .filter(|c| c.enabled)
        .map(|c| {
            let counts = c.equation_counts();
            let info = ConstraintInfo::uniform(
                constraint_name(c.index),
                counts.total(),
                constraint_bounds,
            );
            let classes = [('p', counts.mp), ('v', counts.mv), ('a', counts.ma)];
            let multipliers = classes
                .iter()
                .flat_map(|&(class, n)| (0..n).map(move |i| (class, i)))
                .map(|(class, i)| {
                    VariableInfo::new(
                        multiplier_name(c.index, class, i),
                        multiplier_bounds,
                        Some(InitialBounds(multiplier_bounds)),
                        Some(FinalBounds(multiplier_bounds)),
                    )
                })
                .collect();
            MultibodyConstraint {
                index: c.index,
                path: c.path.clone(),
                counts,
                info,
                multipliers,
            }
        })
        .collect()
}
