//! Evaluation of goals and path constraints on a trajectory.
//!
//! Points are independent, so per-point work runs on rayon's pool unless
//! `MC_PARALLEL=0` asked for serial evaluation.

use mc_core::{Parallelism, Real, trapezoid};
use mc_problem::{GoalInput, GoalMode};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::warn;

use crate::error::{RepError, RepResult};
use crate::rep::ProblemRep;
use crate::trajectory::{RowBuf, Trajectory};

/// Outputs of one goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalValue {
    pub name: String,
    pub mode: GoalMode,
    pub values: DVector<Real>,
}

impl ProblemRep {
    /// Check that trajectory columns are in the model's state and control order.
    pub fn check_trajectory(&self, trajectory: &Trajectory) -> RepResult<()> {
        if trajectory.state_names() != self.model.state_variable_names() {
            return Err(RepError::TrajectoryMismatch {
                what: "state columns differ from the model's state variables".into(),
            });
        }
        if trajectory.control_names() != self.model.control_names() {
            return Err(RepError::TrajectoryMismatch {
                what: "control columns differ from the model's controls".into(),
            });
        }
        if trajectory.num_times() == 0 {
            return Err(RepError::TrajectoryMismatch {
                what: "trajectory has no time points".into(),
            });
        }
        Ok(())
    }

    /// An all-zero trajectory with the model's columns.
    pub fn zero_trajectory(&self, times: DVector<Real>) -> Trajectory {
        Trajectory::zeros(
            times,
            self.model.state_variable_names().to_vec(),
            self.model.control_names().to_vec(),
        )
    }

    /// Evaluate every goal. Integrands are integrated with the trapezoid rule.
    pub fn evaluate_goals(&self, trajectory: &Trajectory) -> RepResult<Vec<GoalValue>> {
        self.check_trajectory(trajectory)?;
        let n = trajectory.num_times();
        let first = RowBuf::new(trajectory, 0);
        let last = RowBuf::new(trajectory, n - 1);
        let times = trajectory.times().as_slice();

        let values = self
            .goals
            .iter()
            .map(|goal| {
                let integral = if goal.num_integrals() > 0 {
                    let integrand = self.map_points(n, |i| {
                        goal.calc_integrand(&RowBuf::new(trajectory, i).point())
                    });
                    trapezoid(times, &integrand)
                } else {
                    0.0
                };
                let input = GoalInput {
                    initial: first.point(),
                    final_: last.point(),
                    integral,
                };
                GoalValue {
                    name: goal.name().to_string(),
                    mode: goal.mode(),
                    values: goal.calc_goal(&input),
                }
            })
            .collect();
        Ok(values)
    }

    /// Sum of all goal outputs applied as costs.
    pub fn evaluate_cost(&self, trajectory: &Trajectory) -> RepResult<Real> {
        Ok(self
            .evaluate_goals(trajectory)?
            .iter()
            .filter(|v| v.mode == GoalMode::Cost)
            .map(|v| v.values.sum())
            .sum())
    }

    /// Path-constraint errors: one row per time point, one column per
    /// equation index.
    pub fn evaluate_path_constraints(&self, trajectory: &Trajectory) -> RepResult<DMatrix<Real>> {
        self.check_trajectory(trajectory)?;
        let n = trajectory.num_times();
        let width = self.num_path_constraint_equations();
        let rows = self.map_points(n, |i| {
            let buf = RowBuf::new(trajectory, i);
            let point = buf.point();
            let mut row = vec![0.0; width];
            for pc in &self.path_constraints {
                pc.calc_errors(&point, &mut row[pc.index_range()]);
            }
            row
        });
        Ok(DMatrix::from_fn(n, width, |r, c| rows[r][c]))
    }

    /// Largest distance of any path-constraint error from its bounds.
    pub fn path_constraint_violation(&self, trajectory: &Trajectory) -> RepResult<Real> {
        let errors = self.evaluate_path_constraints(trajectory)?;
        let mut worst: Real = 0.0;
        for pc in &self.path_constraints {
            for (col, bounds) in pc.index_range().zip(pc.constraint_info().bounds()) {
                for r in 0..errors.nrows() {
                    worst = worst.max(bounds.violation(errors[(r, col)]));
                }
            }
        }
        Ok(worst)
    }

    fn map_points<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self.parallelism {
            Parallelism::Serial => (0..n).map(f).collect(),
            Parallelism::Unset => (0..n).into_par_iter().map(f).collect(),
            Parallelism::Threads(threads) => {
                match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => pool.install(|| (0..n).into_par_iter().map(&f).collect()),
                    Err(err) => {
                        warn!(%err, threads, "could not build thread pool; using the global pool");
                        (0..n).into_par_iter().map(f).collect()
                    }
                }
            }
        }
    }
}
