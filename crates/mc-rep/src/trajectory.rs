//! Sampled state and control trajectories.

use mc_core::Real;
use mc_problem::Point;
use nalgebra::{DMatrix, DVector};

use crate::error::{RepError, RepResult};

/// States and controls sampled at increasing times.
///
/// `states` and `controls` hold one row per time point. Column labels name
/// the model's state variables and controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: DVector<Real>,
    state_names: Vec<String>,
    control_names: Vec<String>,
    states: DMatrix<Real>,
    controls: DMatrix<Real>,
}

impl Trajectory {
    pub fn new(
        times: DVector<Real>,
        state_names: Vec<String>,
        control_names: Vec<String>,
        states: DMatrix<Real>,
        controls: DMatrix<Real>,
    ) -> RepResult<Self> {
        let n = times.len();
        if states.nrows() != n || controls.nrows() != n {
            return Err(RepError::TrajectoryMismatch {
                what: format!(
                    "{n} times but {} state rows and {} control rows",
                    states.nrows(),
                    controls.nrows()
                ),
            });
        }
        if states.ncols() != state_names.len() || controls.ncols() != control_names.len() {
            return Err(RepError::TrajectoryMismatch {
                what: "column count differs from label count".into(),
            });
        }
        if times.as_slice().windows(2).any(|w| w[1] < w[0]) {
            return Err(RepError::TrajectoryMismatch {
                what: "times must be non-decreasing".into(),
            });
        }
        Ok(Self {
            times,
            state_names,
            control_names,
            states,
            controls,
        })
    }

    /// All-zero states and controls on `times`.
    pub fn zeros(times: DVector<Real>, state_names: Vec<String>, control_names: Vec<String>) -> Self {
        let n = times.len();
        let states = DMatrix::zeros(n, state_names.len());
        let controls = DMatrix::zeros(n, control_names.len());
        Self {
            times,
            state_names,
            control_names,
            states,
            controls,
        }
    }

    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    pub fn times(&self) -> &DVector<Real> {
        &self.times
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn control_names(&self) -> &[String] {
        &self.control_names
    }

    pub fn states(&self) -> &DMatrix<Real> {
        &self.states
    }

    pub fn controls(&self) -> &DMatrix<Real> {
        &self.controls
    }

    pub fn set_state(&mut self, name: &str, values: &[Real]) -> RepResult<()> {
        let col = column(&self.state_names, name, "state")?;
        fill_column(&mut self.states, col, values)
    }

    pub fn set_control(&mut self, name: &str, values: &[Real]) -> RepResult<()> {
        let col = column(&self.control_names, name, "control")?;
        fill_column(&mut self.controls, col, values)
    }

    /// Row `i` as contiguous state and control vectors.
    pub(crate) fn row(&self, i: usize) -> (Vec<Real>, Vec<Real>) {
        (
            self.states.row(i).iter().copied().collect(),
            self.controls.row(i).iter().copied().collect(),
        )
    }
}

/// Owned copy of one trajectory row, lent out as a [`Point`].
pub(crate) struct RowBuf {
    time: Real,
    states: Vec<Real>,
    controls: Vec<Real>,
}

impl RowBuf {
    pub(crate) fn new(trajectory: &Trajectory, i: usize) -> Self {
        let (states, controls) = trajectory.row(i);
        Self {
            time: trajectory.times[i],
            states,
            controls,
        }
    }

    pub(crate) fn point(&self) -> Point<'_> {
        Point {
            time: self.time,
            states: &self.states,
            controls: &self.controls,
        }
    }
}

fn column(names: &[String], name: &str, what: &'static str) -> RepResult<usize> {
    names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| RepError::NotFound {
            what,
            name: name.to_string(),
        })
}

fn fill_column(matrix: &mut DMatrix<Real>, col: usize, values: &[Real]) -> RepResult<()> {
    if values.len() != matrix.nrows() {
        return Err(RepError::TrajectoryMismatch {
            what: format!("{} values for {} time points", values.len(), matrix.nrows()),
        });
    }
    for (r, v) in values.iter().enumerate() {
        matrix[(r, col)] = *v;
    }
    Ok(())
}
