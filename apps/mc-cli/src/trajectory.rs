//! Conversions between tables and trajectories.

use mc_core::linspace;
use mc_rep::{ProblemRep, Trajectory};
use mc_table::{TableError, TimeSeriesTable, interpolate};
use nalgebra::{DMatrix, DVector};

use crate::error::{CliError, CliResult};

/// Pick the model's state and control columns out of `table`, in model order.
pub fn from_table(rep: &ProblemRep, table: &TimeSeriesTable) -> CliResult<Trajectory> {
    let states = columns(table, rep.model().state_variable_names())?;
    let controls = columns(table, rep.model().control_names())?;
    Ok(Trajectory::new(
        DVector::from_column_slice(table.times()),
        rep.model().state_variable_names().to_vec(),
        rep.model().control_names().to_vec(),
        states,
        controls,
    )?)
}

/// Resample every column onto `num_times` uniform points over the table's
/// time span. NaN samples are skipped.
pub fn resample(table: &TimeSeriesTable, num_times: usize) -> CliResult<TimeSeriesTable> {
    let (Some(&first), Some(&last)) = (table.times().first(), table.times().last()) else {
        return Err(CliError::InvalidArg {
            what: "trajectory table has no rows".to_string(),
        });
    };
    if num_times < 2 {
        return Err(CliError::InvalidArg {
            what: format!("resampling needs at least 2 points, got {num_times}"),
        });
    }
    let times = linspace(num_times, first, last);
    let mut data = DMatrix::zeros(num_times, table.num_columns());
    for c in 0..table.num_columns() {
        let column: Vec<f64> = table.data().column(c).iter().copied().collect();
        let values = interpolate(table.times(), &column, &times, true);
        for (r, v) in values.into_iter().enumerate() {
            data[(r, c)] = v;
        }
    }
    let mut resampled = TimeSeriesTable::new(times, table.labels().to_vec(), data)?;
    for (key, value) in table.metadata_entries() {
        resampled.set_metadata(key, value);
    }
    Ok(resampled)
}

/// Zero states and controls on `num_times` points spanning `[0, final_time]`.
pub fn zeros(rep: &ProblemRep, num_times: usize, final_time: f64) -> CliResult<Trajectory> {
    if num_times == 0 {
        return Err(CliError::InvalidArg {
            what: "need at least one time point".to_string(),
        });
    }
    if !(final_time >= 0.0) {
        return Err(CliError::InvalidArg {
            what: format!("final time must be non-negative, got {final_time}"),
        });
    }
    Ok(rep.zero_trajectory(DVector::from_vec(linspace(num_times, 0.0, final_time))))
}

/// Path-constraint errors labelled `<constraint>_<equation>`.
pub fn errors_table(
    rep: &ProblemRep,
    trajectory: &Trajectory,
    errors: DMatrix<f64>,
) -> CliResult<TimeSeriesTable> {
    let mut labels = Vec::with_capacity(errors.ncols());
    for name in rep.path_constraint_names() {
        labels.extend(rep.path_constraint(&name)?.constraint_info().equation_labels());
    }
    let mut table =
        TimeSeriesTable::new(trajectory.times().as_slice().to_vec(), labels, errors)?;
    table.set_metadata(mc_table::storage::NAME_KEY, "path_constraint_errors");
    Ok(table)
}

fn columns(table: &TimeSeriesTable, names: &[String]) -> CliResult<DMatrix<f64>> {
    let labels: Vec<&str> = names.iter().map(String::as_str).collect();
    let selected = table.select(&labels).map_err(|err| match err {
        TableError::ColumnNotFound { label } => CliError::InvalidArg {
            what: format!("trajectory table has no column '{label}'"),
        },
        other => other.into(),
    })?;
    Ok(selected.data().clone())
}
