//! Zero-phase low-pass filtering.
//!
//! Each column is run through a second-order Butterworth section forwards
//! and then backwards, which cancels the phase lag and squares the
//! magnitude response.

use mc_core::{Real, Tolerances, nearly_equal};
use nalgebra::DMatrix;

use crate::{TableError, TableResult, TimeSeriesTable};

/// Relative spacing tolerance for treating samples as uniform.
const UNIFORM_TOL: Real = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: Real,
    b1: Real,
    b2: Real,
    a1: Real,
    a2: Real,
}

impl Biquad {
    fn butterworth_lowpass(cutoff: Real, sample_rate: Real) -> Self {
        let c = 1.0 / (std::f64::consts::PI * cutoff / sample_rate).tan();
        let sqrt2 = std::f64::consts::SQRT_2;
        let b0 = 1.0 / (1.0 + sqrt2 * c + c * c);
        Self {
            b0,
            b1: 2.0 * b0,
            b2: b0,
            a1: 2.0 * (1.0 - c * c) * b0,
            a2: (1.0 - sqrt2 * c + c * c) * b0,
        }
    }

    /// Filter in place, starting from the steady state of the first sample.
    fn run(&self, signal: &mut [Real]) {
        let Some(&first) = signal.first() else {
            return;
        };
        let (mut x1, mut x2, mut y1, mut y2) = (first, first, first, first);
        for v in signal.iter_mut() {
            let x0 = *v;
            let y0 = self.b0 * x0 + self.b1 * x1 + self.b2 * x2 - self.a1 * y1 - self.a2 * y2;
            x2 = x1;
            x1 = x0;
            y2 = y1;
            y1 = y0;
            *v = y0;
        }
    }
}

/// Low-pass filter every column of `table` at `cutoff` Hz.
///
/// Times must be uniformly spaced. With `pad`, each column is extended by an
/// odd reflection about its endpoints before filtering to reduce start-up
/// transients; the padding is removed afterwards.
pub fn filter_lowpass(table: &TimeSeriesTable, cutoff: Real, pad: bool) -> TableResult<TimeSeriesTable> {
    if !(cutoff > 0.0) || !cutoff.is_finite() {
        return Err(TableError::InvalidArg {
            what: format!("cutoff frequency must be positive, got {cutoff}"),
        });
    }
    let times = table.times();
    if times.len() < 2 {
        return Ok(table.clone());
    }

    let dt = times[1] - times[0];
    let tol = Tolerances {
        abs: UNIFORM_TOL * dt,
        rel: UNIFORM_TOL,
    };
    for pair in times.windows(2) {
        if !nearly_equal(pair[1] - pair[0], dt, tol) {
            return Err(TableError::InvalidArg {
                what: "low-pass filtering requires uniformly sampled times".into(),
            });
        }
    }
    let sample_rate = 1.0 / dt;
    if cutoff >= 0.5 * sample_rate {
        return Err(TableError::InvalidArg {
            what: format!(
                "cutoff {cutoff} Hz must be below the Nyquist frequency {} Hz",
                0.5 * sample_rate
            ),
        });
    }

    let section = Biquad::butterworth_lowpass(cutoff, sample_rate);
    let nrows = table.num_rows();
    let npad = if pad { nrows - 1 } else { 0 };
    let mut out = DMatrix::zeros(nrows, table.num_columns());

    for c in 0..table.num_columns() {
        let column = table.data().column(c);
        let mut signal = Vec::with_capacity(nrows + 2 * npad);
        let (start, end) = (column[0], column[nrows - 1]);
        signal.extend((1..=npad).rev().map(|i| 2.0 * start - column[i]));
        signal.extend(column.iter().copied());
        signal.extend((1..=npad).map(|i| 2.0 * end - column[nrows - 1 - i]));

        section.run(&mut signal);
        signal.reverse();
        section.run(&mut signal);
        signal.reverse();

        for r in 0..nrows {
            out[(r, c)] = signal[r + npad];
        }
    }

    tracing::debug!(cutoff, sample_rate, pad, "low-pass filtered table");

    let mut filtered =
        TimeSeriesTable::new(times.to_vec(), table.labels().to_vec(), out)?;
    for (k, v) in table.metadata_entries() {
        filtered.set_metadata(k, v);
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampled(f: impl Fn(Real) -> Real, n: usize, dt: Real) -> TimeSeriesTable {
        let times: Vec<Real> = (0..n).map(|i| i as Real * dt).collect();
        let rows: Vec<Vec<Real>> = times.iter().map(|t| vec![f(*t)]).collect();
        TimeSeriesTable::from_rows(times, vec!["x".into()], &rows).unwrap()
    }

    #[test]
    fn constant_passes_through() {
        let table = sampled(|_| 3.0, 50, 0.01);
        for pad in [false, true] {
            let out = filter_lowpass(&table, 6.0, pad).unwrap();
            for v in out.data().iter() {
                assert!((v - 3.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn attenuates_high_frequency() {
        let two_pi = 2.0 * std::f64::consts::PI;
        let table = sampled(|t| (two_pi * 40.0 * t).sin(), 400, 0.001);
        let out = filter_lowpass(&table, 5.0, true).unwrap();
        // Ignore the edges; the interior should be almost flat
        let peak = (100..300).fold(0.0_f64, |m, r| m.max(out.data()[(r, 0)].abs()));
        assert!(peak < 0.05, "peak {peak}");
    }

    #[test]
    fn rejects_bad_arguments() {
        let table = sampled(|t| t, 10, 0.1);
        assert!(filter_lowpass(&table, -1.0, false).is_err());
        assert!(filter_lowpass(&table, 0.0, false).is_err());
        assert!(filter_lowpass(&table, 6.0, false).is_err());

        let uneven = TimeSeriesTable::from_rows(
            vec![0.0, 0.1, 0.3],
            vec!["x".into()],
            &[vec![0.0], vec![1.0], vec![2.0]],
        )
        .unwrap();
        assert!(filter_lowpass(&uneven, 1.0, false).is_err());
    }
}
