use crate::{CoreError, CoreResult};

pub type Real = f64;

/// Absolute and relative tolerance for comparing reals.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// True when `a` and `b` agree within either tolerance.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(value: Real, what: &'static str) -> CoreResult<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::NonFinite { what, value })
    }
}

/// Evenly spaced values from `start` to `end`, both included.
///
/// A single-element request yields `[start]`.
pub fn linspace(length: usize, start: Real, end: Real) -> Vec<Real> {
    match length {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as Real;
            (0..n).map(|i| start + i as Real * step).collect()
        }
    }
}

/// Trapezoidal integral of `values` sampled at `times`.
pub fn trapezoid(times: &[Real], values: &[Real]) -> Real {
    times
        .windows(2)
        .zip(values.windows(2))
        .map(|(t, v)| 0.5 * (t[1] - t[0]) * (v[0] + v[1]))
        .sum()
}
