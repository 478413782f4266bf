//! Piecewise-linear resampling of sampled data.

use mc_core::Real;

/// Linearly interpolate `(x, y)` samples at each point of `new_x`.
///
/// `x` must be non-decreasing. Points outside `[x[0], x[last]]` yield NaN.
/// With `ignore_nans`, samples whose `y` is NaN are dropped before
/// interpolating; otherwise a NaN neighbour propagates into the result.
pub fn interpolate(x: &[Real], y: &[Real], new_x: &[Real], ignore_nans: bool) -> Vec<Real> {
    let (xs, ys): (Vec<Real>, Vec<Real>) = x
        .iter()
        .zip(y)
        .filter(|(_, yi)| !(ignore_nans && yi.is_nan()))
        .map(|(xi, yi)| (*xi, *yi))
        .unzip();

    new_x.iter().map(|&t| interpolate_one(&xs, &ys, t)).collect()
}

fn interpolate_one(xs: &[Real], ys: &[Real], t: Real) -> Real {
    let n = xs.len();
    if n == 0 || t.is_nan() || t < xs[0] || t > xs[n - 1] {
        return Real::NAN;
    }
    if n == 1 {
        return ys[0];
    }
    let hi = xs.partition_point(|xi| *xi < t);
    if hi == 0 {
        return ys[0];
    }
    if xs[hi] == t {
        return ys[hi];
    }
    let lo = hi - 1;
    let w = (t - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + w * (ys[hi] - ys[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_and_outside() {
        let out = interpolate(&[0.0, 1.0, 2.0], &[0.0, 2.0, 0.0], &[-0.5, 0.5, 1.0, 1.5, 2.5], false);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 1.0);
        assert_eq!(out[2], 2.0);
        assert_eq!(out[3], 1.0);
        assert!(out[4].is_nan());
    }

    #[test]
    fn nan_handling() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, Real::NAN, 4.0];
        assert!(interpolate(&x, &y, &[0.5], false)[0].is_nan());
        assert_eq!(interpolate(&x, &y, &[0.5], true)[0], 1.0);
    }

    #[test]
    fn empty_input() {
        assert!(interpolate(&[], &[], &[0.0], false)[0].is_nan());
    }
}
