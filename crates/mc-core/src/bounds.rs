//! Bounds on variables and constraint equations.
//!
//! A [`Bounds`] is a closed interval `[lower, upper]`. Infinite endpoints are
//! allowed; NaN endpoints and inverted intervals are rejected at construction.
//! [`InitialBounds`] and [`FinalBounds`] restrict a variable at the first and
//! last time point only.

use core::fmt;

use crate::{CoreError, CoreResult, Real};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BoundsRepr", into = "BoundsRepr")
)]
pub struct Bounds {
    lower: Real,
    upper: Real,
}

impl Bounds {
    pub fn new(lower: Real, upper: Real) -> CoreResult<Self> {
        if lower.is_nan() {
            return Err(CoreError::NonFinite {
                what: "lower bound",
                value: lower,
            });
        }
        if upper.is_nan() {
            return Err(CoreError::NonFinite {
                what: "upper bound",
                value: upper,
            });
        }
        if lower > upper {
            return Err(CoreError::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Both endpoints at `value`.
    pub fn equal(value: Real) -> CoreResult<Self> {
        Self::new(value, value)
    }

    /// The equality bound `0`.
    pub const fn zero() -> Self {
        Self {
            lower: 0.0,
            upper: 0.0,
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            lower: Real::NEG_INFINITY,
            upper: Real::INFINITY,
        }
    }

    pub fn lower(&self) -> Real {
        self.lower
    }

    pub fn upper(&self) -> Real {
        self.upper
    }

    pub fn is_equality(&self) -> bool {
        self.lower == self.upper
    }

    pub fn contains(&self, value: Real) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Distance from `value` to the interval; zero inside it.
    pub fn violation(&self, value: Real) -> Real {
        if value < self.lower {
            self.lower - value
        } else if value > self.upper {
            value - self.upper
        } else {
            0.0
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_equality() {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "[{}, {}]", self.lower, self.upper)
        }
    }
}

/// Bounds applied at the initial time point only.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InitialBounds(pub Bounds);

/// Bounds applied at the final time point only.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FinalBounds(pub Bounds);

impl From<Bounds> for InitialBounds {
    fn from(b: Bounds) -> Self {
        Self(b)
    }
}

impl From<Bounds> for FinalBounds {
    fn from(b: Bounds) -> Self {
        Self(b)
    }
}

/// File representation: a single number (equality) or `[lower, upper]`.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum BoundsRepr {
    Equal(Real),
    Range([Real; 2]),
}

#[cfg(feature = "serde")]
impl TryFrom<BoundsRepr> for Bounds {
    type Error = CoreError;

    fn try_from(repr: BoundsRepr) -> Result<Self, Self::Error> {
        match repr {
            BoundsRepr::Equal(v) => Bounds::equal(v),
            BoundsRepr::Range([lo, hi]) => Bounds::new(lo, hi),
        }
    }
}

#[cfg(feature = "serde")]
impl From<Bounds> for BoundsRepr {
    fn from(b: Bounds) -> Self {
        if b.is_equality() {
            BoundsRepr::Equal(b.lower)
        } else {
            BoundsRepr::Range([b.lower, b.upper])
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ordered_endpoints_always_build(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let bounds = Bounds::new(lo, hi).unwrap();
            prop_assert!(bounds.contains(lo));
            prop_assert!(bounds.contains(hi));
            prop_assert_eq!(Bounds::new(hi, lo).is_ok(), lo == hi);
        }

        #[test]
        fn violation_vanishes_exactly_inside(
            lo in -100.0_f64..0.0,
            hi in 0.0_f64..100.0,
            x in -200.0_f64..200.0
        ) {
            let bounds = Bounds::new(lo, hi).unwrap();
            let v = bounds.violation(x);
            prop_assert!(v >= 0.0);
            prop_assert_eq!(v == 0.0, bounds.contains(x));
        }
    }
}
