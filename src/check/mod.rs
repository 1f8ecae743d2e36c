//! Equivalence checkers
//!
//! - [`DeterministicChecker`]: shape equality plus elementwise closeness of two
//!   concrete outputs computed from identical inputs.
//! - [`StatisticalChecker`]: agreement of summary statistics of two sampling
//!   procedures.
//!
//! The statistical check is a weaker, non-pointwise guarantee: it bounds
//! gross distributional divergence (wrong normalization, wrong support, a
//! biased sampler) but says nothing about any individual sample.

mod deterministic;
mod statistical;

pub use deterministic::{Comparison, DeterministicChecker};
pub use statistical::{
    Histogram, Retention, SampleSet, StatisticalChecker, StatisticalConfig, compute_bin_index,
};

use crate::dtype::{Complex128, Precision};
use std::fmt;

/// Acceptance rule for one elementwise (or scalar) comparison
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tolerance {
    /// Values must be equal (`-0.0 == 0.0`; NaN never matches)
    Exact,
    /// `|reference - candidate| < eps`, complex modulus of the difference
    Absolute(f64),
}

impl Tolerance {
    /// Default tolerance for deterministic floating-point operations
    pub fn for_precision(precision: Precision) -> Self {
        Self::Absolute(precision.default_tolerance())
    }

    /// Does this tolerance accept the pair?
    #[inline]
    pub fn admits(&self, reference: Complex128, candidate: Complex128) -> bool {
        match *self {
            Self::Exact => reference == candidate,
            Self::Absolute(eps) => reference.distance(candidate) < eps,
        }
    }

    /// Does this tolerance accept the real scalar pair?
    #[inline]
    pub fn admits_scalar(&self, reference: f64, candidate: f64) -> bool {
        match *self {
            Self::Exact => reference == candidate,
            Self::Absolute(eps) => (reference - candidate).abs() < eps,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Absolute(1e-6)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact equality"),
            Self::Absolute(eps) => write!(f, "< {eps:e}"),
        }
    }
}
