//! # conformr
//!
//! **Numerical conformance checking for complex linear-algebra backends.**
//!
//! conformr runs one fixed catalogue of complex linear-algebra operations on
//! two backends, a reference and a candidate, and checks that they agree.
//! Deterministic operations are compared pointwise within a tolerance.
//! Randomized operations are compared through summary statistics, since two
//! backends never draw the same random numbers.
//!
//! ## Operations
//!
//! - `noop`: backend setup smoke test
//! - `product`: real part of the trace of a matrix product
//! - `normalize`: Euclidean for vectors, element-wise `M_ij / sqrt(Re((M·conj(M))_ij))` for matrices
//! - `project`: outer product `v v†`
//! - `kronecker`: Kronecker (tensor) product
//! - `rotate`: `U M U†`
//! - `get_random_haar_1d` / `get_random_haar_2d`: random unit vectors
//! - `expand_d_fs`: embed an operator into a multi-site product space
//! - `random_unitary_d_fs`: random unitary embedded the same way
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conformr::prelude::*;
//!
//! let reference = ReferenceBackend::new();
//! let candidate = ParallelBackend::new();
//! let config = ConformanceConfig::for_precision(Precision::Complex128);
//! let report = ConformanceSuite::new(config, &reference, &candidate).run()?;
//! assert!(report.all_passed(), "{report}");
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded candidate backend
//! - `cli`: the `conformr` command-line runner

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod backend;
pub mod check;
pub mod dtype;
pub mod error;
pub mod fixture;
pub mod suite;
pub mod tensor;
pub mod version;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{Backend, DfsParams, ReferenceBackend, backend_by_name};
    pub use crate::check::{DeterministicChecker, StatisticalChecker, Tolerance};
    pub use crate::dtype::{Complex64, Complex128, ComplexElement, Precision, PrecisionSet};
    pub use crate::error::{Error, Result};
    pub use crate::fixture::{FixtureSpec, Fixtures};
    pub use crate::suite::{ConformanceConfig, ConformanceSuite, Operation, SuiteReport};
    pub use crate::tensor::{ComplexArray, ComplexMatrix, ComplexVector, Output};

    #[cfg(feature = "rayon")]
    pub use crate::backend::{ParallelBackend, ParallelismConfig};
}
