//! Error types for conformr

use crate::dtype::Precision;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using conformr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by backends, checkers, the suite and the version collaborator
#[derive(Error, Debug)]
pub enum Error {
    /// Operand or result shapes disagree
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// A backend was invoked with a precision it does not implement
    #[error("Backend '{backend}' does not support precision {precision}")]
    UnsupportedPrecision {
        /// The requested precision
        precision: Precision,
        /// Name of the backend
        backend: &'static str,
    },

    /// Operands (or two outputs under comparison) carry different precisions
    #[error("Precision mismatch: {lhs} vs {rhs}")]
    PrecisionMismatch {
        /// Left-hand side precision
        lhs: Precision,
        /// Right-hand side precision
        rhs: Precision,
    },

    /// Deterministic comparison found a difference at or above tolerance
    #[error(
        "'{op}': difference {max_diff:e} at element {index:?} is not within {tolerance}\n  reference: {reference}\n  candidate: {candidate}"
    )]
    ToleranceExceeded {
        /// Operation under comparison
        op: String,
        /// Flat index of the worst element (None for scalars)
        index: Option<usize>,
        /// Largest observed absolute difference
        max_diff: f64,
        /// Tolerance in force, rendered for display
        tolerance: String,
        /// Bounded preview of the reference output
        reference: String,
        /// Bounded preview of the candidate output
        candidate: String,
    },

    /// Summary statistics of two sampling procedures disagree
    #[error("'{op}': {statistic} disagrees\n  reference: {reference}\n  candidate: {candidate}")]
    DistributionMismatch {
        /// Operation under comparison
        op: String,
        /// Which summary statistic failed
        statistic: &'static str,
        /// Reference summary
        reference: String,
        /// Candidate summary
        candidate: String,
    },

    /// Requested version does not match the version recorded in a manifest
    #[error("Version mismatch in {}: expected {expected}, found {found}", manifest.display())]
    VersionMismatch {
        /// Manifest holding the recorded version
        manifest: PathBuf,
        /// Version that was requested or expected
        expected: String,
        /// Version actually recorded
        found: String,
    },

    /// Version string is not of the form MAJOR.MINOR.PATCH
    #[error("Invalid version string '{0}': must be in SemVer format (e.g. '1.2.3')")]
    InvalidVersionFormat(String),

    /// No backend is registered under the requested name
    #[error("Unknown backend '{name}' (available: {})", available.join(", "))]
    UnknownBackend {
        /// The requested name
        name: String,
        /// Names that are registered
        available: Vec<&'static str>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A manifest file is readable but not in the expected form
    #[error("Malformed manifest {}: {reason}", path.display())]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Filesystem error while touching a manifest
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an unsupported precision error
    pub fn unsupported_precision(precision: Precision, backend: &'static str) -> Self {
        Self::UnsupportedPrecision { precision, backend }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "ShapeMismatch",
            Self::UnsupportedPrecision { .. } => "UnsupportedPrecision",
            Self::PrecisionMismatch { .. } => "PrecisionMismatch",
            Self::ToleranceExceeded { .. } => "ToleranceExceeded",
            Self::DistributionMismatch { .. } => "DistributionMismatch",
            Self::VersionMismatch { .. } => "VersionMismatch",
            Self::InvalidVersionFormat(_) => "InvalidVersionFormat",
            Self::UnknownBackend { .. } => "UnknownBackend",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::Manifest { .. } => "Manifest",
            Self::Io { .. } => "Io",
        }
    }
}
