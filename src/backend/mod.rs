//! Backend interface and backend implementations
//!
//! A backend is a stateless implementation of a fixed set of complex linear
//! algebra operations. Two backends are interchangeable when they produce the
//! same outputs for the same inputs (within tolerance for floating-point
//! accumulation, exactly for structural operations, and in distribution for
//! randomized operations).
//!
//! # Architecture
//!
//! ```text
//! Backend (trait, object-safe)
//! ├── ReferenceBackend  (naive, ground truth)
//! └── ParallelBackend   (rayon, candidate; feature "rayon")
//! ```
//!
//! Backends are selected explicitly, either by constructing them or by name
//! through [`backend_by_name`].

mod dispatch;
pub mod reference;

#[cfg(feature = "rayon")]
pub mod parallel;

pub(crate) use dispatch::dispatch_precision;

pub use reference::ReferenceBackend;

#[cfg(feature = "rayon")]
pub use parallel::{ParallelBackend, ParallelismConfig};

use crate::dtype::{Precision, PrecisionSet};
use crate::error::{Error, Result};
use crate::tensor::{ComplexArray, ComplexMatrix, ComplexVector};

/// Rotation angle α used by `random_unitary_d_fs`: `U = I + (e^{iα} - 1)|v⟩⟨v|`
pub const UNITARY_ROTATION_ANGLE: f64 = 0.01 * std::f64::consts::PI;

/// The operation set every backend implements
///
/// All methods are pure with respect to the backend (no mutable state), so a
/// single instance can be shared read-only across a whole run. Randomized
/// methods draw from the calling thread's RNG.
///
/// # Errors
///
/// - `ShapeMismatch` when operands are non-square or differ in size where the
///   operation requires square, same-size operands
/// - `PrecisionMismatch` when two operands carry different precisions
/// - `UnsupportedPrecision` when the backend does not implement the precision
/// - `InvalidArgument` for out-of-range integer parameters or zero-norm input
pub trait Backend: Send + Sync {
    /// Stable registry name
    fn name(&self) -> &'static str;

    /// Precisions this backend implements
    fn supported_precisions(&self) -> PrecisionSet;

    /// Does this backend implement `precision`?
    fn supports(&self, precision: Precision) -> bool {
        self.supported_precisions().contains(precision)
    }

    /// Liveness check: succeeds if the backend is callable at all
    fn noop(&self) -> Result<()>;

    /// `Re(trace(lhs · rhs))` for two square matrices of the same size
    fn product(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<f64>;

    /// Rescale to unit norm (Euclidean for vectors, Frobenius for matrices)
    fn normalize(&self, value: &ComplexArray) -> Result<ComplexArray>;

    /// Outer-product projector `P[i][j] = v_i · conj(v_j)`
    fn project(&self, vector: &ComplexVector) -> Result<ComplexMatrix>;

    /// Kronecker (tensor) product of two square matrices
    fn kronecker(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<ComplexMatrix>;

    /// Unitary conjugation `unitary · rho · unitary†`
    fn rotate(&self, rho: &ComplexMatrix, unitary: &ComplexMatrix) -> Result<ComplexMatrix>;

    /// Haar-random unit vector of length `depth`
    fn get_random_haar_1d(&self, depth: usize, precision: Precision) -> Result<ComplexVector>;

    /// `count` independent Haar-random rows of length `depth`
    fn get_random_haar_2d(
        &self,
        count: usize,
        depth: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix>;

    /// Embed `value` as `I_{depth^idx} ⊗ value ⊗ I_{depth^(quantity-idx-1)}`
    ///
    /// Purely structural: the output contains copies of `value`'s elements
    /// and exact zeros, so results must be bit-identical across backends.
    fn expand_d_fs(
        &self,
        value: &ComplexMatrix,
        depth: usize,
        quantity: usize,
        idx: usize,
    ) -> Result<ComplexMatrix>;

    /// Random `depth × depth` unitary expanded like [`Backend::expand_d_fs`]
    fn random_unitary_d_fs(
        &self,
        depth: usize,
        quantity: usize,
        idx: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix>;
}

// ============================================================================
// Structural embedding parameters
// ============================================================================

/// Parameters of `expand_d_fs` / `random_unitary_d_fs`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DfsParams {
    /// Dimension of one subsystem
    pub depth: usize,
    /// Number of subsystems
    pub quantity: usize,
    /// Index of the subsystem the operator acts on
    pub idx: usize,
}

impl DfsParams {
    /// Create parameters without validating them
    pub const fn new(depth: usize, quantity: usize, idx: usize) -> Self {
        Self {
            depth,
            quantity,
            idx,
        }
    }

    /// Sides of the leading and trailing identity factors
    ///
    /// Fails with `InvalidArgument` if `depth == 0`, `idx >= quantity`, or a
    /// side overflows `usize`.
    pub fn identity_sides(&self) -> Result<(usize, usize)> {
        if self.depth == 0 {
            return Err(Error::invalid_argument("depth", "must be at least 1"));
        }
        if self.idx >= self.quantity {
            return Err(Error::invalid_argument(
                "idx",
                format!("{} is out of range for quantity {}", self.idx, self.quantity),
            ));
        }
        let pow = |exp: usize| {
            u32::try_from(exp)
                .ok()
                .and_then(|e| self.depth.checked_pow(e))
                .ok_or_else(|| {
                    Error::invalid_argument("quantity", format!("depth^{exp} overflows"))
                })
        };
        Ok((pow(self.idx)?, pow(self.quantity - self.idx - 1)?))
    }

    /// Side of the expanded matrix for a `n × n` input
    pub fn expanded_side(&self, n: usize) -> Result<usize> {
        let (lead, trail) = self.identity_sides()?;
        lead.checked_mul(n)
            .and_then(|s| s.checked_mul(trail))
            .ok_or_else(|| Error::invalid_argument("value", "expanded side overflows"))
    }
}

impl Default for DfsParams {
    fn default() -> Self {
        Self::new(5, 2, 0)
    }
}

// ============================================================================
// Operand validation shared by all backends
// ============================================================================

/// Fail with `UnsupportedPrecision` unless `backend` implements `precision`
pub(crate) fn require_precision(backend: &dyn Backend, precision: Precision) -> Result<()> {
    if backend.supports(precision) {
        Ok(())
    } else {
        Err(Error::unsupported_precision(precision, backend.name()))
    }
}

/// Validate two square, same-size, same-precision operands
///
/// Returns the common side and precision.
pub(crate) fn square_pair(
    backend: &dyn Backend,
    lhs: &ComplexMatrix,
    rhs: &ComplexMatrix,
) -> Result<(usize, Precision)> {
    let n = lhs.square_side()?;
    rhs.square_side()?;
    if rhs.shape() != lhs.shape() {
        return Err(Error::shape_mismatch(&lhs.shape(), &rhs.shape()));
    }
    let precision = same_precision(lhs.precision(), rhs.precision())?;
    require_precision(backend, precision)?;
    Ok((n, precision))
}

/// Fail with `PrecisionMismatch` unless both precisions agree
pub(crate) fn same_precision(lhs: Precision, rhs: Precision) -> Result<Precision> {
    if lhs == rhs {
        Ok(lhs)
    } else {
        Err(Error::PrecisionMismatch { lhs, rhs })
    }
}

/// Reject zero-length sampling requests
pub(crate) fn require_positive(arg: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(Error::invalid_argument(arg, "must be at least 1"))
    } else {
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Names accepted by [`backend_by_name`]
#[cfg(feature = "rayon")]
pub const BACKEND_NAMES: &[&str] = &[ReferenceBackend::NAME, ParallelBackend::NAME];

/// Names accepted by [`backend_by_name`]
#[cfg(not(feature = "rayon"))]
pub const BACKEND_NAMES: &[&str] = &[ReferenceBackend::NAME];

/// Resolve a backend by its stable name
///
/// Fails with `UnknownBackend` listing the registered names.
pub fn backend_by_name(name: &str) -> Result<Box<dyn Backend>> {
    tracing::debug!(backend = name, "resolving backend");
    match name {
        ReferenceBackend::NAME => Ok(Box::new(ReferenceBackend::new())),
        #[cfg(feature = "rayon")]
        ParallelBackend::NAME => Ok(Box::new(ParallelBackend::new())),
        _ => Err(Error::UnknownBackend {
            name: name.to_string(),
            available: BACKEND_NAMES.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex128;

    #[test]
    fn test_dfs_identity_sides() {
        assert_eq!(DfsParams::new(5, 2, 0).identity_sides().unwrap(), (1, 5));
        assert_eq!(DfsParams::new(5, 2, 1).identity_sides().unwrap(), (5, 1));
        assert_eq!(DfsParams::new(2, 4, 1).identity_sides().unwrap(), (2, 4));
        assert_eq!(DfsParams::new(5, 2, 0).expanded_side(32).unwrap(), 160);
        assert_eq!(DfsParams::new(5, 2, 0).expanded_side(5).unwrap(), 25);
    }

    #[test]
    fn test_dfs_rejects_bad_params() {
        assert!(matches!(
            DfsParams::new(0, 2, 0).identity_sides(),
            Err(Error::InvalidArgument { arg: "depth", .. })
        ));
        assert!(matches!(
            DfsParams::new(5, 2, 2).identity_sides(),
            Err(Error::InvalidArgument { arg: "idx", .. })
        ));
        assert!(matches!(
            DfsParams::new(usize::MAX, 3, 0).identity_sides(),
            Err(Error::InvalidArgument { arg: "quantity", .. })
        ));
    }

    #[test]
    fn test_square_pair_validation() {
        let backend = ReferenceBackend::new();
        let a = ComplexMatrix::identity(3, Precision::Complex128);
        let b = ComplexMatrix::identity(4, Precision::Complex128);
        let c = ComplexMatrix::identity(3, Precision::Complex64);
        let rect = ComplexMatrix::from_vec(2, 3, vec![Complex128::ONE; 6]).unwrap();

        assert_eq!(
            square_pair(&backend, &a, &a).unwrap(),
            (3, Precision::Complex128)
        );
        assert!(matches!(
            square_pair(&backend, &a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            square_pair(&backend, &a, &c),
            Err(Error::PrecisionMismatch { .. })
        ));
        assert!(matches!(
            square_pair(&backend, &rect, &rect),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_backend_by_name() {
        let backend = backend_by_name("reference").unwrap();
        assert_eq!(backend.name(), "reference");
        assert!(backend.noop().is_ok());

        match backend_by_name("cublas") {
            Err(Error::UnknownBackend { name, available }) => {
                assert_eq!(name, "cublas");
                assert!(available.contains(&"reference"));
            }
            Err(other) => panic!("expected UnknownBackend, got {other:?}"),
            Ok(_) => panic!("expected UnknownBackend"),
        }
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_backend_by_name_parallel() {
        let backend = backend_by_name("parallel").unwrap();
        assert_eq!(backend.name(), "parallel");
        assert_eq!(backend.supported_precisions(), PrecisionSet::ALL);
    }
}
