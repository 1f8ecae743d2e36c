//! Deterministic input fixtures
//!
//! A fixture set is generated once per test class from an explicit
//! [`FixtureSpec`] and handed to both backends by reference. The same spec
//! always produces byte-identical fixtures.
//!
//! Each complex array is drawn as all real parts first, then all imaginary
//! parts, each uniform in [0, 1), computed in f64 and then cast to the target
//! precision. Arrays are drawn in declaration order from a single stream:
//! `lhs_mtx`, `rhs_mtx`, `lhs_vec`, `rhs_vec`, `large_mtx`.

mod rng;

pub use rng::FixtureRng;

use crate::dtype::{Complex64, Complex128, ComplexElement, Precision};
use crate::error::{Error, Result};
use crate::tensor::{ComplexBuffer, ComplexMatrix, ComplexVector};

/// Inputs that fully determine a fixture set
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixtureSpec {
    /// Generator seed
    pub seed: u64,
    /// Side of the matrix pair and length of the vector pair
    pub size: usize,
    /// Side of the large matrix used by structural checks
    pub large_size: usize,
    /// Precision of every generated value
    pub precision: Precision,
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            seed: 0,
            size: 5,
            large_size: 32,
            precision: Precision::Complex128,
        }
    }
}

impl FixtureSpec {
    /// Default spec at a given precision
    pub fn with_precision(precision: Precision) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }
}

/// The named fixture bundle shared by reference and candidate
#[derive(Clone, Debug, PartialEq)]
pub struct Fixtures {
    /// Spec that produced these values
    pub spec: FixtureSpec,
    /// Left matrix, `size × size`
    pub lhs_mtx: ComplexMatrix,
    /// Right matrix, `size × size`
    pub rhs_mtx: ComplexMatrix,
    /// Left vector, length `size`
    pub lhs_vec: ComplexVector,
    /// Right vector, length `size`
    pub rhs_vec: ComplexVector,
    /// Large matrix, `large_size × large_size`
    pub large_mtx: ComplexMatrix,
}

/// Seeded generator of complex matrices and vectors
#[derive(Clone, Debug)]
pub struct FixtureGenerator {
    rng: FixtureRng,
    precision: Precision,
}

impl FixtureGenerator {
    /// Create a generator for one seed and precision
    pub fn new(seed: u64, precision: Precision) -> Self {
        Self {
            rng: FixtureRng::from_seed(seed),
            precision,
        }
    }

    /// Precision of generated values
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Next `rows × cols` matrix
    pub fn random_matrix(&mut self, rows: usize, cols: usize) -> Result<ComplexMatrix> {
        let n = rows.checked_mul(cols).ok_or_else(|| {
            Error::invalid_argument("size", format!("{rows}x{cols} overflows"))
        })?;
        let data = self.draw(n);
        ComplexMatrix::from_buffer(rows, cols, data)
    }

    /// Next vector of length `len`
    pub fn random_vector(&mut self, len: usize) -> ComplexVector {
        ComplexVector::from_buffer(self.draw(len))
    }

    /// `n` values: all real parts drawn before all imaginary parts
    fn draw(&mut self, n: usize) -> ComplexBuffer {
        let re: Vec<f64> = (0..n).map(|_| self.rng.next_f64()).collect();
        let parts: Vec<(f64, f64)> = re
            .into_iter()
            .map(|r| (r, self.rng.next_f64()))
            .collect();
        match self.precision {
            Precision::Complex64 => Complex64::into_buffer(cast_all(&parts)),
            Precision::Complex128 => Complex128::into_buffer(cast_all(&parts)),
        }
    }
}

fn cast_all<T: ComplexElement>(parts: &[(f64, f64)]) -> Vec<T> {
    parts
        .iter()
        .map(|&(re, im)| T::from_f64_parts(re, im))
        .collect()
}

/// Generate the full fixture set for `spec`
///
/// Fails with `InvalidArgument` if `size` or `large_size` is zero.
pub fn generate(spec: &FixtureSpec) -> Result<Fixtures> {
    if spec.size == 0 {
        return Err(Error::invalid_argument("size", "must be at least 1"));
    }
    if spec.large_size == 0 {
        return Err(Error::invalid_argument("large_size", "must be at least 1"));
    }
    let mut generator = FixtureGenerator::new(spec.seed, spec.precision);
    let lhs_mtx = generator.random_matrix(spec.size, spec.size)?;
    let rhs_mtx = generator.random_matrix(spec.size, spec.size)?;
    let lhs_vec = generator.random_vector(spec.size);
    let rhs_vec = generator.random_vector(spec.size);
    let large_mtx = generator.random_matrix(spec.large_size, spec.large_size)?;
    tracing::debug!(
        seed = spec.seed,
        size = spec.size,
        large_size = spec.large_size,
        precision = %spec.precision,
        "generated fixtures"
    );
    Ok(Fixtures {
        spec: *spec,
        lhs_mtx,
        rhs_mtx,
        lhs_vec,
        rhs_vec,
        large_mtx,
    })
}
