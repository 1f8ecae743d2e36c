//! Common test utilities
#![allow(dead_code)]

use conformr::backend::{Backend, ReferenceBackend};
use conformr::dtype::{Complex128, Precision, PrecisionSet};
use conformr::error::{Error, Result};
use conformr::suite::ConformanceConfig;
use conformr::tensor::{ComplexArray, ComplexMatrix, ComplexVector};

#[cfg(feature = "rayon")]
use conformr::backend::{ParallelBackend, ParallelismConfig};

/// Reference backend plus every candidate compiled in
pub fn candidates() -> Vec<Box<dyn Backend>> {
    let mut out: Vec<Box<dyn Backend>> = vec![Box::new(ReferenceBackend::new())];
    #[cfg(feature = "rayon")]
    {
        out.push(Box::new(ParallelBackend::new()));
        let pinned = ParallelismConfig::new(Some(3), Some(1));
        if let Ok(backend) = ParallelBackend::with_parallelism(pinned) {
            out.push(Box::new(backend));
        }
    }
    out
}

/// Suite config with draw counts small enough for debug test runs
pub fn quick_config(precision: Precision) -> ConformanceConfig {
    ConformanceConfig::for_precision(precision).with_draws(20_000, 500)
}

/// Assert two arrays agree elementwise within `tol` (complex modulus)
pub fn assert_complex_close(a: &ComplexArray, b: &ComplexArray, tol: f64, msg: &str) {
    assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", msg);
    assert_eq!(a.precision(), b.precision(), "{}: precision mismatch", msg);
    for (i, (x, y)) in a.buffer().widened().zip(b.buffer().widened()).enumerate() {
        let diff = (x - y).magnitude();
        assert!(
            diff < tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two arrays are bit-identical
pub fn assert_bit_identical(a: &ComplexArray, b: &ComplexArray, msg: &str) {
    assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", msg);
    assert_eq!(a.buffer().as_bytes(), b.buffer().as_bytes(), "{}: bytes differ", msg);
}

// ============================================================================
// Fault injection
// ============================================================================

/// A deliberate defect in [`FaultyBackend`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fault {
    /// Behaves exactly like the reference
    None,
    /// `noop` fails
    Unreachable,
    /// Drops one precision from the supported set
    Lacks(Precision),
    /// Adds a constant to every `product`
    ProductOffset(f64),
    /// `kronecker(a, b)` computes `b ⊗ a`
    SwappedKronecker,
    /// Adds `delta` to element 0 of every `expand_d_fs` output
    ExpandNudge(f64),
    /// Haar samples are always the first basis vector
    CollapsedHaar,
    /// Random unitaries are scaled by a constant
    ScaledUnitary(f64),
}

/// Reference backend with one injected [`Fault`]
#[derive(Copy, Clone, Debug)]
pub struct FaultyBackend {
    inner: ReferenceBackend,
    fault: Fault,
}

impl FaultyBackend {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: ReferenceBackend::new(),
            fault,
        }
    }
}

fn map_matrix(m: &ComplexMatrix, f: impl Fn(usize, Complex128) -> Complex128) -> Result<ComplexMatrix> {
    let data: Vec<Complex128> = m
        .buffer()
        .widened()
        .enumerate()
        .map(|(i, z)| f(i, z))
        .collect();
    Ok(ComplexMatrix::from_vec(m.rows(), m.cols(), data)?.cast(m.precision()))
}

fn basis_vector(depth: usize) -> Vec<Complex128> {
    let mut v = vec![Complex128::ZERO; depth];
    if let Some(first) = v.first_mut() {
        *first = Complex128::ONE;
    }
    v
}

impl Backend for FaultyBackend {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn supported_precisions(&self) -> PrecisionSet {
        match self.fault {
            Fault::Lacks(p) => {
                let mut set = PrecisionSet::EMPTY;
                for q in Precision::ALL.into_iter().filter(|q| *q != p) {
                    set = set.union(PrecisionSet::single(q));
                }
                set
            }
            _ => PrecisionSet::ALL,
        }
    }

    fn noop(&self) -> Result<()> {
        if self.fault == Fault::Unreachable {
            return Err(Error::invalid_argument("backend", "device unreachable"));
        }
        self.inner.noop()
    }

    fn product(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<f64> {
        let value = self.inner.product(lhs, rhs)?;
        Ok(match self.fault {
            Fault::ProductOffset(offset) => value + offset,
            _ => value,
        })
    }

    fn normalize(&self, value: &ComplexArray) -> Result<ComplexArray> {
        self.inner.normalize(value)
    }

    fn project(&self, vector: &ComplexVector) -> Result<ComplexMatrix> {
        self.inner.project(vector)
    }

    fn kronecker(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<ComplexMatrix> {
        match self.fault {
            Fault::SwappedKronecker => self.inner.kronecker(rhs, lhs),
            _ => self.inner.kronecker(lhs, rhs),
        }
    }

    fn rotate(&self, rho: &ComplexMatrix, unitary: &ComplexMatrix) -> Result<ComplexMatrix> {
        self.inner.rotate(rho, unitary)
    }

    fn get_random_haar_1d(&self, depth: usize, precision: Precision) -> Result<ComplexVector> {
        match self.fault {
            Fault::CollapsedHaar => {
                Ok(ComplexVector::from_vec(basis_vector(depth)).cast(precision))
            }
            _ => self.inner.get_random_haar_1d(depth, precision),
        }
    }

    fn get_random_haar_2d(
        &self,
        count: usize,
        depth: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix> {
        match self.fault {
            Fault::CollapsedHaar => {
                let data: Vec<Complex128> = (0..count).flat_map(|_| basis_vector(depth)).collect();
                Ok(ComplexMatrix::from_vec(count, depth, data)?.cast(precision))
            }
            _ => self.inner.get_random_haar_2d(count, depth, precision),
        }
    }

    fn expand_d_fs(
        &self,
        value: &ComplexMatrix,
        depth: usize,
        quantity: usize,
        idx: usize,
    ) -> Result<ComplexMatrix> {
        let out = self.inner.expand_d_fs(value, depth, quantity, idx)?;
        match self.fault {
            Fault::ExpandNudge(delta) => map_matrix(&out, |i, z| {
                if i == 0 { z + Complex128::new(delta, 0.0) } else { z }
            }),
            _ => Ok(out),
        }
    }

    fn random_unitary_d_fs(
        &self,
        depth: usize,
        quantity: usize,
        idx: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix> {
        let out = self.inner.random_unitary_d_fs(depth, quantity, idx, precision)?;
        match self.fault {
            Fault::ScaledUnitary(k) => map_matrix(&out, |_, z| z.scale(k)),
            _ => Ok(out),
        }
    }
}
