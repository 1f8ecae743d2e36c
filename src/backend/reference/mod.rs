//! Naive reference backend
//!
//! Straightforward loops, one thread, no blocking. Its outputs define what the
//! other backends are expected to produce.

pub(crate) mod kernels;

use super::{
    Backend, DfsParams, UNITARY_ROTATION_ANGLE, dispatch_precision, require_positive,
    require_precision, same_precision, square_pair,
};
use crate::dtype::{Precision, PrecisionSet};
use crate::error::Result;
use crate::tensor::{ComplexArray, ComplexMatrix, ComplexVector};

/// Single-threaded ground-truth backend
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    /// Registry name
    pub const NAME: &'static str = "reference";

    /// Create the backend
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ReferenceBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supported_precisions(&self) -> PrecisionSet {
        PrecisionSet::ALL
    }

    fn noop(&self) -> Result<()> {
        Ok(())
    }

    fn product(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<f64> {
        let (n, precision) = square_pair(self, lhs, rhs)?;
        dispatch_precision!(precision, T => {
            Ok(kernels::product::<T>(lhs.as_slice()?, rhs.as_slice()?, n))
        })
    }

    fn normalize(&self, value: &ComplexArray) -> Result<ComplexArray> {
        require_precision(self, value.precision())?;
        match value {
            ComplexArray::Vector(v) => dispatch_precision!(v.precision(), T => {
                let out = kernels::normalize_vector::<T>(v.as_slice()?)?;
                Ok(ComplexVector::from_vec(out).into())
            }),
            ComplexArray::Matrix(m) => dispatch_precision!(m.precision(), T => {
                let out = kernels::normalize_matrix::<T>(m.as_slice()?, m.square_side()?)?;
                Ok(ComplexMatrix::from_vec(m.rows(), m.cols(), out)?.into())
            }),
        }
    }

    fn project(&self, vector: &ComplexVector) -> Result<ComplexMatrix> {
        require_precision(self, vector.precision())?;
        let n = vector.len();
        dispatch_precision!(vector.precision(), T => {
            ComplexMatrix::from_vec(n, n, kernels::project::<T>(vector.as_slice()?))
        })
    }

    fn kronecker(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<ComplexMatrix> {
        let a = lhs.square_side()?;
        let b = rhs.square_side()?;
        let precision = same_precision(lhs.precision(), rhs.precision())?;
        require_precision(self, precision)?;
        dispatch_precision!(precision, T => {
            let out = kernels::kronecker::<T>(lhs.as_slice()?, (a, a), rhs.as_slice()?, (b, b));
            ComplexMatrix::from_vec(a * b, a * b, out)
        })
    }

    fn rotate(&self, rho: &ComplexMatrix, unitary: &ComplexMatrix) -> Result<ComplexMatrix> {
        let (n, precision) = square_pair(self, rho, unitary)?;
        dispatch_precision!(precision, T => {
            let out = kernels::rotate::<T>(rho.as_slice()?, unitary.as_slice()?, n);
            ComplexMatrix::from_vec(n, n, out)
        })
    }

    fn get_random_haar_1d(&self, depth: usize, precision: Precision) -> Result<ComplexVector> {
        require_positive("depth", depth)?;
        require_precision(self, precision)?;
        let mut rng = rand::rng();
        dispatch_precision!(precision, T => {
            Ok(ComplexVector::from_vec(kernels::haar_vector::<T, _>(depth, &mut rng)))
        })
    }

    fn get_random_haar_2d(
        &self,
        count: usize,
        depth: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix> {
        require_positive("count", count)?;
        require_positive("depth", depth)?;
        require_precision(self, precision)?;
        let mut rng = rand::rng();
        dispatch_precision!(precision, T => {
            let mut out = Vec::with_capacity(count * depth);
            for _ in 0..count {
                out.extend(kernels::haar_vector::<T, _>(depth, &mut rng));
            }
            ComplexMatrix::from_vec(count, depth, out)
        })
    }

    fn expand_d_fs(
        &self,
        value: &ComplexMatrix,
        depth: usize,
        quantity: usize,
        idx: usize,
    ) -> Result<ComplexMatrix> {
        let n = value.square_side()?;
        let params = DfsParams::new(depth, quantity, idx);
        let (lead, trail) = params.identity_sides()?;
        let side = params.expanded_side(n)?;
        require_precision(self, value.precision())?;
        dispatch_precision!(value.precision(), T => {
            let out = kernels::expand::<T>(value.as_slice()?, n, lead, trail);
            ComplexMatrix::from_vec(side, side, out)
        })
    }

    fn random_unitary_d_fs(
        &self,
        depth: usize,
        quantity: usize,
        idx: usize,
        precision: Precision,
    ) -> Result<ComplexMatrix> {
        let params = DfsParams::new(depth, quantity, idx);
        params.identity_sides()?;
        require_precision(self, precision)?;
        let mut rng = rand::rng();
        let unitary = dispatch_precision!(precision, T => {
            let axis = kernels::haar_vector::<T, _>(depth, &mut rng);
            let u = kernels::unitary_from_axis(&axis, UNITARY_ROTATION_ANGLE);
            ComplexMatrix::from_vec(depth, depth, u)?
        });
        self.expand_d_fs(&unitary, depth, quantity, idx)
    }
}
