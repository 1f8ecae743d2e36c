//! Rayon-parallel candidate backend
//!
//! Algorithms differ from the reference where the definition
//! allows it: `product` never materializes `A·B`, `normalize` multiplies by a
//! reciprocal, `expand_d_fs` scatters instead of multiplying by identities, and
//! Haar sampling uses polar Box-Muller instead of the ziggurat normal sampler.
//! Conformance against [`ReferenceBackend`](super::ReferenceBackend) is what
//! shows these choices are equivalent.

mod kernels;

use super::{
    Backend, DfsParams, UNITARY_ROTATION_ANGLE, dispatch_precision, require_positive,
    require_precision, same_precision, square_pair,
};
use crate::dtype::{Precision, PrecisionSet};
use crate::error::{Error, Result};
use crate::tensor::{ComplexArray, ComplexMatrix, ComplexVector};
use std::sync::Arc;

/// Thread pool sizing for [`ParallelBackend`]
///
/// `None` fields fall back to rayon's global pool and one row per task.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Worker threads in a dedicated pool
    pub num_threads: Option<usize>,
    /// Minimum rows handed to one rayon task
    pub chunk_rows: Option<usize>,
}

impl ParallelismConfig {
    /// Create a config
    pub const fn new(num_threads: Option<usize>, chunk_rows: Option<usize>) -> Self {
        Self {
            num_threads,
            chunk_rows,
        }
    }
}

/// Multithreaded backend built on rayon
#[derive(Clone, Debug, Default)]
pub struct ParallelBackend {
    config: ParallelismConfig,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelBackend {
    /// Registry name
    pub const NAME: &'static str = "parallel";

    /// Backend on rayon's global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with explicit parallelism settings
    ///
    /// A dedicated pool is built when `num_threads` is set. Zero threads or a
    /// zero chunk size are rejected with `InvalidArgument`.
    pub fn with_parallelism(config: ParallelismConfig) -> Result<Self> {
        if config.chunk_rows == Some(0) {
            return Err(Error::invalid_argument("chunk_rows", "must be at least 1"));
        }
        let pool = match config.num_threads {
            Some(0) => {
                return Err(Error::invalid_argument("num_threads", "must be at least 1"));
            }
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("conformr-{i}"))
                    .build()
                    .map_err(|e| Error::invalid_argument("num_threads", e.to_string()))?;
                tracing::debug!(threads = n, "built dedicated rayon pool");
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self { config, pool })
    }

    /// Active parallelism settings
    pub fn parallelism(&self) -> ParallelismConfig {
        self.config
    }

    fn rayon_min_len(&self) -> usize {
        self.config.chunk_rows.unwrap_or(1)
    }

    fn install_parallelism<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Backend for ParallelBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supported_precisions(&self) -> PrecisionSet {
        PrecisionSet::ALL
    }

    fn noop(&self) -> Result<()> {
        self.install_parallelism(rayon::current_num_threads);
        Ok(())
    }

    fn product(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<f64> {
        let (n, precision) = square_pair(self, lhs, rhs)?;
        let min_len = self.rayon_min_len();
        dispatch_precision!(precision, T => {
            let (a, b) = (lhs.as_slice::<T>()?, rhs.as_slice::<T>()?);
            Ok(self.install_parallelism(|| kernels::product(a, b, n, min_len)))
        })
    }

    fn normalize(&self, value: &ComplexArray) -> Result<ComplexArray> {
        require_precision(self, value.precision())?;
        let min_len = self.rayon_min_len();
        match value {
            ComplexArray::Vector(v) => dispatch_precision!(v.precision(), T => {
                let data = v.as_slice::<T>()?;
                let out = self.install_parallelism(|| kernels::normalize_vector(data, min_len))?;
                Ok(ComplexVector::from_vec(out).into())
            }),
            ComplexArray::Matrix(m) => dispatch_precision!(m.precision(), T => {
                let (data, n) = (m.as_slice::<T>()?, m.square_side()?);
                let out = self.install_parallelism(|| kernels::normalize_matrix(data, n, min_len))?;
                Ok(ComplexMatrix::from_vec(m.rows(), m.cols(), out)?.into())
            }),
        }
    }

    fn project(&self, vector: &ComplexVector) -> Result<ComplexMatrix> {
        require_precision(self, vector.precision())?;
        let n = vector.len();
        let min_len = self.rayon_min_len();
        dispatch_precision!(vector.precision(), T => {
            let v = vector.as_slice::<T>()?;
            ComplexMatrix::from_vec(n, n, self.install_parallelism(|| kernels::project(v, min_len)))
        })
    }

    fn kronecker(&self, lhs: &ComplexMatrix, rhs: &ComplexMatrix) -> Result<ComplexMatrix> {
        let ra = lhs.square_side()?;
        let rb = rhs.square_side()?;
        let precision = same_precision(lhs.precision(), rhs.precision())?;
        require_precision(self, precision)?;
        let min_len = self.rayon_min_len();
        dispatch_precision!(precision, T => {
            let (a, b) = (lhs.as_slice::<T>()?, rhs.as_slice::<T>()?);
            let out = self.install_parallelism(|| {
                kernels::kronecker(a, (ra, ra), b, (rb, rb), min_len)
            });
            ComplexMatrix::from_vec(ra * rb, ra * rb, out)
        })
    }

    fn rotate(&self, rho: &ComplexMatrix, unitary: &ComplexMatrix) -> Result<ComplexMatrix> {
        let (n, precision) = square_pair(self, rho, unitary)?;
        let min_len = self.rayon_min_len();
        dispatch_precision!(precision, T => {
            let (r, u) = (rho.as_slice::<T>()?, unitary.as_slice::<T>()?);
            let out = self.install_parallelism(|| kernels::rotate(r, u, n, min_len));
            ComplexMatrix::from_vec(n, n, out)
        })
    }

    fn get_random_haar_1d(&self, depth: usize, precision: Precision) -> Result<ComplexVector> {
        require_positive("depth", depth)?;
        require_precision(self, precision)?;
        dispatch_precision!(precision, T => {
            Ok(ComplexVector::from_vec(kernels::haar_vector::<T>(depth)))
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
        let min_len = self.rayon_min_len();
        dispatch_precision!(precision, T => {
            let out = self.install_parallelism(|| kernels::haar_rows::<T>(count, depth, min_len));
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
        let min_len = self.rayon_min_len();
        dispatch_precision!(value.precision(), T => {
            let data = value.as_slice::<T>()?;
            let out = self.install_parallelism(|| kernels::expand(data, n, lead, trail, min_len));
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
        DfsParams::new(depth, quantity, idx).identity_sides()?;
        require_precision(self, precision)?;
        let min_len = self.rayon_min_len();
        let unitary = dispatch_precision!(precision, T => {
            let axis = kernels::haar_vector::<T>(depth);
            let u = kernels::unitary_from_axis(&axis, UNITARY_ROTATION_ANGLE, min_len);
            ComplexMatrix::from_vec(depth, depth, u)?
        });
        self.expand_d_fs(&unitary, depth, quantity, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReferenceBackend;
    use crate::dtype::Complex128;

    fn ramp_matrix(n: usize) -> ComplexMatrix {
        let data: Vec<Complex128> = (0..n * n)
            .map(|i| Complex128::new((i % 7) as f64 * 0.25, (i % 3) as f64 - 1.0))
            .collect();
        ComplexMatrix::from_vec(n, n, data).unwrap()
    }

    #[test]
    fn test_with_parallelism_validation() {
        let backend =
            ParallelBackend::with_parallelism(ParallelismConfig::new(Some(2), Some(3))).unwrap();
        assert_eq!(backend.parallelism().chunk_rows, Some(3));
        assert!(backend.noop().is_ok());

        assert!(matches!(
            ParallelBackend::with_parallelism(ParallelismConfig::new(Some(0), None)),
            Err(Error::InvalidArgument { arg: "num_threads", .. })
        ));
        assert!(matches!(
            ParallelBackend::with_parallelism(ParallelismConfig::new(None, Some(0))),
            Err(Error::InvalidArgument { arg: "chunk_rows", .. })
        ));
    }

    #[test]
    fn test_structural_ops_match_reference_exactly() {
        let reference = ReferenceBackend::new();
        let m = ramp_matrix(4);
        for config in [
            ParallelismConfig::default(),
            ParallelismConfig::new(Some(1), Some(1024)),
            ParallelismConfig::new(Some(3), Some(2)),
        ] {
            let parallel = ParallelBackend::with_parallelism(config).unwrap();
            assert_eq!(
                parallel.expand_d_fs(&m, 2, 3, 1).unwrap(),
                reference.expand_d_fs(&m, 2, 3, 1).unwrap(),
            );
            assert_eq!(
                parallel.kronecker(&m, &m).unwrap(),
                reference.kronecker(&m, &m).unwrap(),
            );
        }
    }

    #[test]
    fn test_product_independent_of_thread_count() {
        let m = ramp_matrix(9);
        let one = ParallelBackend::with_parallelism(ParallelismConfig::new(Some(1), None))
            .unwrap()
            .product(&m, &m)
            .unwrap();
        let four = ParallelBackend::with_parallelism(ParallelismConfig::new(Some(4), None))
            .unwrap()
            .product(&m, &m)
            .unwrap();
        assert_eq!(one.to_bits(), four.to_bits());
    }
}
