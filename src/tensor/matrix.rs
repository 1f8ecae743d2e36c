//! Immutable dense complex matrix

use super::ComplexBuffer;
use crate::dtype::{Complex128, ComplexElement, Precision};
use crate::error::{Error, Result};

/// Immutable 2-D complex matrix, row-major
///
/// Element `(r, c)` lives at flat index `r * cols + c`. Every backend produces
/// row-major output, so two matrices can be compared element by element
/// without any layout normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    data: ComplexBuffer,
}

impl ComplexMatrix {
    /// Create a matrix from row-major values
    ///
    /// Fails with `ShapeMismatch` if `data.len() != rows * cols`.
    pub fn from_vec<T: ComplexElement>(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        Self::from_buffer(rows, cols, T::into_buffer(data))
    }

    /// Create a matrix from a tagged buffer
    pub fn from_buffer(rows: usize, cols: usize, data: ComplexBuffer) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::shape_mismatch(&[rows * cols], &[data.len()]));
        }
        Ok(Self { rows, cols, data })
    }

    /// Zero matrix
    pub fn zeros(rows: usize, cols: usize, precision: Precision) -> Self {
        Self {
            rows,
            cols,
            data: ComplexBuffer::zeros(rows * cols, precision),
        }
    }

    /// Identity matrix of side `n`
    pub fn identity(n: usize, precision: Precision) -> Self {
        fn build<T: ComplexElement>(n: usize) -> ComplexBuffer {
            let mut data = vec![T::zero(); n * n];
            for i in 0..n {
                data[i * n + i] = T::one();
            }
            T::into_buffer(data)
        }
        let data = match precision {
            Precision::Complex64 => build::<crate::dtype::Complex64>(n),
            Precision::Complex128 => build::<Complex128>(n),
        };
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Total number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a 0-element matrix
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Precision of the elements
    #[inline]
    pub fn precision(&self) -> Precision {
        self.data.precision()
    }

    /// True if rows == cols
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Side length of a square matrix, `ShapeMismatch` otherwise
    pub fn square_side(&self) -> Result<usize> {
        if self.is_square() {
            Ok(self.rows)
        } else {
            Err(Error::shape_mismatch(
                &[self.rows, self.rows],
                &[self.rows, self.cols],
            ))
        }
    }

    /// Underlying tagged storage
    #[inline]
    pub fn buffer(&self) -> &ComplexBuffer {
        &self.data
    }

    /// Typed row-major view
    pub fn as_slice<T: ComplexElement>(&self) -> Result<&[T]> {
        self.data.as_slice()
    }

    /// Element `(r, c)` widened to Complex128
    pub fn get(&self, r: usize, c: usize) -> Option<Complex128> {
        if r < self.rows && c < self.cols {
            self.data.get(r * self.cols + c)
        } else {
            None
        }
    }

    /// Raw bytes of the row-major storage
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Copy into another precision
    pub fn cast(&self, precision: Precision) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.cast(precision),
        }
    }
}
