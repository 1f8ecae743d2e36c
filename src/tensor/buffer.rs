//! Precision-tagged contiguous storage for complex values

use crate::dtype::{Complex64, Complex128, ComplexElement, Precision};
use crate::error::{Error, Result};
use std::slice;

/// Owned, contiguous complex storage tagged with its precision
///
/// Using an enum (rather than a generic parameter on every matrix) keeps the
/// backend interface object-safe and lets precision be selected at run time.
#[derive(Clone, Debug, PartialEq)]
pub enum ComplexBuffer {
    /// f32 components
    Complex64(Vec<Complex64>),
    /// f64 components
    Complex128(Vec<Complex128>),
}

impl ComplexBuffer {
    /// Zero-filled buffer of `len` elements
    pub fn zeros(len: usize, precision: Precision) -> Self {
        match precision {
            Precision::Complex64 => Self::Complex64(vec![Complex64::ZERO; len]),
            Precision::Complex128 => Self::Complex128(vec![Complex128::ZERO; len]),
        }
    }

    /// Precision of the stored values
    #[inline]
    pub fn precision(&self) -> Precision {
        match self {
            Self::Complex64(_) => Precision::Complex64,
            Self::Complex128(_) => Precision::Complex128,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Complex64(d) => d.len(),
            Self::Complex128(d) => d.len(),
        }
    }

    /// True if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `i` widened to Complex128
    pub fn get(&self, i: usize) -> Option<Complex128> {
        match self {
            Self::Complex64(d) => d.get(i).map(|z| z.to_complex128()),
            Self::Complex128(d) => d.get(i).copied(),
        }
    }

    /// Iterate over all elements widened to Complex128
    pub fn widened(&self) -> Widened<'_> {
        match self {
            Self::Complex64(d) => Widened::Complex64(d.iter()),
            Self::Complex128(d) => Widened::Complex128(d.iter()),
        }
    }

    /// Typed view of the storage
    ///
    /// Fails with `PrecisionMismatch` if `T` is not the stored precision.
    pub fn as_slice<T: ComplexElement>(&self) -> Result<&[T]> {
        T::slice_of(self).ok_or(Error::PrecisionMismatch {
            lhs: self.precision(),
            rhs: T::PRECISION,
        })
    }

    /// Raw little-endian bytes of the storage
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Complex64(d) => bytemuck::cast_slice(d),
            Self::Complex128(d) => bytemuck::cast_slice(d),
        }
    }

    /// Copy into another precision (narrowing rounds to nearest)
    pub fn cast(&self, precision: Precision) -> Self {
        if self.precision() == precision {
            return self.clone();
        }
        match precision {
            Precision::Complex64 => {
                Self::Complex64(self.widened().map(Complex64::from).collect())
            }
            Precision::Complex128 => Self::Complex128(self.widened().collect()),
        }
    }
}

/// Iterator over a [`ComplexBuffer`] yielding Complex128 values
pub enum Widened<'a> {
    /// Over f32 storage
    Complex64(slice::Iter<'a, Complex64>),
    /// Over f64 storage
    Complex128(slice::Iter<'a, Complex128>),
}

impl Iterator for Widened<'_> {
    type Item = Complex128;

    #[inline]
    fn next(&mut self) -> Option<Complex128> {
        match self {
            Self::Complex64(it) => it.next().map(|z| z.to_complex128()),
            Self::Complex128(it) => it.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Complex64(it) => it.size_hint(),
            Self::Complex128(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Widened<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_precision() {
        let b = ComplexBuffer::zeros(4, Precision::Complex64);
        assert_eq!(b.len(), 4);
        assert_eq!(b.precision(), Precision::Complex64);
        assert_eq!(b.as_bytes().len(), 4 * 8);
        assert!(ComplexBuffer::zeros(0, Precision::Complex128).is_empty());
    }

    #[test]
    fn test_as_slice_precision_mismatch() {
        let b = ComplexBuffer::zeros(2, Precision::Complex128);
        assert!(b.as_slice::<Complex128>().is_ok());
        match b.as_slice::<Complex64>() {
            Err(Error::PrecisionMismatch { lhs, rhs }) => {
                assert_eq!(lhs, Precision::Complex128);
                assert_eq!(rhs, Precision::Complex64);
            }
            other => panic!("expected PrecisionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_cast_narrows_and_widens() {
        let b = ComplexBuffer::Complex128(vec![Complex128::new(0.1, 0.2), Complex128::new(1.0, -1.0)]);
        let narrow = b.cast(Precision::Complex64);
        assert_eq!(narrow.precision(), Precision::Complex64);
        assert_eq!(narrow.get(1), Some(Complex128::new(1.0, -1.0)));
        let z = narrow.get(0).unwrap();
        assert!((z.re - 0.1).abs() < 1e-7 && (z.im - 0.2).abs() < 1e-7);

        let wide = narrow.cast(Precision::Complex128);
        assert_eq!(wide.widened().len(), 2);
        assert_eq!(wide.cast(Precision::Complex128), wide);
    }
}
