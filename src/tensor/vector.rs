//! Immutable dense complex vector

use super::ComplexBuffer;
use crate::dtype::{Complex128, ComplexElement, Precision};
use crate::error::Result;

/// Immutable 1-D complex vector
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexVector {
    data: ComplexBuffer,
}

impl ComplexVector {
    /// Create a vector from owned values
    pub fn from_vec<T: ComplexElement>(data: Vec<T>) -> Self {
        Self {
            data: T::into_buffer(data),
        }
    }

    /// Create a vector from a tagged buffer
    pub fn from_buffer(data: ComplexBuffer) -> Self {
        Self { data }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a 0-length vector
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Precision of the elements
    #[inline]
    pub fn precision(&self) -> Precision {
        self.data.precision()
    }

    /// Underlying tagged storage
    #[inline]
    pub fn buffer(&self) -> &ComplexBuffer {
        &self.data
    }

    /// Typed view
    pub fn as_slice<T: ComplexElement>(&self) -> Result<&[T]> {
        self.data.as_slice()
    }

    /// Element `i` widened to Complex128
    pub fn get(&self, i: usize) -> Option<Complex128> {
        self.data.get(i)
    }

    /// Raw bytes of the storage
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Copy into another precision
    pub fn cast(&self, precision: Precision) -> Self {
        Self {
            data: self.data.cast(precision),
        }
    }
}
