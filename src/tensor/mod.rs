//! Complex matrix and vector types
//!
//! Backends consume and produce these immutable containers. Storage is a
//! precision-tagged [`ComplexBuffer`]; matrices are always row-major.

mod buffer;
mod matrix;
mod vector;

pub use buffer::{ComplexBuffer, Widened};
pub use matrix::ComplexMatrix;
pub use vector::ComplexVector;

use crate::dtype::Precision;

/// A matrix or a vector
///
/// `normalize` accepts either and returns the same kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ComplexArray {
    /// 1-D operand
    Vector(ComplexVector),
    /// 2-D operand
    Matrix(ComplexMatrix),
}

impl ComplexArray {
    /// Shape as a dimension list (`[len]` or `[rows, cols]`)
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Vector(v) => vec![v.len()],
            Self::Matrix(m) => m.shape().to_vec(),
        }
    }

    /// Precision of the elements
    pub fn precision(&self) -> Precision {
        self.buffer().precision()
    }

    /// Underlying tagged storage
    pub fn buffer(&self) -> &ComplexBuffer {
        match self {
            Self::Vector(v) => v.buffer(),
            Self::Matrix(m) => m.buffer(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }
}

impl From<ComplexVector> for ComplexArray {
    fn from(v: ComplexVector) -> Self {
        Self::Vector(v)
    }
}

impl From<ComplexMatrix> for ComplexArray {
    fn from(m: ComplexMatrix) -> Self {
        Self::Matrix(m)
    }
}

/// Result of one backend operation, as seen by the checkers
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// `noop` produces nothing
    Unit,
    /// Real scalar (`product`)
    Scalar(f64),
    /// Vector or matrix
    Array(ComplexArray),
}

impl Output {
    /// Shape as a dimension list; scalars and unit have shape `[]`
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Unit | Self::Scalar(_) => Vec::new(),
            Self::Array(a) => a.shape(),
        }
    }
}

impl From<ComplexMatrix> for Output {
    fn from(m: ComplexMatrix) -> Self {
        Self::Array(m.into())
    }
}

impl From<ComplexVector> for Output {
    fn from(v: ComplexVector) -> Self {
        Self::Array(v.into())
    }
}

impl From<ComplexArray> for Output {
    fn from(a: ComplexArray) -> Self {
        Self::Array(a)
    }
}

impl From<f64> for Output {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}
