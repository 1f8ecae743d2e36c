//! ComplexElement trait for mapping Rust complex types to Precision

use super::{Complex64, Complex128, Precision};
use crate::tensor::ComplexBuffer;
use bytemuck::{Pod, Zeroable};
use num_traits::Float;
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Trait for complex scalar types that can live in a matrix or vector
///
/// This trait connects Rust's type system to the runtime precision tag, so a
/// kernel can be written once over `T: ComplexElement` and instantiated for
/// each precision through `dispatch_precision!`.
///
/// # Bounds
/// - `Pod + Zeroable` - buffers can be viewed as raw bytes (bytemuck)
/// - Ring arithmetic with `Output = Self`; nothing divides complex by complex
pub trait ComplexElement:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + Default
    + PartialEq
    + 'static
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Real component type (f32 or f64)
    type Real: Float + Sum + Send + Sync + Debug + 'static;

    /// The corresponding precision tag
    const PRECISION: Precision;

    /// Build from real components
    fn new(re: Self::Real, im: Self::Real) -> Self;

    /// Build from f64 components, narrowing if needed
    fn from_f64_parts(re: f64, im: f64) -> Self;

    /// Real part
    fn re(self) -> Self::Real;

    /// Imaginary part
    fn im(self) -> Self::Real;

    /// Complex conjugate
    fn conj(self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(self) -> Self::Real;

    /// Multiply by a real factor
    fn scale(self, k: Self::Real) -> Self;

    /// Widen to Complex128
    fn to_complex128(self) -> Complex128;

    /// Widen a real component to f64
    fn real_to_f64(r: Self::Real) -> f64;

    /// Narrow an f64 to the real component type
    fn real_from_f64(v: f64) -> Self::Real;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Borrow the buffer's storage if it holds this precision
    fn slice_of(buffer: &ComplexBuffer) -> Option<&[Self]>;

    /// Wrap owned values into a tagged buffer
    fn into_buffer(data: Vec<Self>) -> ComplexBuffer;
}

macro_rules! impl_complex_element {
    ($name:ident, $float:ty, $variant:ident) => {
        impl ComplexElement for $name {
            type Real = $float;

            const PRECISION: Precision = Precision::$variant;

            #[inline]
            fn new(re: $float, im: $float) -> Self {
                $name::new(re, im)
            }

            #[inline]
            fn from_f64_parts(re: f64, im: f64) -> Self {
                $name::new(re as $float, im as $float)
            }

            #[inline]
            fn re(self) -> $float {
                self.re
            }

            #[inline]
            fn im(self) -> $float {
                self.im
            }

            #[inline]
            fn conj(self) -> Self {
                $name::conj(self)
            }

            #[inline]
            fn norm_sqr(self) -> $float {
                self.magnitude_squared()
            }

            #[inline]
            fn scale(self, k: $float) -> Self {
                $name::scale(self, k)
            }

            #[inline]
            fn to_complex128(self) -> Complex128 {
                Complex128::from(self)
            }

            #[inline]
            fn real_to_f64(r: $float) -> f64 {
                r as f64
            }

            #[inline]
            fn real_from_f64(v: f64) -> $float {
                v as $float
            }

            #[inline]
            fn zero() -> Self {
                $name::ZERO
            }

            #[inline]
            fn one() -> Self {
                $name::ONE
            }

            #[inline]
            fn slice_of(buffer: &ComplexBuffer) -> Option<&[Self]> {
                match buffer {
                    ComplexBuffer::$variant(data) => Some(data.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn into_buffer(data: Vec<Self>) -> ComplexBuffer {
                ComplexBuffer::$variant(data)
            }
        }
    };
}

impl_complex_element!(Complex64, f32, Complex64);
impl_complex_element!(Complex128, f64, Complex128);
