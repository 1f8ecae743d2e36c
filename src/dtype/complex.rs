//! Complex scalar types used by every backend
//!
//! `Complex64` and `Complex128` are `#[repr(C)]` pairs of real components that
//! are `Pod`, so a whole buffer can be viewed as bytes. Fixture determinism is
//! asserted on exactly those bytes.
//!
//! # Storage Format
//!
//! Interleaved (re, im, re, im...), the layout numpy and the usual BLAS-style
//! libraries use for complex arrays.
//!
//! Only the ring operations the kernels need are implemented. Checkers
//! compare values through [`Complex128::distance`] and
//! [`Complex128::rounded`].

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

macro_rules! impl_complex {
    (
        $name:ident,
        $float:ty,
        $doc_bits:literal,
        $doc_float_bits:literal
    ) => {
        #[doc = concat!($doc_bits, "-bit complex number with ", $doc_float_bits, " real and imaginary parts")]
        ///
        #[doc = concat!("Memory layout: ", stringify!($name), " is ", stringify!($float), " × 2, interleaved format.")]
        #[repr(C)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            /// Real part
            pub re: $float,
            /// Imaginary part
            pub im: $float,
        }

        impl $name {
            /// Zero complex number
            pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

            /// One (real unit)
            pub const ONE: Self = Self { re: 1.0, im: 0.0 };

            /// Create a new complex number
            #[inline]
            pub const fn new(re: $float, im: $float) -> Self {
                Self { re, im }
            }

            /// Create a complex number from polar form: r * e^(iθ)
            #[inline]
            pub fn from_polar(r: $float, theta: $float) -> Self {
                Self {
                    re: r * theta.cos(),
                    im: r * theta.sin(),
                }
            }

            /// Magnitude (absolute value): |z| = sqrt(re² + im²)
            #[inline]
            pub fn magnitude(self) -> $float {
                self.re.hypot(self.im)
            }

            /// Squared magnitude: |z|² = re² + im²
            #[inline]
            pub fn magnitude_squared(self) -> $float {
                self.re * self.re + self.im * self.im
            }

            /// Complex conjugate: conj(a + bi) = a - bi
            #[inline]
            pub fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }

            /// Multiply both components by a real factor
            #[inline]
            pub fn scale(self, k: $float) -> Self {
                Self {
                    re: self.re * k,
                    im: self.im * k,
                }
            }

            /// Modulus of the difference, `|self - other|`
            #[inline]
            pub fn distance(self, other: Self) -> $float {
                (self - other).magnitude()
            }

            /// Both components rounded half away from zero to `decimals` places
            ///
            /// A rounded `-0.0` becomes `0.0`, so equal rounded values also render
            /// identically.
            pub fn rounded(self, decimals: u32) -> Self {
                let scale = <$float>::powi(10.0, decimals as i32);
                let round = |x: $float| (x * scale).round() / scale + 0.0;
                Self {
                    re: round(self.re),
                    im: round(self.im),
                }
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self {
                    re: self.re + rhs.re,
                    im: self.im + rhs.im,
                }
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.re += rhs.re;
                self.im += rhs.im;
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self {
                    re: self.re - rhs.re,
                    im: self.im - rhs.im,
                }
            }
        }

        impl Mul for $name {
            type Output = Self;

            /// Complex multiplication: (a+bi)(c+di) = (ac-bd) + (ad+bc)i
            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self {
                    re: self.re * rhs.re - self.im * rhs.im,
                    im: self.re * rhs.im + self.im * rhs.re,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.im >= 0.0 {
                    write!(f, "{}+{}i", self.re, self.im)
                } else {
                    write!(f, "{}{}i", self.re, self.im)
                }
            }
        }
    };
}

impl_complex!(Complex64, f32, "64", "f32");
impl_complex!(Complex128, f64, "128", "f64");

impl From<Complex64> for Complex128 {
    #[inline]
    fn from(c: Complex64) -> Self {
        Self {
            re: c.re as f64,
            im: c.im as f64,
        }
    }
}

impl From<Complex128> for Complex64 {
    #[inline]
    fn from(c: Complex128) -> Self {
        Self {
            re: c.re as f32,
            im: c.im as f32,
        }
    }
}
