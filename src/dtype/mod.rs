//! Scalar precision system for conformr
//!
//! This module provides the `Precision` enum tagging the floating-point width
//! of every complex value in a run, the `PrecisionSet` capability set backends
//! use to advertise what they implement, and the `ComplexElement` trait that
//! connects concrete Rust scalar types to their runtime tag.

pub mod complex;
mod element;

pub use complex::{Complex64, Complex128};
pub use element::ComplexElement;

use crate::error::{Error, Result};
use std::fmt;

// ============================================================================
// Precision Enum
// ============================================================================

/// Scalar precision of complex values
///
/// Fixed for the lifetime of one conformance run. Every fixture, operand and
/// output in that run carries the same tag.
///
/// # Discriminant Values
///
/// Discriminants follow the complex range of a wider dtype numbering scheme
/// (Complex64=40, Complex128=41) and are used as bit positions in
/// [`PrecisionSet`]. Existing values are never changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Precision {
    /// 64-bit complex (two f32: re, im)
    Complex64 = 40,
    /// 128-bit complex (two f64: re, im)
    Complex128 = 41,
}

impl Precision {
    /// Every precision, narrowest first
    pub const ALL: [Precision; 2] = [Precision::Complex64, Precision::Complex128];

    /// Size of one complex element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    /// Bit width of each real component
    #[inline]
    pub const fn component_bits(self) -> u32 {
        match self {
            Self::Complex64 => 32,
            Self::Complex128 => 64,
        }
    }

    /// Short name used in logs and reports
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Complex64 => "c64",
            Self::Complex128 => "c128",
        }
    }

    /// Default absolute tolerance for deterministic comparisons
    ///
    /// Complex64 accumulates in f32, so two correct backends that sum in a
    /// different order legitimately drift further apart than in f64.
    pub const fn default_tolerance(self) -> f64 {
        match self {
            Self::Complex64 => 1e-4,
            Self::Complex128 => 1e-6,
        }
    }

    /// Parse a precision name
    ///
    /// Accepts `complex64`/`c64` and `complex128`/`c128`, case-insensitive.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "complex64" | "c64" => Ok(Self::Complex64),
            "complex128" | "c128" => Ok(Self::Complex128),
            _ => Err(Error::invalid_argument(
                "precision",
                format!("unknown precision '{s}' (valid: complex64, complex128)"),
            )),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complex64 => write!(f, "complex64"),
            Self::Complex128 => write!(f, "complex128"),
        }
    }
}

// ============================================================================
// PrecisionSet
// ============================================================================

/// Set of precisions for efficient membership testing
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrecisionSet {
    bits: u64,
}

impl PrecisionSet {
    /// Empty set
    pub const EMPTY: Self = Self { bits: 0 };

    /// Every precision
    pub const ALL: Self = Self {
        bits: (1 << Precision::Complex64 as u8) | (1 << Precision::Complex128 as u8),
    };

    /// Create a set containing a single precision
    #[inline]
    pub const fn single(precision: Precision) -> Self {
        Self {
            bits: 1 << precision as u8,
        }
    }

    /// Check if the set contains a precision
    #[inline]
    pub const fn contains(self, precision: Precision) -> bool {
        self.bits & (1 << precision as u8) != 0
    }

    /// Union of two sets
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Intersection of two sets
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Check if set is empty
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterate over the members, narrowest first
    pub fn iter(self) -> impl Iterator<Item = Precision> {
        Precision::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}
