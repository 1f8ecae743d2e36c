//! Precision dispatch for backend kernels
//!
//! Kernels are written once over `T: ComplexElement`; `dispatch_precision!`
//! binds `T` to the concrete scalar type matching a runtime [`Precision`].
//!
//! ```ignore
//! fn op(m: &ComplexMatrix) -> Result<f64> {
//!     dispatch_precision!(m.precision(), T => {
//!         let data = m.as_slice::<T>()?;
//!         Ok(kernels::something::<T>(data))
//!     })
//! }
//! ```
//!
//! [`Precision`]: crate::dtype::Precision

/// Bind `$T` to the scalar type for `$precision` and evaluate `$body`
macro_rules! dispatch_precision {
    ($precision:expr, $T:ident => $body:block) => {
        match $precision {
            $crate::dtype::Precision::Complex64 => {
                type $T = $crate::dtype::Complex64;
                $body
            }
            $crate::dtype::Precision::Complex128 => {
                type $T = $crate::dtype::Complex128;
                $body
            }
        }
    };
}

pub(crate) use dispatch_precision;
