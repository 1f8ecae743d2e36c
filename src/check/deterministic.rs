//! Pointwise comparison of concrete outputs

use super::Tolerance;
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::tensor::{ComplexArray, Output};

/// Elements shown from each operand in a failure message
const PREVIEW_ELEMENTS: usize = 8;

/// Summary of a successful comparison
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Comparison {
    /// Largest absolute difference observed (0 for unit outputs)
    pub max_diff: f64,
    /// Number of values compared
    pub elements: usize,
}

/// Compares reference and candidate outputs under one [`Tolerance`]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DeterministicChecker {
    tolerance: Tolerance,
}

impl DeterministicChecker {
    /// Create a checker
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Tolerance in force
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Compare two outputs of `op`
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the shapes (or output kinds) differ
    /// - `PrecisionMismatch` if two arrays carry different precisions
    /// - `ToleranceExceeded` if any value pair is not admitted; the error
    ///   carries the worst index, the maximum difference and bounded previews
    ///   of both operands
    pub fn check(&self, op: &str, reference: &Output, candidate: &Output) -> Result<Comparison> {
        match (reference, candidate) {
            (Output::Unit, Output::Unit) => Ok(Comparison {
                max_diff: 0.0,
                elements: 0,
            }),
            (Output::Scalar(r), Output::Scalar(c)) => self.check_scalar(op, *r, *c),
            (Output::Array(r), Output::Array(c)) => self.check_array(op, r, c),
            _ => Err(Error::shape_mismatch(&reference.shape(), &candidate.shape())),
        }
    }

    fn check_scalar(&self, op: &str, reference: f64, candidate: f64) -> Result<Comparison> {
        let diff = (reference - candidate).abs();
        if self.tolerance.admits_scalar(reference, candidate) {
            Ok(Comparison {
                max_diff: diff,
                elements: 1,
            })
        } else {
            Err(Error::ToleranceExceeded {
                op: op.to_string(),
                index: None,
                max_diff: diff,
                tolerance: self.tolerance.to_string(),
                reference: format!("{reference:e}"),
                candidate: format!("{candidate:e}"),
            })
        }
    }

    fn check_array(
        &self,
        op: &str,
        reference: &ComplexArray,
        candidate: &ComplexArray,
    ) -> Result<Comparison> {
        if reference.shape() != candidate.shape() {
            return Err(Error::shape_mismatch(&reference.shape(), &candidate.shape()));
        }
        if reference.precision() != candidate.precision() {
            return Err(Error::PrecisionMismatch {
                lhs: reference.precision(),
                rhs: candidate.precision(),
            });
        }

        let mut max_diff = 0.0f64;
        // (index, diff) of the worst rejected pair; NaN ranks as infinite
        let mut worst: Option<(usize, f64)> = None;
        let pairs = reference.buffer().widened().zip(candidate.buffer().widened());
        for (i, (r, c)) in pairs.enumerate() {
            let diff = r.distance(c);
            let rank = if diff.is_nan() { f64::INFINITY } else { diff };
            max_diff = max_diff.max(rank);
            if !self.tolerance.admits(r, c) && worst.is_none_or(|(_, d)| rank > d) {
                worst = Some((i, rank));
            }
        }

        match worst {
            None => Ok(Comparison {
                max_diff,
                elements: reference.len(),
            }),
            Some((index, _)) => Err(Error::ToleranceExceeded {
                op: op.to_string(),
                index: Some(index),
                max_diff,
                tolerance: self.tolerance.to_string(),
                reference: preview(reference),
                candidate: preview(candidate),
            }),
        }
    }
}

/// Shape, precision and the first few elements of an array
fn preview(array: &ComplexArray) -> String {
    let head: Vec<String> = array
        .buffer()
        .widened()
        .take(PREVIEW_ELEMENTS)
        .map(|z: Complex128| z.to_string())
        .collect();
    let more = if array.len() > PREVIEW_ELEMENTS {
        format!(", ... ({} total)", array.len())
    } else {
        String::new()
    };
    format!(
        "{:?} {} [{}{}]",
        array.shape(),
        array.precision(),
        head.join(", "),
        more
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Precision;
    use crate::tensor::{ComplexMatrix, ComplexVector};

    fn vector(values: &[(f64, f64)]) -> Output {
        let data: Vec<Complex128> = values
            .iter()
            .map(|&(re, im)| Complex128::new(re, im))
            .collect();
        ComplexVector::from_vec(data).into()
    }

    #[test]
    fn test_scalar_within_tolerance() {
        let checker = DeterministicChecker::new(Tolerance::Absolute(1e-6));
        let cmp = checker
            .check("product", &Output::Scalar(1.0), &Output::Scalar(1.0 + 1e-9))
            .unwrap();
        assert_eq!(cmp.elements, 1);
        assert!(cmp.max_diff < 1e-8);

        let err = checker
            .check("product", &Output::Scalar(1.0), &Output::Scalar(1.1))
            .unwrap_err();
        assert!(matches!(err, Error::ToleranceExceeded { index: None, .. }));
    }

    #[test]
    fn test_reports_worst_element() {
        let checker = DeterministicChecker::new(Tolerance::Absolute(1e-3));
        let reference = vector(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let candidate = vector(&[(1.0, 0.01), (2.0, 0.5), (3.0, 0.0)]);
        match checker.check("normalize", &reference, &candidate) {
            Err(Error::ToleranceExceeded {
                op, index, max_diff, ..
            }) => {
                assert_eq!(op, "normalize");
                assert_eq!(index, Some(1));
                assert_eq!(max_diff, 0.5);
            }
            other => panic!("expected ToleranceExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_and_precision_checked_first() {
        let checker = DeterministicChecker::default();
        let a = Output::from(ComplexMatrix::identity(2, Precision::Complex128));
        let b = Output::from(ComplexMatrix::identity(3, Precision::Complex128));
        let c = Output::from(ComplexMatrix::identity(2, Precision::Complex64));
        assert!(matches!(
            checker.check("kronecker", &a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            checker.check("kronecker", &a, &c),
            Err(Error::PrecisionMismatch { .. })
        ));
        assert!(matches!(
            checker.check("kronecker", &a, &Output::Scalar(1.0)),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(checker.check("noop", &Output::Unit, &Output::Unit).unwrap().elements, 0);
    }

    #[test]
    fn test_exact_tolerance_rejects_one_ulp() {
        let checker = DeterministicChecker::new(Tolerance::Exact);
        let reference = vector(&[(0.5, 0.25)]);
        let candidate = vector(&[(0.5, 0.25 + f64::EPSILON)]);
        assert!(checker.check("expand_d_fs", &reference, &reference).is_ok());
        assert!(checker.check("expand_d_fs", &reference, &candidate).is_err());
    }

    #[test]
    fn test_preview_is_bounded() {
        let data = vec![Complex128::ONE; 100];
        let text = preview(&ComplexVector::from_vec(data).into());
        assert!(text.starts_with("[100] complex128 ["));
        assert!(text.ends_with("... (100 total)]"));
        assert_eq!(text.matches("1+0i").count(), PREVIEW_ELEMENTS);
    }
}
