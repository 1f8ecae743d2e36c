//! Distribution-level comparison of randomized operations
//!
//! Each backend's sampling procedure is run independently (no shared seed) and
//! reduced to summary statistics. Two procedures agree when those statistics
//! agree within the configured tolerances.

use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::tensor::{ComplexArray, ComplexMatrix};
use std::fmt;

// ============================================================================
// Configuration
// ============================================================================

/// Tolerances for summary-statistic agreement
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StatisticalConfig {
    /// Histogram bin count over the shared magnitude range
    pub bins: usize,
    /// Decimal digits the complex sample means must agree to
    pub mean_decimals: u32,
    /// Largest permitted per-bin difference in relative frequency
    pub frequency_tolerance: f64,
    /// Largest permitted difference in mean magnitude
    pub magnitude_mean_tolerance: f64,
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        Self {
            bins: 6,
            mean_decimals: 2,
            frequency_tolerance: 0.01,
            magnitude_mean_tolerance: 0.01,
        }
    }
}

// ============================================================================
// Histogram
// ============================================================================

/// Compute histogram bin index for a value.
///
/// # Arguments
///
/// * `value` - The value to bin
/// * `min_val` - Lower edge of the first bin
/// * `bin_width` - Width of each bin
/// * `bins` - Number of bins
///
/// # Notes
///
/// - Values below `min_val` are placed in bin 0
/// - Values at or above the upper edge are placed in the last bin
#[inline]
pub fn compute_bin_index(value: f64, min_val: f64, bin_width: f64, bins: usize) -> usize {
    let idx = ((value - min_val) / bin_width).floor() as isize;
    if idx < 0 {
        0
    } else if idx >= bins as isize {
        bins - 1
    } else {
        idx as usize
    }
}

/// Equal-width histogram over a closed range
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<usize>,
    total: usize,
}

impl Histogram {
    /// Bin `values` into `bins` equal bins over `[min, max]`
    ///
    /// Fails with `InvalidArgument` if `bins == 0` or the range is empty or
    /// not finite.
    pub fn build(values: &[f64], bins: usize, (min, max): (f64, f64)) -> Result<Self> {
        if bins == 0 {
            return Err(Error::invalid_argument("bins", "must be at least 1"));
        }
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(Error::invalid_argument(
                "range",
                format!("[{min}, {max}] is not a non-empty finite range"),
            ));
        }
        let bin_width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            counts[compute_bin_index(v, min, bin_width, bins)] += 1;
        }
        Ok(Self {
            min,
            max,
            counts,
            total: values.len(),
        })
    }

    /// Number of bins
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Raw bin counts
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// `(min, max)` of the binned range
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// True if no value was binned
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Relative frequency of each bin (all zero for an empty histogram)
    pub fn frequencies(&self) -> Vec<f64> {
        if self.total == 0 {
            return vec![0.0; self.counts.len()];
        }
        let total = self.total as f64;
        self.counts.iter().map(|&c| c as f64 / total).collect()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}] ", self.min, self.max)?;
        let freqs: Vec<String> = self.frequencies().iter().map(|p| format!("{p:.4}")).collect();
        write!(f, "{{{}}}", freqs.join(" "))
    }
}

// ============================================================================
// Sample sets
// ============================================================================

/// What a [`SampleSet`] keeps besides running moments
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Retention {
    /// Keep every element magnitude (needed for histograms)
    Magnitudes,
    /// Keep only running sums; memory independent of draw count
    MomentsOnly,
}

/// Reduced view of many draws of one randomized operation
///
/// Draws are consumed as they are pushed; only the statistics (and, with
/// [`Retention::Magnitudes`], element magnitudes) are retained.
#[derive(Clone, Debug)]
pub struct SampleSet {
    retention: Retention,
    shape: Option<Vec<usize>>,
    draws: usize,
    elements: usize,
    sum: Complex128,
    magnitude_sum: f64,
    max_magnitude: f64,
    magnitudes: Vec<f64>,
}

impl SampleSet {
    /// Empty sample set
    pub fn new(retention: Retention) -> Self {
        Self {
            retention,
            shape: None,
            draws: 0,
            elements: 0,
            sum: Complex128::ZERO,
            magnitude_sum: 0.0,
            max_magnitude: 0.0,
            magnitudes: Vec::new(),
        }
    }

    /// Run `draw` `draws` times and reduce the outputs
    pub fn collect<F>(draws: usize, retention: Retention, mut draw: F) -> Result<Self>
    where
        F: FnMut() -> Result<ComplexArray>,
    {
        let mut set = Self::new(retention);
        for _ in 0..draws {
            set.push(&draw()?)?;
        }
        Ok(set)
    }

    /// Treat each row of `rows` as one vector draw
    pub fn from_rows(rows: &ComplexMatrix, retention: Retention) -> Result<Self> {
        let mut set = Self::new(retention);
        let cols = rows.cols();
        if cols == 0 {
            return Ok(set);
        }
        let values: Vec<Complex128> = rows.buffer().widened().collect();
        for row in values.chunks(cols) {
            set.push_values(&[cols], row.iter().copied())?;
        }
        Ok(set)
    }

    /// Add one draw; every draw must have the same shape
    pub fn push(&mut self, draw: &ComplexArray) -> Result<()> {
        self.push_values(&draw.shape(), draw.buffer().widened())
    }

    fn push_values(&mut self, shape: &[usize], values: impl Iterator<Item = Complex128>) -> Result<()> {
        let expected = self.shape.get_or_insert_with(|| shape.to_vec());
        if expected.as_slice() != shape {
            return Err(Error::shape_mismatch(expected, shape));
        }
        for z in values {
            let m = z.magnitude();
            self.sum += z;
            self.magnitude_sum += m;
            self.max_magnitude = self.max_magnitude.max(m);
            self.elements += 1;
            if self.retention == Retention::Magnitudes {
                self.magnitudes.push(m);
            }
        }
        self.draws += 1;
        Ok(())
    }

    /// Shape shared by all draws (None before the first draw)
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// Number of draws
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Number of scalar elements seen across all draws
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Mean of all elements
    pub fn mean(&self) -> Complex128 {
        if self.elements == 0 {
            Complex128::ZERO
        } else {
            let n = self.elements as f64;
            Complex128::new(self.sum.re / n, self.sum.im / n)
        }
    }

    /// Mean of all element magnitudes
    pub fn magnitude_mean(&self) -> f64 {
        if self.elements == 0 {
            0.0
        } else {
            self.magnitude_sum / self.elements as f64
        }
    }

    /// Largest element magnitude
    pub fn max_magnitude(&self) -> f64 {
        self.max_magnitude
    }

    /// Retained magnitudes (empty under [`Retention::MomentsOnly`])
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Compares two [`SampleSet`]s
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StatisticalChecker {
    config: StatisticalConfig,
}

impl StatisticalChecker {
    /// Create a checker
    pub fn new(config: StatisticalConfig) -> Self {
        Self { config }
    }

    /// Active tolerances
    pub fn config(&self) -> &StatisticalConfig {
        &self.config
    }

    /// Both procedures must produce draws of the same shape
    pub fn compare_shapes(&self, op: &str, reference: &SampleSet, candidate: &SampleSet) -> Result<()> {
        match (reference.shape(), candidate.shape()) {
            (Some(r), Some(c)) if r == c => Ok(()),
            (Some(r), Some(c)) => Err(Error::shape_mismatch(r, c)),
            _ => Err(mismatch(op, "shape", "no draws", "no draws")),
        }
    }

    /// Histograms of element magnitudes over `[0, max(max_ref, max_cand)]`
    ///
    /// Both histograms must be non-empty with the configured bin count, and
    /// every bin's relative frequency must agree within
    /// `frequency_tolerance`.
    pub fn compare_histograms(
        &self,
        op: &str,
        reference: &SampleSet,
        candidate: &SampleSet,
    ) -> Result<(Histogram, Histogram)> {
        let upper = reference.max_magnitude().max(candidate.max_magnitude());
        let range = (0.0, upper);
        let ref_hist = Histogram::build(reference.magnitudes(), self.config.bins, range)?;
        let cand_hist = Histogram::build(candidate.magnitudes(), self.config.bins, range)?;

        if ref_hist.is_empty() || cand_hist.is_empty() {
            return Err(mismatch(
                op,
                "histogram",
                format!("{} magnitudes", reference.magnitudes().len()),
                format!("{} magnitudes", candidate.magnitudes().len()),
            ));
        }
        if ref_hist.bin_count() != cand_hist.bin_count() {
            return Err(mismatch(
                op,
                "histogram bin count",
                ref_hist.bin_count(),
                cand_hist.bin_count(),
            ));
        }
        let gap = ref_hist
            .frequencies()
            .iter()
            .zip(cand_hist.frequencies())
            .map(|(r, c)| (r - c).abs())
            .fold(0.0f64, f64::max);
        if gap > self.config.frequency_tolerance {
            return Err(mismatch(op, "histogram", &ref_hist, &cand_hist));
        }
        Ok((ref_hist, cand_hist))
    }

    /// Mean element magnitudes must agree within `magnitude_mean_tolerance`
    pub fn compare_magnitude_means(
        &self,
        op: &str,
        reference: &SampleSet,
        candidate: &SampleSet,
    ) -> Result<()> {
        let (r, c) = (reference.magnitude_mean(), candidate.magnitude_mean());
        if (r - c).abs() <= self.config.magnitude_mean_tolerance {
            Ok(())
        } else {
            Err(mismatch(op, "mean magnitude", format!("{r:.6}"), format!("{c:.6}")))
        }
    }

    /// Complex sample means must be equal after rounding to `mean_decimals`
    pub fn compare_rounded_means(
        &self,
        op: &str,
        reference: &SampleSet,
        candidate: &SampleSet,
    ) -> Result<()> {
        let r = reference.mean().rounded(self.config.mean_decimals);
        let c = candidate.mean().rounded(self.config.mean_decimals);
        if r == c {
            Ok(())
        } else {
            Err(mismatch(
                op,
                "rounded mean",
                format!("{} (raw {})", r, reference.mean()),
                format!("{} (raw {})", c, candidate.mean()),
            ))
        }
    }
}

fn mismatch(
    op: &str,
    statistic: &'static str,
    reference: impl fmt::Display,
    candidate: impl fmt::Display,
) -> Error {
    Error::DistributionMismatch {
        op: op.to_string(),
        statistic,
        reference: reference.to_string(),
        candidate: candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::ComplexVector;

    #[test]
    fn test_compute_bin_index_clamps() {
        assert_eq!(compute_bin_index(-1.0, 0.0, 0.5, 4), 0);
        assert_eq!(compute_bin_index(0.0, 0.0, 0.5, 4), 0);
        assert_eq!(compute_bin_index(0.74, 0.0, 0.5, 4), 1);
        assert_eq!(compute_bin_index(2.0, 0.0, 0.5, 4), 3);
        assert_eq!(compute_bin_index(9.0, 0.0, 0.5, 4), 3);
    }

    #[test]
    fn test_histogram_build() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, 1.0];
        let hist = Histogram::build(&values, 2, (0.0, 1.0)).unwrap();
        assert_eq!(hist.counts(), &[2, 4]);
        assert_eq!(hist.frequencies(), vec![2.0 / 6.0, 4.0 / 6.0]);

        assert!(Histogram::build(&values, 0, (0.0, 1.0)).is_err());
        assert!(Histogram::build(&values, 6, (0.0, 0.0)).is_err());
    }

    #[test]
    fn test_sample_set_moments() {
        let v = ComplexVector::from_vec(vec![Complex128::new(3.0, 4.0), Complex128::new(0.0, -2.0)]);
        let set = SampleSet::collect(3, Retention::Magnitudes, || Ok(v.clone().into())).unwrap();
        assert_eq!(set.draws(), 3);
        assert_eq!(set.elements(), 6);
        assert_eq!(set.shape(), Some(&[2][..]));
        assert_eq!(set.mean(), Complex128::new(1.5, 1.0));
        assert_eq!(set.magnitude_mean(), 3.5);
        assert_eq!(set.max_magnitude(), 5.0);
        assert_eq!(set.magnitudes().len(), 6);

        let lean = SampleSet::collect(3, Retention::MomentsOnly, || Ok(v.clone().into())).unwrap();
        assert!(lean.magnitudes().is_empty());
        assert_eq!(lean.mean(), set.mean());
    }

    #[test]
    fn test_sample_set_rejects_shape_change() {
        let mut set = SampleSet::new(Retention::MomentsOnly);
        set.push(&ComplexVector::from_vec(vec![Complex128::ONE; 2]).into())
            .unwrap();
        let err = set
            .push(&ComplexVector::from_vec(vec![Complex128::ONE; 3]).into())
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_rows_counts_each_row() {
        let rows = ComplexMatrix::from_vec(4, 2, vec![Complex128::ONE; 8]).unwrap();
        let set = SampleSet::from_rows(&rows, Retention::Magnitudes).unwrap();
        assert_eq!(set.draws(), 4);
        assert_eq!(set.shape(), Some(&[2][..]));
    }

    #[test]
    fn test_rounded_means() {
        let checker = StatisticalChecker::default();
        let near = |x: f64| {
            let v = ComplexVector::from_vec(vec![Complex128::new(x, -0.001)]);
            SampleSet::collect(1, Retention::MomentsOnly, || Ok(v.clone().into())).unwrap()
        };
        assert!(checker.compare_rounded_means("u", &near(0.0401), &near(0.0399)).is_ok());
        let err = checker
            .compare_rounded_means("u", &near(0.04), &near(0.06))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DistributionMismatch {
                statistic: "rounded mean",
                ..
            }
        ));
    }

    #[test]
    fn test_histogram_gap_detected() {
        let checker = StatisticalChecker::default();
        let set = |x: f64| {
            let v = ComplexVector::from_vec(vec![Complex128::new(x, 0.0), Complex128::new(1.0, 0.0)]);
            SampleSet::collect(10, Retention::Magnitudes, || Ok(v.clone().into())).unwrap()
        };
        assert!(checker.compare_histograms("h", &set(0.1), &set(0.1)).is_ok());
        assert!(matches!(
            checker.compare_histograms("h", &set(0.1), &set(0.9)),
            Err(Error::DistributionMismatch { .. })
        ));
        assert!(checker.compare_magnitude_means("h", &set(0.1), &set(0.105)).is_ok());
        assert!(checker.compare_magnitude_means("h", &set(0.1), &set(0.9)).is_err());
    }
}
