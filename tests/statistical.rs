//! Distribution-level properties of the randomized operations

mod common;

use common::candidates;
use conformr::backend::{Backend, ReferenceBackend};
use conformr::check::{Retention, SampleSet, StatisticalChecker, StatisticalConfig};
use conformr::dtype::{Complex128, Precision};
use conformr::error::Error;
use conformr::tensor::{ComplexArray, ComplexMatrix};

fn haar_sample(backend: &dyn Backend, draws: usize) -> SampleSet {
    SampleSet::collect(draws, Retention::Magnitudes, || {
        backend
            .get_random_haar_1d(5, Precision::Complex128)
            .map(ComplexArray::Vector)
    })
    .unwrap()
}

#[test]
fn test_haar_samples_are_unit_vectors() {
    for backend in candidates() {
        for precision in Precision::ALL {
            let tol = precision.default_tolerance();
            for _ in 0..50 {
                let v = backend.get_random_haar_1d(7, precision).unwrap();
                assert_eq!(v.len(), 7);
                assert_eq!(v.precision(), precision);
                let norm: f64 = v.buffer().widened().map(|z| z.magnitude_squared()).sum();
                assert!((norm - 1.0).abs() < tol, "{}: norm² = {norm}", backend.name());
            }
            let rows = backend.get_random_haar_2d(64, 3, precision).unwrap();
            assert_eq!(rows.shape(), [64, 3]);
            for r in 0..64 {
                let norm: f64 = (0..3)
                    .filter_map(|c| rows.get(r, c))
                    .map(|z| z.magnitude_squared())
                    .sum();
                assert!((norm - 1.0).abs() < tol);
            }
        }
    }
}

#[test]
fn test_haar_magnitude_mean_matches_theory() {
    // E|v_i|² = 1/d, so the component modulus clusters near 1/sqrt(d)
    let sample = haar_sample(&ReferenceBackend::new(), 20_000);
    assert_eq!(sample.draws(), 20_000);
    assert_eq!(sample.elements(), 100_000);
    let mean_sq: f64 = sample.magnitudes().iter().map(|m| m * m).sum::<f64>() / 100_000.0;
    assert!((mean_sq - 0.2).abs() < 0.005, "mean |v_i|² = {mean_sq}");
    assert!(sample.max_magnitude() <= 1.0 + 1e-12);
}

#[test]
fn test_independent_haar_runs_agree_in_distribution() {
    let checker = StatisticalChecker::new(StatisticalConfig::default());
    for backend in candidates() {
        let r = haar_sample(&ReferenceBackend::new(), 20_000);
        let c = haar_sample(backend.as_ref(), 20_000);
        checker.compare_shapes("get_random_haar_1d", &r, &c).unwrap();
        checker.compare_histograms("get_random_haar_1d", &r, &c).unwrap();
        checker
            .compare_magnitude_means("get_random_haar_1d", &r, &c)
            .unwrap();
    }
}

#[test]
fn test_uniform_phases_fail_haar_comparison() {
    // Equal-modulus vectors have the right norm but the wrong distribution
    let flat = Complex128::new(1.0 / 5f64.sqrt(), 0.0);
    let data = vec![flat; 5 * 20_000];
    let rows = ComplexMatrix::from_vec(20_000, 5, data).unwrap();
    let candidate = SampleSet::from_rows(&rows, Retention::Magnitudes).unwrap();
    let reference = haar_sample(&ReferenceBackend::new(), 20_000);

    let checker = StatisticalChecker::new(StatisticalConfig::default());
    assert!(matches!(
        checker.compare_histograms("get_random_haar_2d", &reference, &candidate),
        Err(Error::DistributionMismatch {
            statistic: "histogram",
            ..
        })
    ));
}

#[test]
fn test_random_unitary_rounded_mean() {
    let checker = StatisticalChecker::new(StatisticalConfig::default());
    let sample = |backend: &dyn Backend| {
        SampleSet::collect(300, Retention::MomentsOnly, || {
            backend
                .random_unitary_d_fs(5, 2, 1, Precision::Complex128)
                .map(ComplexArray::Matrix)
        })
        .unwrap()
    };
    let reference = sample(&ReferenceBackend::new());
    assert_eq!(reference.shape(), Some(&[25usize, 25][..]));
    // mean entry of I_5 ⊗ U is 25/625 plus a rotation term below 2e-3
    assert!((reference.mean() - Complex128::new(0.04, 0.0)).magnitude() < 0.005);
    for backend in candidates() {
        let candidate = sample(backend.as_ref());
        checker
            .compare_rounded_means("random_unitary_d_fs", &reference, &candidate)
            .unwrap();
    }
}

#[test]
fn test_random_unitary_is_unitary() {
    for backend in candidates() {
        let u = backend
            .random_unitary_d_fs(3, 1, 0, Precision::Complex128)
            .unwrap();
        assert_eq!(u.shape(), [3, 3]);
        for i in 0..3 {
            for j in 0..3 {
                let mut dot = Complex128::ZERO;
                for k in 0..3 {
                    dot += u.get(i, k).unwrap() * u.get(j, k).unwrap().conj();
                }
                let expected = if i == j { Complex128::ONE } else { Complex128::ZERO };
                assert!(
                    (dot - expected).magnitude() < 1e-12,
                    "{}: U U† [{i},{j}] = {dot}",
                    backend.name()
                );
            }
        }
    }
}
