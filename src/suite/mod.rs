//! Conformance suite: one test class per (precision, reference, candidate)
//!
//! Lifecycle:
//!
//! 1. [`ConformanceSuite::setup`] checks that both backends are callable and
//!    support the run precision, then generates the fixture set once. Any
//!    failure here aborts the class before a single comparison is made.
//! 2. [`ConformanceSuite::check`] invokes one operation on both backends with
//!    the shared fixtures and routes the outputs to the deterministic or the
//!    statistical checker.
//! 3. [`TestClass::teardown`] drops the fixtures.
//!
//! [`ConformanceSuite::run`] does all three and records each operation's
//! verdict independently, so one failing operation never hides another.
//! Nothing in the suite depends on which backends it is given, so a new
//! candidate needs no change to fixtures or checkers.

mod report;

pub use report::{OperationOutcome, SuiteReport, Verdict};

use crate::backend::{Backend, DfsParams, require_precision};
use crate::check::{
    DeterministicChecker, Retention, SampleSet, StatisticalChecker, StatisticalConfig, Tolerance,
};
use crate::dtype::Precision;
use crate::error::{Error, Result};
use crate::fixture::{self, FixtureSpec, Fixtures};
use crate::tensor::{ComplexArray, Output};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Operations
// ============================================================================

/// Every operation the suite can check
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `noop()`
    Noop,
    /// `product(lhs_mtx, rhs_mtx)`
    Product,
    /// `normalize(lhs_mtx)`
    NormalizeMatrix,
    /// `normalize(lhs_vec)`
    NormalizeVector,
    /// `project(lhs_vec)`
    Project,
    /// `kronecker(lhs_mtx, rhs_mtx)`
    Kronecker,
    /// `rotate(lhs_mtx, rhs_mtx)`
    Rotate,
    /// `get_random_haar_1d(size)`, sampled `haar_draws` times
    RandomHaar1d,
    /// `get_random_haar_2d(haar_draws, size)`
    RandomHaar2d,
    /// `expand_d_fs(large_mtx, depth, quantity, idx)`, exact
    ExpandDFs,
    /// `random_unitary_d_fs(depth, quantity, idx)`, sampled `unitary_draws` times
    RandomUnitaryDFs,
}

impl Operation {
    /// All operations in check order
    pub const ALL: [Operation; 11] = [
        Self::Noop,
        Self::Product,
        Self::NormalizeMatrix,
        Self::NormalizeVector,
        Self::Project,
        Self::Kronecker,
        Self::Rotate,
        Self::RandomHaar1d,
        Self::RandomHaar2d,
        Self::ExpandDFs,
        Self::RandomUnitaryDFs,
    ];

    /// Stable name, also accepted by `FromStr`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Product => "product",
            Self::NormalizeMatrix => "normalize_matrix",
            Self::NormalizeVector => "normalize_vector",
            Self::Project => "project",
            Self::Kronecker => "kronecker",
            Self::Rotate => "rotate",
            Self::RandomHaar1d => "get_random_haar_1d",
            Self::RandomHaar2d => "get_random_haar_2d",
            Self::ExpandDFs => "expand_d_fs",
            Self::RandomUnitaryDFs => "random_unitary_d_fs",
        }
    }

    /// Randomized operations are compared in distribution only
    pub const fn is_randomized(self) -> bool {
        matches!(
            self,
            Self::RandomHaar1d | Self::RandomHaar2d | Self::RandomUnitaryDFs
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_argument("operation", format!("unknown operation '{s}'")))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Everything that parameterizes one test class
#[derive(Clone, Debug, PartialEq)]
pub struct ConformanceConfig {
    /// Fixture seed, sizes and run precision
    pub fixtures: FixtureSpec,
    /// Tolerance for deterministic floating-point operations
    pub tolerance: Tolerance,
    /// Tolerances for randomized operations
    pub statistics: StatisticalConfig,
    /// Draws per backend for the Haar checks
    pub haar_draws: usize,
    /// Draws per backend for the random unitary check
    pub unitary_draws: usize,
    /// Parameters for `expand_d_fs` and `random_unitary_d_fs`
    pub dfs: DfsParams,
    /// Operations to check, in order
    pub operations: Vec<Operation>,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            fixtures: FixtureSpec::default(),
            tolerance: Tolerance::Absolute(1e-6),
            statistics: StatisticalConfig::default(),
            haar_draws: 100_000,
            unitary_draws: 20_000,
            dfs: DfsParams::default(),
            operations: Operation::ALL.to_vec(),
        }
    }
}

impl ConformanceConfig {
    /// Defaults at `precision`, with that precision's default tolerance
    pub fn for_precision(precision: Precision) -> Self {
        Self {
            fixtures: FixtureSpec::with_precision(precision),
            tolerance: Tolerance::for_precision(precision),
            ..Self::default()
        }
    }

    /// Restrict the run to `operations`
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    /// Override the draw counts of the randomized checks
    pub fn with_draws(mut self, haar_draws: usize, unitary_draws: usize) -> Self {
        self.haar_draws = haar_draws;
        self.unitary_draws = unitary_draws;
        self
    }
}

// ============================================================================
// Test class
// ============================================================================

/// Fixtures and checkers for one set-up test class
#[derive(Debug)]
pub struct TestClass {
    fixtures: Fixtures,
    deterministic: DeterministicChecker,
    statistical: StatisticalChecker,
}

impl TestClass {
    /// Shared fixtures
    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// Precision of every fixture and every output
    pub fn precision(&self) -> Precision {
        self.fixtures.spec.precision
    }

    /// Discard the fixtures
    pub fn teardown(self) {
        tracing::info!(precision = %self.precision(), "test class teardown");
    }
}

// ============================================================================
// Suite
// ============================================================================

/// Runs the operation set against a reference and a candidate backend
pub struct ConformanceSuite<'a> {
    config: ConformanceConfig,
    reference: &'a dyn Backend,
    candidate: &'a dyn Backend,
}

impl<'a> ConformanceSuite<'a> {
    /// Pair two backends under `config`
    pub fn new(
        config: ConformanceConfig,
        reference: &'a dyn Backend,
        candidate: &'a dyn Backend,
    ) -> Self {
        Self {
            config,
            reference,
            candidate,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    /// Validate both backends and generate the fixture set
    ///
    /// Fails fast with `UnsupportedPrecision` if either backend lacks the run
    /// precision, or with the backend's own error if its `noop` fails.
    pub fn setup(&self) -> Result<TestClass> {
        let precision = self.config.fixtures.precision;
        tracing::info!(
            reference = self.reference.name(),
            candidate = self.candidate.name(),
            %precision,
            seed = self.config.fixtures.seed,
            size = self.config.fixtures.size,
            "test class setup"
        );
        for backend in [self.reference, self.candidate] {
            require_precision(backend, precision)?;
            backend.noop()?;
        }
        Ok(TestClass {
            fixtures: fixture::generate(&self.config.fixtures)?,
            deterministic: DeterministicChecker::new(self.config.tolerance),
            statistical: StatisticalChecker::new(self.config.statistics),
        })
    }

    /// Set up, check every configured operation, tear down
    ///
    /// Only setup errors are returned as `Err`; operation failures are
    /// recorded in the report.
    pub fn run(&self) -> Result<SuiteReport> {
        let class = self.setup()?;
        let outcomes = self
            .config
            .operations
            .iter()
            .map(|&operation| OperationOutcome {
                operation,
                result: self.check(&class, operation),
            })
            .collect();
        let report = SuiteReport {
            precision: class.precision(),
            reference: self.reference.name(),
            candidate: self.candidate.name(),
            fixtures: class.fixtures.spec,
            dfs: self.config.dfs,
            outcomes,
        };
        class.teardown();
        tracing::info!(
            passed = report.pass_count(),
            total = report.case_count(),
            "conformance run finished"
        );
        Ok(report)
    }

    /// Check one operation against the class fixtures
    pub fn check(&self, class: &TestClass, operation: Operation) -> Result<Verdict> {
        let result = if operation.is_randomized() {
            self.check_statistical(class, operation)
        } else {
            self.check_deterministic(class, operation)
        };
        match &result {
            Ok(verdict) => tracing::debug!(%operation, %verdict, "conforms"),
            Err(err) => tracing::warn!(%operation, kind = err.kind(), error = %err, "does not conform"),
        }
        result
    }

    fn check_deterministic(&self, class: &TestClass, operation: Operation) -> Result<Verdict> {
        let reference = self.invoke(self.reference, class, operation)?;
        let candidate = self.invoke(self.candidate, class, operation)?;
        let checker = if operation == Operation::ExpandDFs {
            DeterministicChecker::new(Tolerance::Exact)
        } else {
            class.deterministic
        };
        checker
            .check(operation.name(), &reference, &candidate)
            .map(Verdict::Deterministic)
    }

    /// Run a deterministic operation on one backend
    fn invoke(&self, backend: &dyn Backend, class: &TestClass, operation: Operation) -> Result<Output> {
        let f = &class.fixtures;
        let dfs = self.config.dfs;
        Ok(match operation {
            Operation::Noop => {
                backend.noop()?;
                Output::Unit
            }
            Operation::Product => backend.product(&f.lhs_mtx, &f.rhs_mtx)?.into(),
            Operation::NormalizeMatrix => backend
                .normalize(&ComplexArray::Matrix(f.lhs_mtx.clone()))?
                .into(),
            Operation::NormalizeVector => backend
                .normalize(&ComplexArray::Vector(f.lhs_vec.clone()))?
                .into(),
            Operation::Project => backend.project(&f.lhs_vec)?.into(),
            Operation::Kronecker => backend.kronecker(&f.lhs_mtx, &f.rhs_mtx)?.into(),
            Operation::Rotate => backend.rotate(&f.lhs_mtx, &f.rhs_mtx)?.into(),
            Operation::ExpandDFs => backend
                .expand_d_fs(&f.large_mtx, dfs.depth, dfs.quantity, dfs.idx)?
                .into(),
            Operation::RandomHaar1d | Operation::RandomHaar2d | Operation::RandomUnitaryDFs => {
                return Err(Error::invalid_argument(
                    "operation",
                    format!("{operation} has no deterministic output"),
                ));
            }
        })
    }

    fn check_statistical(&self, class: &TestClass, operation: Operation) -> Result<Verdict> {
        let checker = &class.statistical;
        let op = operation.name();
        let precision = class.precision();
        let depth = class.fixtures.spec.size;
        let dfs = self.config.dfs;

        match operation {
            Operation::RandomHaar1d => {
                let draws = self.config.haar_draws;
                let sample = |backend: &dyn Backend| {
                    SampleSet::collect(draws, Retention::Magnitudes, || {
                        backend.get_random_haar_1d(depth, precision).map(ComplexArray::Vector)
                    })
                };
                let (r, c) = (sample(self.reference)?, sample(self.candidate)?);
                checker.compare_shapes(op, &r, &c)?;
                checker.compare_histograms(op, &r, &c)?;
                checker.compare_magnitude_means(op, &r, &c)?;
                Ok(Verdict::Statistical { draws })
            }
            Operation::RandomHaar2d => {
                let draws = self.config.haar_draws;
                let reference = self.reference.get_random_haar_2d(draws, depth, precision)?;
                let candidate = self.candidate.get_random_haar_2d(draws, depth, precision)?;
                if reference.shape() != candidate.shape() {
                    return Err(Error::shape_mismatch(&reference.shape(), &candidate.shape()));
                }
                let r = SampleSet::from_rows(&reference, Retention::Magnitudes)?;
                let c = SampleSet::from_rows(&candidate, Retention::Magnitudes)?;
                checker.compare_histograms(op, &r, &c)?;
                checker.compare_magnitude_means(op, &r, &c)?;
                Ok(Verdict::Statistical { draws })
            }
            Operation::RandomUnitaryDFs => {
                let draws = self.config.unitary_draws;
                let sample = |backend: &dyn Backend| {
                    SampleSet::collect(draws, Retention::MomentsOnly, || {
                        backend
                            .random_unitary_d_fs(dfs.depth, dfs.quantity, dfs.idx, precision)
                            .map(ComplexArray::Matrix)
                    })
                };
                let (r, c) = (sample(self.reference)?, sample(self.candidate)?);
                checker.compare_shapes(op, &r, &c)?;
                checker.compare_rounded_means(op, &r, &c)?;
                Ok(Verdict::Statistical { draws })
            }
            _ => Err(Error::invalid_argument(
                "operation",
                format!("{operation} is not randomized"),
            )),
        }
    }
}

impl fmt::Debug for ConformanceSuite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformanceSuite")
            .field("config", &self.config)
            .field("reference", &self.reference.name())
            .field("candidate", &self.candidate.name())
            .finish()
    }
}
