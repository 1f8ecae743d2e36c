//! Per-operation verdicts of one conformance run

use super::Operation;
use crate::backend::DfsParams;
use crate::check::Comparison;
use crate::dtype::Precision;
use crate::error::Error;
use crate::fixture::FixtureSpec;
use std::fmt;

/// How an operation passed
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Pointwise comparison succeeded
    Deterministic(Comparison),
    /// Summary statistics agreed over this many draws per backend
    Statistical {
        /// Draws taken from each backend
        draws: usize,
    },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deterministic(cmp) => write!(
                f,
                "{} values, max diff {:e}",
                cmp.elements, cmp.max_diff
            ),
            Self::Statistical { draws } => write!(f, "{draws} draws per backend"),
        }
    }
}

/// Result of checking one operation
#[derive(Debug)]
pub struct OperationOutcome {
    /// Operation checked
    pub operation: Operation,
    /// Verdict, or the error that failed the check
    pub result: Result<Verdict, Error>,
}

impl OperationOutcome {
    /// Did the operation conform?
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Verdicts for every operation checked in one test class
#[derive(Debug)]
pub struct SuiteReport {
    /// Precision of the run
    pub precision: Precision,
    /// Reference backend name
    pub reference: &'static str,
    /// Candidate backend name
    pub candidate: &'static str,
    /// Spec the shared fixtures were generated from
    pub fixtures: FixtureSpec,
    /// Parameters passed to `expand_d_fs` and `random_unitary_d_fs`
    pub dfs: DfsParams,
    /// One entry per checked operation, in check order
    pub outcomes: Vec<OperationOutcome>,
}

impl SuiteReport {
    /// Number of operations checked
    pub fn case_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of operations that conformed
    pub fn pass_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// True if every checked operation conformed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(OperationOutcome::passed)
    }

    /// Failed operations with their errors
    pub fn failures(&self) -> impl Iterator<Item = (Operation, &Error)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.operation, e)))
    }

    /// Outcome for one operation, if it was checked
    pub fn outcome(&self, operation: Operation) -> Option<&OperationOutcome> {
        self.outcomes.iter().find(|o| o.operation == operation)
    }

    /// The inputs `operation` was invoked with, enough to regenerate them
    pub fn inputs(&self, operation: Operation) -> String {
        let FixtureSpec {
            seed,
            size: n,
            large_size: l,
            ..
        } = self.fixtures;
        let DfsParams {
            depth,
            quantity,
            idx,
        } = self.dfs;
        let args = match operation {
            Operation::Noop => "no arguments".to_string(),
            Operation::Product | Operation::Kronecker | Operation::Rotate => {
                format!("lhs_mtx, rhs_mtx ({n}x{n})")
            }
            Operation::NormalizeMatrix => format!("lhs_mtx ({n}x{n})"),
            Operation::NormalizeVector | Operation::Project => format!("lhs_vec (len {n})"),
            Operation::RandomHaar1d | Operation::RandomHaar2d => format!("depth {n}"),
            Operation::ExpandDFs => {
                format!("large_mtx ({l}x{l}), depth {depth}, quantity {quantity}, idx {idx}")
            }
            Operation::RandomUnitaryDFs => format!("depth {depth}, quantity {quantity}, idx {idx}"),
        };
        format!("{args}; fixture seed {seed}")
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} vs {} ({}, seed {}, size {}): {}/{} passed",
            self.reference,
            self.candidate,
            self.precision,
            self.fixtures.seed,
            self.fixtures.size,
            self.pass_count(),
            self.case_count()
        )?;
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(verdict) => writeln!(f, "  ok    {:<22} {}", outcome.operation, verdict)?,
                Err(err) => {
                    writeln!(
                        f,
                        "  FAIL  {:<22} [{}] {}",
                        outcome.operation,
                        err.kind(),
                        err
                    )?;
                    writeln!(f, "        inputs: {}", self.inputs(outcome.operation))?;
                }
            }
        }
        Ok(())
    }
}
