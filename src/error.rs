//! Error types for the simplex solver.

use thiserror::Error;

/// Errors caused by malformed caller input. These are rejected before any pivoting.
///
/// Infeasible, unbounded and numerically failed problems are not errors, they are
/// reported through [`crate::solver::SolveResult`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Row/column counts of c, A and b do not agree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A coefficient is NaN, infinite or not representable as f64
    #[error("Non-finite input: {0}")]
    NonFiniteInput(String),
}

/// Result type for problem construction and solving.
pub type SolveOutcome<T> = Result<T, SolveError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum PivotError {
    #[error("Degenerate pivot at ({row}, {column}): |{value:e}| below tolerance")]
    DegeneratePivot { row: usize, column: usize, value: f64 },
}
