//! Dense two phase simplex solver for linear programs of the form
//!
//! ```text
//! maximize    cᵀx
//! subject to  Ax ≤ b
//!             x ≥ 0
//! ```
//!
//! ```
//! use densiplex::{solve, SolveResult};
//!
//! let result = solve(&[3.0, 2.0], &[vec![1.0, 1.0], vec![1.0, 3.0]], &[4.0, 6.0]).unwrap();
//! match result {
//!     SolveResult::Optimal(solution) => assert!((solution.value() - 12.0).abs() < 1e-9),
//!     other => panic!("unexpected outcome: {}", other),
//! }
//! ```

pub mod error;
pub mod problem;
pub mod settings;
pub mod simplex;
pub mod solver;
pub mod tableau;

use num::ToPrimitive;

pub use error::{SolveError, SolveOutcome};
pub use problem::LinearProgram;
pub use settings::{PivotRule, SimplexSettings};
pub use simplex::Simplex;
pub use solver::{Solution, SolveAlgorithm, SolveResult, Solver};

/// Maximize `cᵀx` subject to `Ax ≤ b`, `x ≥ 0` with default settings.
///
/// Only malformed input is an `Err`; infeasible, unbounded and numerically failed problems
/// come back as the matching [`SolveResult`] variant.
pub fn solve<T: ToPrimitive>(c: &[T], a: &[Vec<T>], b: &[T]) -> SolveOutcome<SolveResult> {
    let lp = LinearProgram::new(c, a, b)?;
    Ok(Solver::new(lp, Simplex::new()).solve())
}
