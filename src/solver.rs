use log::warn;
use ndarray::ArrayView1;

use std::fmt;

use crate::problem::LinearProgram;
use crate::tableau::Tableau;

pub const ITERATION_LIMIT_EXCEEDED: &str = "iteration limit exceeded";
pub const BUDGET_EXCEEDED: &str = "budget exceeded";

pub trait SolveAlgorithm {
    fn solve(&self, lp: &LinearProgram) -> SolveResult;
}

/// Outcome of one solve call. Infeasible and unbounded problems are ordinary answers.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveResult {
    Optimal(Solution),
    Infeasible,
    Unbounded,
    NumericalFailure { reason: String },
}

impl SolveResult {
    pub(crate) fn numerical_failure<T: ToString>(reason: T) -> Self {
        SolveResult::NumericalFailure {
            reason: reason.to_string(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveResult::Optimal(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveResult::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    /// 0 optimal, 1 iteration or time limit, 2 infeasible, 3 unbounded, 4 numerical trouble.
    pub fn status(&self) -> u8 {
        match self {
            SolveResult::Optimal(_) => 0,
            SolveResult::NumericalFailure { reason }
                if reason == ITERATION_LIMIT_EXCEEDED || reason == BUDGET_EXCEEDED =>
            {
                1
            }
            SolveResult::Infeasible => 2,
            SolveResult::Unbounded => 3,
            SolveResult::NumericalFailure { .. } => 4,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SolveResult::Optimal(_) => "Optimization terminated successfully".to_string(),
            SolveResult::Infeasible => "The problem is infeasible".to_string(),
            SolveResult::Unbounded => "The problem is unbounded".to_string(),
            SolveResult::NumericalFailure { reason } => format!("Numerical failure: {}", reason),
        }
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    x: Vec<f64>,
    value: f64,
    slack: Vec<f64>,
    duals: Vec<f64>,
    iterations: usize,
}

fn clamp(v: f64, tol: f64) -> f64 {
    if v.abs() <= tol {
        0.0_f64
    } else {
        v
    }
}

impl Solution {
    pub fn new(
        x: Vec<f64>,
        value: f64,
        slack: Vec<f64>,
        duals: Vec<f64>,
        iterations: usize,
    ) -> Self {
        Self {
            x,
            value,
            slack,
            duals,
            iterations,
        }
    }

    /// Read an optimal tableau back into the variables of `lp`.
    ///
    /// The tableau must hold the decision variable columns first, followed by one slack column
    /// per constraint, with no artificial columns left.
    pub(crate) fn from_tableau(
        lp: &LinearProgram,
        tableau: &Tableau,
        iterations: usize,
    ) -> SolveResult {
        let n = lp.n_vars();
        let m = lp.n_constraints();
        let tol = tableau.tolerance();
        debug_assert_eq!(tableau.n_cols(), n + m);

        //non-basic variables sit at zero
        let mut x = vec![0.0_f64; n];
        for (row, &col) in tableau.basic_vars().iter().enumerate() {
            let val = tableau.rhs()[row];
            if val < -tol {
                warn!("basic variable x{} = {:e} is negative", col, val);
                return SolveResult::numerical_failure(format!(
                    "negative basic variable x{} = {:e}",
                    col, val
                ));
            }
            if col < n {
                x[col] = clamp(val, tol);
            }
        }

        //corner cell is minus the minimized objective -cᵀx
        let value = tableau.objective_constant();

        let slack = lp
            .slack(ArrayView1::from(&x))
            .iter()
            .zip(lp.b().iter())
            .map(|(s, b)| clamp(*s, tol * (1.0_f64 + b.abs())))
            .collect();

        //reduced cost of slack i is the shadow price of constraint i
        let duals = (0..m)
            .map(|i| clamp(tableau.objective_row()[n + i], tol))
            .collect();

        SolveResult::Optimal(Solution::new(x, value, slack, duals, iterations))
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Value of variable `var`, `None` past the last variable.
    pub fn var_value(&self, var: usize) -> Option<f64> {
        self.x.get(var).copied()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn slack(&self) -> &[f64] {
        &self.slack
    }

    pub fn duals(&self) -> &[f64] {
        &self.duals
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

pub struct Solver<T: SolveAlgorithm> {
    lp: LinearProgram,
    solve_algo: T,
}

impl<T: SolveAlgorithm> Solver<T> {
    pub fn new(lp: LinearProgram, solve_algo: T) -> Self {
        Self { lp, solve_algo }
    }

    pub fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub fn solve(&self) -> SolveResult {
        self.solve_algo.solve(&self.lp)
    }
}
