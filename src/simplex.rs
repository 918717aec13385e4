//! Two phase simplex method.
//!
//! Phase one minimizes the sum of artificial variables to find a basic feasible solution,
//! phase two optimizes the true objective from there. Problems with a non-negative right
//! hand side start phase two directly from the all slack basis.

use log::{debug, trace, warn};
use ndarray::Array1;
use rustc_hash::FxHashSet;

use std::time::Instant;

use crate::problem::LinearProgram;
use crate::settings::{PivotRule, SimplexSettings};
use crate::solver::{
    SolveAlgorithm, SolveResult, Solution, BUDGET_EXCEEDED, ITERATION_LIMIT_EXCEEDED,
};
use crate::tableau::{Tableau, TableauIx};

/// States of one solve call. The last four are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Init,
    Phase1Feasibility,
    Phase2Optimize,
    Optimal,
    Infeasible,
    Unbounded,
    NumericalFailure(String),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Init | Phase::Phase1Feasibility | Phase::Phase2Optimize)
    }
}

enum PivotLoopOutcome {
    Optimal,
    Unbounded(usize),
    Failure(String),
}

/// Everything one solve call owns.
struct SolveState<'a> {
    lp: &'a LinearProgram,
    tableau: Tableau,
    second_stage_obj: Array1<f64>,
    artificial_vars: Vec<usize>,
    iterations: usize,
    iteration_limit: usize,
    deadline: Option<Instant>,
}

impl SolveState<'_> {
    /// Reason to stop before the next pivot, if the iteration cap or deadline is reached.
    fn out_of_budget(&self) -> Option<&'static str> {
        if self.iterations >= self.iteration_limit {
            Some(ITERATION_LIMIT_EXCEEDED)
        } else if self.deadline.map_or(false, |d| Instant::now() >= d) {
            Some(BUDGET_EXCEEDED)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Simplex {
    settings: SimplexSettings,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: SimplexSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SimplexSettings {
        &self.settings
    }

    fn init(&self, state: &mut SolveState) -> Phase {
        let rows = state.lp.negative_rhs_rows();
        if rows.is_empty() {
            debug!("slack basis is feasible, skipping phase one");
            return Phase::Phase2Optimize;
        }

        state.artificial_vars = state.tableau.add_artificials(&rows);
        debug!("added {} artificial variables for rows {:?}", rows.len(), rows);
        Phase::Phase1Feasibility
    }

    fn phase_one(&self, state: &mut SolveState) -> Phase {
        let tol = self.settings.tolerance;

        //first stage objective: sum of artificial variables
        let mut first_stage_obj = Array1::<f64>::zeros(state.tableau.tbl().ncols());
        state
            .artificial_vars
            .iter()
            .for_each(|&col| first_stage_obj[col] = 1.0_f64);
        state.tableau.set_objective(first_stage_obj.view());

        match self.pivot_loop(state) {
            PivotLoopOutcome::Optimal => {}
            //sum of non-negative variables is bounded below
            PivotLoopOutcome::Unbounded(col) => {
                return Phase::NumericalFailure(format!("phase one unbounded in column {}", col))
            }
            PivotLoopOutcome::Failure(reason) => return Phase::NumericalFailure(reason),
        }

        let infeasibility = -state.tableau.objective_constant();
        let scale = 1.0_f64 + state.lp.b().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        debug!("phase one finished, sum of artificial variables {:e}", infeasibility);
        if infeasibility > tol * scale {
            return Phase::Infeasible;
        }

        if let Err(reason) = self.drive_out_artificials(state) {
            return Phase::NumericalFailure(reason);
        }

        //remove artificial variables
        let first_artificial = state.tableau.n_cols() - state.artificial_vars.len();
        let col_mask = (0..state.tableau.n_cols())
            .map(|j| j < first_artificial)
            .collect::<Vec<bool>>();
        if !state.tableau.drop_columns(&col_mask) {
            return Phase::NumericalFailure("artificial variable left in basis".to_string());
        }
        state.artificial_vars.clear();

        Phase::Phase2Optimize
    }

    /// Pivot every artificial variable still basic (at level zero) out of the basis.
    ///
    /// The row always holds a usable entry among the decision and slack columns, since
    /// those columns have full row rank.
    fn drive_out_artificials(&self, state: &mut SolveState) -> Result<(), String> {
        let tol = self.settings.tolerance;
        let first_artificial = state.tableau.n_cols() - state.artificial_vars.len();

        for row in 0..state.tableau.n_rows() {
            if state.tableau.basic_vars()[row] < first_artificial {
                continue;
            }

            //largest magnitude entry for stability, lowest index on ties
            let col = state
                .tableau
                .tbl()
                .row(row)
                .iter()
                .take(first_artificial)
                .enumerate()
                .filter(|(_j, v)| v.abs() > tol)
                .fold(None, |best: Option<(usize, f64)>, (j, v)| match best {
                    Some((_, b)) if b >= v.abs() => best,
                    _ => Some((j, v.abs())),
                })
                .map(|(j, _v)| j)
                .ok_or_else(|| {
                    format!("artificial variable in row {} cannot leave the basis", row)
                })?;

            if let Some(reason) = state.out_of_budget() {
                return Err(reason.to_string());
            }
            state
                .tableau
                .pivot(&TableauIx::new(row, col))
                .map_err(|e| e.to_string())?;
            state.iterations += 1;
            trace!("drove artificial out of row {} with column {}", row, col);
        }
        Ok(())
    }

    fn phase_two(&self, state: &mut SolveState) -> Phase {
        state.tableau.set_objective(state.second_stage_obj.view());

        match self.pivot_loop(state) {
            PivotLoopOutcome::Optimal => Phase::Optimal,
            PivotLoopOutcome::Unbounded(col) => {
                debug!("column {} has no leaving row, objective is unbounded", col);
                Phase::Unbounded
            }
            PivotLoopOutcome::Failure(reason) => Phase::NumericalFailure(reason),
        }
    }

    /// Entering/leaving/pivot loop shared by both phases.
    fn pivot_loop(&self, state: &mut SolveState) -> PivotLoopOutcome {
        let tol = self.settings.tolerance;
        let mut rule = self.settings.pivot_rule;
        //bases visited during the current run of degenerate pivots
        let mut degenerate_bases: FxHashSet<Vec<usize>> = FxHashSet::default();

        loop {
            let entering = match rule {
                PivotRule::Dantzig => state.tableau.find_entering_column(),
                PivotRule::Bland => state.tableau.find_entering_column_bland(),
            };
            let Some(col) = entering else {
                return PivotLoopOutcome::Optimal;
            };

            if let Some(reason) = state.out_of_budget() {
                return PivotLoopOutcome::Failure(reason.to_string());
            }

            let Some(row) = state.tableau.find_leaving_row(col) else {
                return PivotLoopOutcome::Unbounded(col);
            };
            let degenerate = state.tableau.rhs()[row] <= tol;
            let track = self.settings.cycle_detection && rule == PivotRule::Dantzig;
            if track && degenerate && degenerate_bases.is_empty() {
                degenerate_bases.insert(basis_key(&state.tableau));
            }

            if let Err(e) = state.tableau.pivot(&TableauIx::new(row, col)) {
                return PivotLoopOutcome::Failure(e.to_string());
            }
            state.iterations += 1;
            trace!(
                "pivot {}: column {} enters at row {}{}",
                state.iterations,
                col,
                row,
                if degenerate { " (degenerate)" } else { "" }
            );
            trace!("tableau:\n{}", state.tableau);

            if state.tableau.has_non_finite() {
                return PivotLoopOutcome::Failure(format!(
                    "non-finite value in tableau after pivot {}",
                    state.iterations
                ));
            }

            if !degenerate {
                degenerate_bases.clear();
                rule = self.settings.pivot_rule;
            } else if track && !degenerate_bases.insert(basis_key(&state.tableau)) {
                debug!(
                    "basis repeated after {} degenerate pivots, switching to Bland's rule",
                    degenerate_bases.len()
                );
                degenerate_bases.clear();
                rule = PivotRule::Bland;
            }
        }
    }
}

/// Basic columns in ascending order, independent of the row each one sits in.
fn basis_key(tableau: &Tableau) -> Vec<usize> {
    let mut key = tableau.basic_vars().to_vec();
    key.sort_unstable();
    key
}

impl SolveAlgorithm for Simplex {
    fn solve(&self, lp: &LinearProgram) -> SolveResult {
        let (m, n) = (lp.n_constraints(), lp.n_vars());
        let tableau = lp.as_tableau(self.settings.tolerance);

        let mut state = SolveState {
            lp,
            second_stage_obj: tableau.tbl().row(m).to_owned(),
            tableau,
            artificial_vars: Vec::new(),
            iterations: 0,
            iteration_limit: self.settings.iteration_limit(m, n),
            deadline: self.settings.time_limit.map(|limit| Instant::now() + limit),
        };

        let mut phase = Phase::Init;
        while !phase.is_terminal() {
            debug!("entering {:?}", phase);
            phase = match phase {
                Phase::Init => self.init(&mut state),
                Phase::Phase1Feasibility => self.phase_one(&mut state),
                Phase::Phase2Optimize => self.phase_two(&mut state),
                terminal => terminal,
            };
        }
        debug!("finished in {:?} after {} pivots", phase, state.iterations);

        match phase {
            Phase::Optimal => Solution::from_tableau(lp, &state.tableau, state.iterations),
            Phase::Infeasible => SolveResult::Infeasible,
            Phase::Unbounded => SolveResult::Unbounded,
            Phase::NumericalFailure(reason) => {
                warn!("simplex failed: {}", reason);
                SolveResult::NumericalFailure { reason }
            }
            //loop only exits on terminal phases
            Phase::Init | Phase::Phase1Feasibility | Phase::Phase2Optimize => {
                SolveResult::numerical_failure("solver stopped in a non-terminal phase")
            }
        }
    }
}
