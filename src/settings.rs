//! Configuration settings for the simplex solver.

use std::time::Duration;

/// Entering column selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative reduced cost.
    #[default]
    Dantzig,

    /// Lowest index with a negative reduced cost. Never cycles.
    Bland,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSettings {
    /// Values with absolute value at or below this are treated as zero.
    pub tolerance: f64,

    /// Pivot cap over both phases. `None` means `10 * (m + n)`.
    pub max_iterations: Option<usize>,

    /// Wall clock budget for one solve call.
    pub time_limit: Option<Duration>,

    pub pivot_rule: PivotRule,

    /// Switch Dantzig to Bland while a run of degenerate pivots revisits a basis.
    pub cycle_detection: bool,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-9,
            max_iterations: None,
            time_limit: None,
            pivot_rule: PivotRule::default(),
            cycle_detection: true,
        }
    }
}

impl SimplexSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        assert!(tolerance.is_finite() && tolerance > 0.0, "tolerance must be positive");
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_pivot_rule(mut self, pivot_rule: PivotRule) -> Self {
        self.pivot_rule = pivot_rule;
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.cycle_detection = enabled;
        self
    }

    /// Iteration cap for a problem with `m` constraints and `n` variables.
    pub fn iteration_limit(&self, m: usize, n: usize) -> usize {
        self.max_iterations.unwrap_or(10 * (m + n))
    }
}
