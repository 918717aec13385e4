//! Property-based tests on random problems that are feasible and bounded by construction.
//!
//! Each problem gets a known feasible point `x0 ≥ 0`: every right hand side is `aᵢ·x0` plus
//! some non-negative slack, so mixed signs in A often produce a negative b and exercise phase
//! one. A final `Σx ≤ Σx0 + s` row keeps the feasible region bounded.

use densiplex::{solve, SolveResult, Solution};
use proptest::prelude::*;

const EPS: f64 = 1.0e-6;

#[derive(Clone, Debug)]
struct Case {
    c: Vec<f64>,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    x0: Vec<f64>,
}

fn dot(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v).map(|(a, b)| a * b).sum()
}

/// Strategy for feasible bounded problems with up to 5 variables and 5 constraints
fn case_strategy() -> impl Strategy<Value = Case> {
    (1usize..6, 0usize..5)
        .prop_flat_map(|(n, m)| {
            (
                prop::collection::vec(-5i32..=5, n),
                prop::collection::vec(prop::collection::vec(-5i32..=5, n), m),
                prop::collection::vec(0i32..=5, n),
                prop::collection::vec(0i32..=5, m + 1),
            )
        })
        .prop_map(|(c, a, x0, extra)| {
            let c = c.into_iter().map(f64::from).collect::<Vec<f64>>();
            let x0 = x0.into_iter().map(f64::from).collect::<Vec<f64>>();
            let mut a = a
                .into_iter()
                .map(|row| row.into_iter().map(f64::from).collect::<Vec<f64>>())
                .collect::<Vec<Vec<f64>>>();
            let mut b = a
                .iter()
                .zip(&extra)
                .map(|(row, s)| dot(row, &x0) + f64::from(*s))
                .collect::<Vec<f64>>();

            a.push(vec![1.0; c.len()]);
            b.push(x0.iter().sum::<f64>() + f64::from(extra[extra.len() - 1]));
            Case { c, a, b, x0 }
        })
}

/// Strategy for problems with 20 to 40 variables and constraints where every bound is zero
/// except a final `Σx ≤ 1` row, so most pivots are degenerate
fn degenerate_case_strategy() -> impl Strategy<Value = Case> {
    (20usize..=40, 20usize..=40)
        .prop_flat_map(|(n, m)| {
            (
                prop::collection::vec(-5i32..=5, n),
                prop::collection::vec(prop::collection::vec(-5i32..=5, n), m),
            )
        })
        .prop_map(|(c, a)| {
            let c = c.into_iter().map(f64::from).collect::<Vec<f64>>();
            let mut a = a
                .into_iter()
                .map(|row| row.into_iter().map(f64::from).collect::<Vec<f64>>())
                .collect::<Vec<Vec<f64>>>();
            let mut b = vec![0.0; a.len()];

            a.push(vec![1.0; c.len()]);
            b.push(1.0);
            Case { x0: vec![0.0; c.len()], c, a, b }
        })
}

fn solve_case(case: &Case) -> Solution {
    match solve(&case.c, &case.a, &case.b) {
        Ok(SolveResult::Optimal(solution)) => solution,
        other => panic!("expected an optimal solution, got {:?}", other),
    }
}

proptest! {
    /// The returned point satisfies every constraint and the sign bounds
    #[test]
    fn optimum_is_feasible(case in case_strategy()) {
        let solution = solve_case(&case);
        prop_assert_eq!(solution.x().len(), case.c.len());
        prop_assert!(solution.x().iter().all(|v| *v >= 0.0));
        for (row, bi) in case.a.iter().zip(&case.b) {
            prop_assert!(dot(row, solution.x()) <= bi + EPS);
        }
    }

    /// The reported value is cᵀx and is at least as good as the known feasible point
    #[test]
    fn value_matches_point(case in case_strategy()) {
        let solution = solve_case(&case);
        prop_assert!((dot(&case.c, solution.x()) - solution.value()).abs() <= EPS);
        prop_assert!(solution.value() >= dot(&case.c, &case.x0) - EPS);
    }

    /// Non-negative duals whose bᵀy equals the primal optimum
    #[test]
    fn strong_duality(case in case_strategy()) {
        let solution = solve_case(&case);
        prop_assert!(solution.duals().iter().all(|y| *y >= 0.0));
        prop_assert!((dot(&case.b, solution.duals()) - solution.value()).abs() <= EPS);
    }

    #[test]
    fn scaling_objective_scales_value(case in case_strategy(), k in 1u8..20) {
        let k = f64::from(k);
        let base = solve_case(&case);
        let scaled = solve_case(&Case {
            c: case.c.iter().map(|v| v * k).collect(),
            ..case.clone()
        });
        let scale = 1.0 + k * base.value().abs();
        prop_assert!((scaled.value() - k * base.value()).abs() <= EPS * scale);
    }

    #[test]
    fn solving_twice_is_deterministic(case in case_strategy()) {
        let first = solve(&case.c, &case.a, &case.b).unwrap();
        let second = solve(&case.c, &case.a, &case.b).unwrap();
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Degenerate problems of realistic size finish within the default cap with a
    /// feasible point and matching duals
    #[test]
    fn degenerate_problems_at_size(case in degenerate_case_strategy()) {
        let solution = solve_case(&case);
        prop_assert!(solution.iterations() <= 10 * (case.a.len() + case.c.len()));
        for (row, bi) in case.a.iter().zip(&case.b) {
            prop_assert!(dot(row, solution.x()) <= bi + EPS);
        }
        prop_assert!(solution.x().iter().all(|v| *v >= 0.0));
        prop_assert!(solution.duals().iter().all(|y| *y >= 0.0));
        prop_assert!((dot(&case.b, solution.duals()) - solution.value()).abs() <= EPS);
    }
}
