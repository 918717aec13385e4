//! Problem builder: validation of raw coefficients and conversion to standard form.
//!
//! A [`LinearProgram`] is `max cᵀx s.t. Ax ≤ b, x ≥ 0`. Its tableau is `[A | I | b]` with
//! one slack column per constraint and an objective row of `-c`, since the tableau engine
//! minimizes.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use num::ToPrimitive;

use crate::error::{SolveError, SolveOutcome};
use crate::tableau::Tableau;

#[derive(Clone, Debug, PartialEq)]
pub struct LinearProgram {
    c: Array1<f64>,
    a: Array2<f64>,
    b: Array1<f64>,
}

fn to_finite<T: ToPrimitive>(value: &T, location: impl FnOnce() -> String) -> SolveOutcome<f64> {
    match value.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(SolveError::NonFiniteInput(format!("{} = {}", location(), v))),
        None => Err(SolveError::NonFiniteInput(format!(
            "{} is not representable as f64",
            location()
        ))),
    }
}

fn check_finite(
    values: impl Iterator<Item = f64>,
    location: impl Fn(usize) -> String,
) -> SolveOutcome<()> {
    for (i, v) in values.enumerate() {
        if !v.is_finite() {
            return Err(SolveError::NonFiniteInput(format!("{} = {}", location(i), v)));
        }
    }
    Ok(())
}

impl LinearProgram {
    /// Build from plain slices. `a` holds one entry per constraint, each of length `c.len()`.
    pub fn new<T: ToPrimitive>(c: &[T], a: &[Vec<T>], b: &[T]) -> SolveOutcome<Self> {
        let n = c.len();
        let m = b.len();

        if a.len() != m {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} rows but b has {} entries",
                a.len(),
                m
            )));
        }
        if let Some((i, row)) = a.iter().enumerate().find(|(_i, row)| row.len() != n) {
            return Err(SolveError::DimensionMismatch(format!(
                "row {} of A has {} columns but c has {} entries",
                i,
                row.len(),
                n
            )));
        }

        let c = c
            .iter()
            .enumerate()
            .map(|(j, v)| to_finite(v, || format!("c[{}]", j)))
            .collect::<SolveOutcome<Vec<f64>>>()?;
        let b = b
            .iter()
            .enumerate()
            .map(|(i, v)| to_finite(v, || format!("b[{}]", i)))
            .collect::<SolveOutcome<Vec<f64>>>()?;
        let mut flat = Vec::with_capacity(m * n);
        for (i, row) in a.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                flat.push(to_finite(v, || format!("A[{}][{}]", i, j))?);
            }
        }

        let a = Array2::from_shape_vec((m, n), flat)
            .map_err(|e| SolveError::DimensionMismatch(e.to_string()))?;

        Ok(Self {
            c: Array1::from(c),
            a,
            b: Array1::from(b),
        })
    }

    /// Build from `ndarray` arrays.
    pub fn from_arrays(c: Array1<f64>, a: Array2<f64>, b: Array1<f64>) -> SolveOutcome<Self> {
        let (m, n) = a.dim();
        if m != b.len() {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} rows but b has {} entries",
                m,
                b.len()
            )));
        }
        if n != c.len() {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} columns but c has {} entries",
                n,
                c.len()
            )));
        }

        check_finite(c.iter().copied(), |j| format!("c[{}]", j))?;
        check_finite(b.iter().copied(), |i| format!("b[{}]", i))?;
        check_finite(a.iter().copied(), |k| format!("A[{}][{}]", k / n.max(1), k % n.max(1)))?;

        Ok(Self { c, a, b })
    }

    pub fn c(&self) -> ArrayView1<f64> {
        self.c.view()
    }

    pub fn a(&self) -> ArrayView2<f64> {
        self.a.view()
    }

    pub fn b(&self) -> ArrayView1<f64> {
        self.b.view()
    }

    /// Number of decision variables, n.
    pub fn n_vars(&self) -> usize {
        self.c.len()
    }

    /// Number of constraints, m.
    pub fn n_constraints(&self) -> usize {
        self.b.len()
    }

    /// Rows whose right hand side is negative; the all slack basis is infeasible there.
    pub fn negative_rhs_rows(&self) -> Vec<usize> {
        self.b
            .iter()
            .enumerate()
            .filter(|(_i, v)| **v < 0.0_f64)
            .map(|(i, _v)| i)
            .collect()
    }

    pub fn objective(&self, x: ArrayView1<f64>) -> f64 {
        self.c.dot(&x)
    }

    /// `b - Ax`, the unused capacity of every constraint at `x`.
    pub fn slack(&self, x: ArrayView1<f64>) -> Array1<f64> {
        &self.b - &self.a.dot(&x)
    }

    pub fn as_tableau(&self, tol: f64) -> Tableau {
        let (m, n) = self.a.dim();

        //constraint rows followed by obj_fn row
        let mut tbl = Array2::<f64>::zeros((m + 1, n + m + 1));

        tbl.slice_mut(s![..m, ..n]).assign(&self.a);
        for i in 0..m {
            tbl[[i, n + i]] = 1.0_f64;
        }
        tbl.slice_mut(s![..m, -1]).assign(&self.b);

        //minimize -cᵀx
        tbl.slice_mut(s![m, ..n]).assign(&self.c.mapv(|v| -v));

        let basic_vars = (n..n + m).collect();
        Tableau::new(tbl, basic_vars, tol)
    }
}
