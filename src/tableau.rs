use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use tabular::{Row, Table};

use std::cmp::Ordering;
use std::fmt;

use crate::error::PivotError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableauIx {
    i: usize,
    j: usize,
}

impl TableauIx {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }
}

/// Dense simplex tableau.
///
/// Rows `0..m` are constraint rows, row `m` is the objective row. Columns `0..k` are
/// variables, the last column is the right hand side. The objective row holds reduced
/// costs and, in its last cell, the negated objective value of the current basis.
///
/// `basic_vars[i]` is the column that is basic in row `i`; that column is a unit vector
/// with its one in row `i`.
#[derive(Debug, Clone)]
pub struct Tableau {
    pub(crate) tbl: Array2<f64>,
    pub(crate) basic_vars: Vec<usize>,
    tol: f64,
}

impl Tableau {
    //constructor
    pub fn new(tbl: Array2<f64>, basic_vars: Vec<usize>, tol: f64) -> Self {
        debug_assert_eq!(tbl.nrows(), basic_vars.len() + 1);
        Self {
            tbl,
            basic_vars,
            tol,
        }
    }

    pub fn tbl(&self) -> &Array2<f64> {
        &self.tbl
    }

    pub fn basic_vars(&self) -> &[usize] {
        &self.basic_vars
    }

    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    /// Number of constraint rows.
    pub fn n_rows(&self) -> usize {
        self.tbl.nrows() - 1
    }

    /// Number of variable columns, excluding the right hand side.
    pub fn n_cols(&self) -> usize {
        self.tbl.ncols() - 1
    }

    pub fn rhs(&self) -> ArrayView1<f64> {
        self.tbl.slice(s![..-1, -1])
    }

    pub fn objective_row(&self) -> ArrayView1<f64> {
        self.tbl.slice(s![-1, ..-1])
    }

    /// Last cell of the objective row: minus the objective of the current basis.
    pub fn objective_constant(&self) -> f64 {
        self.tbl[[self.n_rows(), self.n_cols()]]
    }

    pub fn is_basic(&self, col: usize) -> bool {
        self.basic_vars.contains(&col)
    }

    pub fn basic_row(&self, col: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&b| b == col)
    }

    pub fn has_non_finite(&self) -> bool {
        self.tbl.iter().any(|v| !v.is_finite())
    }

    //pivot
    pub(crate) fn pivot(&mut self, pivot_ind: &TableauIx) -> Result<(), PivotError> {
        let (pi, pj) = (pivot_ind.i(), pivot_ind.j());
        //assert row and col in valid range
        assert!(pi < self.n_rows());
        assert!(pj < self.n_cols());

        let div = self.tbl[[pi, pj]];
        if div.abs() <= self.tol {
            return Err(PivotError::DegeneratePivot {
                row: pi,
                column: pj,
                value: div,
            });
        }

        //set coefficients in pivot row
        self.tbl.row_mut(pi).mapv_inplace(|v| v / div);
        self.tbl[[pi, pj]] = 1.0_f64;

        //eliminate pivot column from every other row, objective row included
        let pivot_row = self.tbl.row(pi).to_owned();
        for (i, mut row) in self.tbl.axis_iter_mut(Axis(0)).enumerate() {
            //skip pivot row
            if i == pi {
                continue;
            }
            let ratio = row[pj];
            if ratio != 0.0_f64 {
                row.scaled_add(-ratio, &pivot_row);
                row[pj] = 0.0_f64;
            }
        }

        self.basic_vars[pi] = pj;
        Ok(())
    }

    /// Dantzig's rule: column with the most negative reduced cost. `None` means optimal.
    ///
    /// Equal reduced costs resolve to the lowest column index.
    pub fn find_entering_column(&self) -> Option<usize> {
        let tol = self.tol;
        self.objective_row()
            .iter()
            .enumerate()
            .filter(|(_j, v)| **v < -tol)
            .min_by(|(_j1, v1), (_j2, v2)| v1.partial_cmp(v2).unwrap_or(Ordering::Equal))
            .map(|(j, _v)| j)
    }

    /// Bland's rule: lowest column index with a negative reduced cost.
    pub fn find_entering_column_bland(&self) -> Option<usize> {
        let tol = self.tol;
        self.objective_row().iter().position(|v| *v < -tol)
    }

    /// Minimum ratio test over rows with a positive coefficient in `col`.
    ///
    /// Ratios within tolerance of each other are ties, resolved in favour of the row whose
    /// basic variable has the smallest index. `None` means the column is unbounded.
    pub fn find_leaving_row(&self, col: usize) -> Option<usize> {
        let tol = self.tol;
        let mut best: Option<(usize, f64)> = None;

        for (i, (&a, &b)) in self
            .tbl
            .slice(s![..-1, col])
            .iter()
            .zip(self.rhs().iter())
            .enumerate()
        {
            if a <= tol {
                continue;
            }
            //drift can push a basic value slightly below zero
            let ratio = b.max(0.0_f64) / a;
            best = match best {
                None => Some((i, ratio)),
                Some((k, r)) => {
                    let smaller = ratio < r - tol;
                    let tie = (ratio - r).abs() <= tol;
                    if smaller || (tie && self.basic_vars[i] < self.basic_vars[k]) {
                        Some((i, ratio))
                    } else {
                        Some((k, r))
                    }
                }
            };
        }
        best.map(|(i, _r)| i)
    }

    /// Replace the objective row by `costs` (one entry per variable column, then the
    /// constant) and price out the current basis so basic reduced costs are zero.
    pub(crate) fn set_objective(&mut self, costs: ArrayView1<f64>) {
        assert_eq!(costs.len(), self.tbl.ncols());
        let mut obj: Array1<f64> = costs.to_owned();
        for (i, &col) in self.basic_vars.iter().enumerate() {
            let coeff = obj[col];
            if coeff != 0.0_f64 {
                obj.scaled_add(-coeff, &self.tbl.row(i));
                obj[col] = 0.0_f64;
            }
        }
        let m = self.n_rows();
        self.tbl.row_mut(m).assign(&obj);
    }

    /// Give each row in `rows` a fresh artificial column that is basic in that row. The
    /// row is negated first so a negative right hand side becomes positive. Returns the
    /// indices of the new columns.
    ///
    /// The objective row is left stale; install one with [`Tableau::set_objective`].
    pub(crate) fn add_artificials(&mut self, rows: &[usize]) -> Vec<usize> {
        let k = self.n_cols();
        let mut tbl = Array2::<f64>::zeros((self.tbl.nrows(), k + rows.len() + 1));
        tbl.slice_mut(s![.., ..k]).assign(&self.tbl.slice(s![.., ..k]));
        tbl.slice_mut(s![.., -1]).assign(&self.tbl.slice(s![.., -1]));

        let mut artificial_vars = Vec::with_capacity(rows.len());
        for (a, &row) in rows.iter().enumerate() {
            let col = k + a;
            tbl.row_mut(row).mapv_inplace(|v| -v);
            tbl[[row, col]] = 1.0_f64;
            self.basic_vars[row] = col;
            artificial_vars.push(col);
        }

        self.tbl = tbl;
        artificial_vars
    }

    /// Remove the variable columns whose mask entry is `false`. The right hand side is
    /// always kept. Returns `false`, leaving the tableau untouched, if a basic column would
    /// be removed.
    pub(crate) fn drop_columns(&mut self, keep: &[bool]) -> bool {
        assert_eq!(keep.len(), self.n_cols());
        if self.basic_vars.iter().any(|&col| !keep[col]) {
            return false;
        }

        let mut new_index = vec![usize::MAX; keep.len()];
        let mut cols = Vec::with_capacity(keep.len() + 1);
        for (j, _) in keep.iter().enumerate().filter(|(_j, k)| **k) {
            new_index[j] = cols.len();
            cols.push(j);
        }
        cols.push(self.n_cols());

        self.tbl = self.tbl.select(Axis(1), &cols);
        self.basic_vars.iter_mut().for_each(|col| *col = new_index[*col]);
        true
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut layout = "{:<}".to_string();
        layout += &" {:>}".repeat(self.tbl.ncols());
        let mut table = Table::new(layout.as_str());

        let mut header = Row::new().with_cell("basis");
        for j in 0..self.n_cols() {
            header.add_cell(format!("x{}", j));
        }
        header.add_cell("rhs");
        table.add_row(header);

        for (i, row) in self.tbl.rows().into_iter().enumerate() {
            let label = match self.basic_vars.get(i) {
                Some(col) => format!("x{}", col),
                None => "obj".to_string(),
            };
            let mut r = Row::new().with_cell(label);
            row.iter().for_each(|v| {
                r.add_cell(format!("{:.4}", v));
            });
            table.add_row(r);
        }

        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const TOL: f64 = 1.0e-9;

    //max 3x + 2y s.t. x + y <= 4, x + 3y <= 6
    fn small() -> Tableau {
        let tbl = array![
            [1.0, 1.0, 1.0, 0.0, 4.0],
            [1.0, 3.0, 0.0, 1.0, 6.0],
            [-3.0, -2.0, 0.0, 0.0, 0.0],
        ];
        Tableau::new(tbl, vec![2, 3], TOL)
    }

    #[test]
    fn entering_column_is_most_negative() {
        let tbl = small();
        assert_eq!(tbl.find_entering_column(), Some(0));
        assert_eq!(tbl.find_entering_column_bland(), Some(0));
    }

    #[test]
    fn bland_takes_lowest_index() {
        let tbl = Tableau::new(
            array![[1.0, 1.0, 1.0, 1.0], [-1.0, -5.0, 0.0, 0.0]],
            vec![2],
            TOL,
        );
        assert_eq!(tbl.find_entering_column(), Some(1));
        assert_eq!(tbl.find_entering_column_bland(), Some(0));
    }

    #[test]
    fn leaving_row_minimum_ratio() {
        let tbl = small();
        //ratios 4/1 and 6/1
        assert_eq!(tbl.find_leaving_row(0), Some(0));
        //ratios 4/1 and 6/3
        assert_eq!(tbl.find_leaving_row(1), Some(1));
    }

    #[test]
    fn leaving_row_tie_prefers_smallest_basic_index() {
        let tbl = Tableau::new(
            array![
                [1.0, 0.0, 1.0, 0.0, 2.0],
                [2.0, 1.0, 0.0, 0.0, 4.0],
                [-1.0, 0.0, 0.0, 0.0, 0.0],
            ],
            vec![2, 1],
            TOL,
        );
        //both ratios equal 2, row 1 has basic column 1 < 2
        assert_eq!(tbl.find_leaving_row(0), Some(1));
    }

    #[test]
    fn no_leaving_row_when_unbounded() {
        let tbl = Tableau::new(
            array![[-1.0, 1.0, 3.0], [-1.0, 0.0, 0.0]],
            vec![1],
            TOL,
        );
        assert_eq!(tbl.find_leaving_row(0), None);
    }

    #[test]
    fn leaving_row_skips_entries_pivot_would_reject() {
        //row 0 has the smaller ratio but its entry is below tolerance
        let mut tbl = Tableau::new(
            array![[1.0e-12, 1.0, 0.0, 0.0], [2.0, 0.0, 1.0, 4.0], [-1.0, 0.0, 0.0, 0.0]],
            vec![1, 2],
            TOL,
        );
        assert!(tbl.pivot(&TableauIx::new(0, 0)).is_err());
        assert_eq!(tbl.find_leaving_row(0), Some(1));
        assert!(tbl.pivot(&TableauIx::new(1, 0)).is_ok());
        assert_eq!(tbl.basic_vars(), &[1, 0]);
    }

    #[test]
    fn pivot_keeps_identity_basis() {
        let mut tbl = small();
        tbl.pivot(&TableauIx::new(0, 0)).unwrap();

        assert_eq!(tbl.basic_vars(), &[0, 3]);
        assert!(tbl.is_basic(0));
        assert!(!tbl.is_basic(2));
        assert_eq!(tbl.basic_row(3), Some(1));
        assert_eq!(tbl.basic_row(1), None);
        for (i, &col) in tbl.basic_vars().iter().enumerate() {
            for k in 0..=tbl.n_rows() {
                let expected = if k == i { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(tbl.tbl()[[k, col]], expected);
            }
        }
        //x = 4 gives objective 12, stored negated in the corner
        assert_abs_diff_eq!(tbl.rhs()[0], 4.0);
        assert_abs_diff_eq!(tbl.objective_constant(), 12.0);
    }

    #[test]
    fn pivot_on_zero_is_degenerate() {
        let mut tbl = Tableau::new(
            array![[0.0, 1.0, 1.0], [-1.0, 0.0, 0.0]],
            vec![1],
            TOL,
        );
        let err = tbl.pivot(&TableauIx::new(0, 0)).unwrap_err();
        assert!(matches!(err, PivotError::DegeneratePivot { row: 0, column: 0, .. }));
        assert_eq!(tbl.basic_vars(), &[1]);
    }

    #[test]
    fn set_objective_prices_out_basis() {
        let mut tbl = small();
        tbl.pivot(&TableauIx::new(0, 0)).unwrap();
        tbl.set_objective(array![1.0, 0.0, 0.0, 0.0, 0.0].view());
        assert_abs_diff_eq!(tbl.objective_row()[0], 0.0);
        assert_abs_diff_eq!(tbl.objective_row()[1], -1.0);
        assert_abs_diff_eq!(tbl.objective_constant(), -4.0);
    }

    #[test]
    fn drop_columns_remaps_basis() {
        let mut tbl = small();
        assert!(!tbl.drop_columns(&[true, true, false, true]));
        assert_eq!(tbl.n_cols(), 4);

        assert!(tbl.drop_columns(&[false, true, true, true]));
        assert_eq!(tbl.n_cols(), 3);
        assert_eq!(tbl.basic_vars(), &[1, 2]);
        assert_abs_diff_eq!(tbl.rhs()[1], 6.0);
    }

    #[test]
    fn artificials_flip_negative_rows() {
        //x + s0 = -2, x + s1 = 3
        let mut tbl = Tableau::new(
            array![[1.0, 1.0, 0.0, -2.0], [1.0, 0.0, 1.0, 3.0], [-1.0, 0.0, 0.0, 0.0]],
            vec![1, 2],
            TOL,
        );
        let art = tbl.add_artificials(&[0]);

        assert_eq!(art, vec![3]);
        assert_eq!(tbl.basic_vars(), &[3, 2]);
        assert_eq!(tbl.tbl().row(0).to_vec(), vec![-1.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(tbl.tbl().row(1).to_vec(), vec![1.0, 0.0, 1.0, 0.0, 3.0]);
    }

    #[test]
    fn display_lists_basis_labels() {
        let out = small().to_string();
        assert!(out.contains("basis"));
        assert!(out.contains("x3"));
        assert!(out.contains("obj"));
    }
}
