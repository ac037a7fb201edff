use nalgebra::{DMatrix, DVector};

/// Diagonal coefficient of the 5-point Laplacian (scaled by `h²`).
pub const DIAGONAL: f64 = -4.0;
/// Coefficient of each in-bounds cardinal neighbour.
pub const OFF_DIAGONAL: f64 = 1.0;

/// The 5-point finite-difference operator `A = L + D + U` over the
/// row-major flattened `ns × ns` grid, stored implicitly.
///
/// Off-diagonal columns are kept in one arena (`row_ptr` / `col_idx`, the
/// same layout as a CSR matrix without the values, since every off-diagonal
/// entry is [`OFF_DIAGONAL`]). Columns are ascending within a row, so the
/// strictly-lower part of row `k` is `col_idx[row_ptr[k]..upper_start[k]]`
/// and the strictly-upper part is `col_idx[upper_start[k]..row_ptr[k + 1]]`.
///
/// Neighbours outside the grid are dropped. That is the same as a grounded
/// (zero-potential) exterior: the right-hand side stays zero.
#[derive(Clone, Debug)]
pub struct Stencil {
    ns: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    upper_start: Vec<usize>,
}

/// Dense view of the splitting `A = L + D + U`.
///
/// Storage is `O(ns⁴)`; only meant for small grids and for checking the
/// implicit operator against the matrix formulation.
#[derive(Clone, Debug)]
pub struct DenseSplitting {
    pub lower: DMatrix<f64>,
    pub diagonal: DVector<f64>,
    pub upper: DMatrix<f64>,
}

impl Stencil {
    pub fn new(ns: usize) -> Self {
        let n = ns * ns;
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(4 * n);
        let mut upper_start = Vec::with_capacity(n);
        row_ptr.push(0);

        for k in 0..n {
            let (row, col) = (k / ns, k % ns);
            // Ascending order: up, left | right, down.
            if row > 0 {
                col_idx.push(k - ns);
            }
            if col > 0 {
                col_idx.push(k - 1);
            }
            upper_start.push(col_idx.len());
            if col + 1 < ns {
                col_idx.push(k + 1);
            }
            if row + 1 < ns {
                col_idx.push(k + ns);
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            ns,
            row_ptr,
            col_idx,
            upper_start,
        }
    }

    pub fn ns(&self) -> usize {
        self.ns
    }

    /// Number of unknowns, `ns²`.
    pub fn len(&self) -> usize {
        self.upper_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper_start.is_empty()
    }

    #[inline]
    pub fn diagonal(&self, _k: usize) -> f64 {
        DIAGONAL
    }

    /// In-bounds neighbour columns of row `k`, ascending.
    #[inline]
    pub fn neighbors(&self, k: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[k]..self.row_ptr[k + 1]]
    }

    /// Neighbour columns with their weights.
    pub fn weighted_neighbors(&self, k: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.neighbors(k).iter().map(|&j| (j, OFF_DIAGONAL))
    }

    /// Columns `j < k` of row `k` (the `L` part).
    #[inline]
    pub fn lower(&self, k: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[k]..self.upper_start[k]]
    }

    /// Columns `j > k` of row `k` (the `U` part).
    #[inline]
    pub fn upper(&self, k: usize) -> &[usize] {
        &self.col_idx[self.upper_start[k]..self.row_ptr[k + 1]]
    }

    /// Total number of off-diagonal entries.
    pub fn nnz_off_diagonal(&self) -> usize {
        self.col_idx.len()
    }

    /// Out-of-bounds neighbour coordinates of row `k`, in the order
    /// left, right, up, down. These are the grounded exterior points.
    pub fn exterior_neighbors(&self, k: usize) -> Vec<(isize, isize)> {
        let ns = self.ns as isize;
        let (row, col) = ((k / self.ns) as isize, (k % self.ns) as isize);
        [(row, col - 1), (row, col + 1), (row - 1, col), (row + 1, col)]
            .into_iter()
            .filter(|&(r, c)| r < 0 || c < 0 || r >= ns || c >= ns)
            .collect()
    }

    /// Right-hand side `b`. The exterior is grounded, so it is all zero.
    pub fn rhs(&self) -> DVector<f64> {
        DVector::zeros(self.len())
    }

    /// `A · x`.
    pub fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.len(),
            (0..self.len()).map(|k| {
                DIAGONAL * x[k] + self.neighbors(k).iter().map(|&j| OFF_DIAGONAL * x[j]).sum::<f64>()
            }),
        )
    }

    /// `b - A · x` on free cells, zero on pinned ones.
    pub fn residual(&self, x: &DVector<f64>, b: &DVector<f64>, pinned: &[bool]) -> DVector<f64> {
        let ax = self.apply(x);
        DVector::from_iterator(
            self.len(),
            (0..self.len()).map(|k| if pinned[k] { 0.0 } else { b[k] - ax[k] }),
        )
    }

    /// Materialise `L`, `D` and `U` as dense matrices.
    pub fn to_dense(&self) -> DenseSplitting {
        let n = self.len();
        let mut lower = DMatrix::zeros(n, n);
        let mut upper = DMatrix::zeros(n, n);
        for k in 0..n {
            for &j in self.lower(k) {
                lower[(k, j)] = OFF_DIAGONAL;
            }
            for &j in self.upper(k) {
                upper[(k, j)] = OFF_DIAGONAL;
            }
        }
        DenseSplitting {
            lower,
            diagonal: DVector::from_element(n, DIAGONAL),
            upper,
        }
    }
}

impl DenseSplitting {
    /// `A = L + D + U`.
    pub fn assemble(&self) -> DMatrix<f64> {
        &self.lower + DMatrix::from_diagonal(&self.diagonal) + &self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbour_counts_follow_position() {
        for ns in 2..7 {
            let stencil = Stencil::new(ns);
            for k in 0..stencil.len() {
                let (row, col) = (k / ns, k % ns);
                let on_row_edge = row == 0 || row == ns - 1;
                let on_col_edge = col == 0 || col == ns - 1;
                let expected = match (on_row_edge, on_col_edge) {
                    (true, true) => 2,
                    (true, false) | (false, true) => 3,
                    (false, false) => 4,
                };
                assert_eq!(stencil.neighbors(k).len(), expected, "ns={ns} k={k}");
                assert_eq!(stencil.exterior_neighbors(k).len(), 4 - expected);
                assert_eq!(stencil.diagonal(k), -4.0);
            }
        }
    }

    #[test]
    fn single_cell_has_no_neighbours() {
        let stencil = Stencil::new(1);
        assert_eq!(stencil.len(), 1);
        assert!(stencil.neighbors(0).is_empty());
        assert_eq!(stencil.exterior_neighbors(0).len(), 4);
    }

    #[test]
    fn lower_and_upper_split_at_the_diagonal() {
        let stencil = Stencil::new(4);
        // Interior cell (1, 1) -> k = 5.
        assert_eq!(stencil.lower(5), &[1, 4]);
        assert_eq!(stencil.upper(5), &[6, 9]);
        // Corner (0, 0).
        assert!(stencil.lower(0).is_empty());
        assert_eq!(stencil.upper(0), &[1, 4]);
    }

    #[test]
    fn rows_do_not_wrap_around() {
        let stencil = Stencil::new(3);
        // (0, 2) and (1, 0) are adjacent in flat order but not on the grid.
        assert!(!stencil.neighbors(2).contains(&3));
        assert!(!stencil.neighbors(3).contains(&2));
    }

    #[test]
    fn dense_splitting_matches_implicit_apply() {
        let stencil = Stencil::new(5);
        let dense = stencil.to_dense().assemble();
        let x = DVector::from_fn(stencil.len(), |i, _| ((i * 7) % 11) as f64 - 3.0);
        let diff = (dense * &x - stencil.apply(&x)).amax();
        assert!(diff < 1e-12);
    }

    #[test]
    fn dense_matrix_is_symmetric_with_expected_nnz() {
        let stencil = Stencil::new(4);
        let a = stencil.to_dense().assemble();
        assert_eq!(a, a.transpose());
        let off = a.iter().filter(|v| **v == 1.0).count();
        assert_eq!(off, stencil.nnz_off_diagonal());
        // 2 * (ns * (ns - 1)) horizontal + vertical edges, counted twice.
        assert_eq!(off, 4 * 4 * 3);
    }

    #[test]
    fn residual_ignores_pinned_cells() {
        let stencil = Stencil::new(3);
        let x = DVector::from_element(9, 1.0);
        let mut pinned = vec![false; 9];
        pinned[4] = true;
        let r = stencil.residual(&x, &stencil.rhs(), &pinned);
        assert_eq!(r[4], 0.0);
        // Corner: -( -4 + 2 ) = 2.
        assert_eq!(r[0], 2.0);
    }
}
