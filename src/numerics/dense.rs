//! Matrix form of the three methods, built from the dense splitting
//! `A = L + D + U`.
//!
//! Jacobi and Gauss-Seidel are applied as one affine update per sweep,
//! `x ← T x + c`, over every cell (pinned ones included) before the solver
//! re-pins. SOR walks the dense rows of `L` and `U` pointwise. Memory is
//! `O(ns⁴)`, so this is for small grids and for cross-checking the implicit
//! sweeps in [`super::relaxation`].

use nalgebra::{DMatrix, DVector};

use crate::discretization::stencil::DenseSplitting;
use crate::numerics::relaxation::Sweep;
use crate::numerics::solver::SolverError;
use crate::physics::bc::PinnedCells;

/// `T = -D⁻¹ (L + U)`, `c = D⁻¹ b`.
pub struct DenseJacobi {
    t: DMatrix<f64>,
    c: DVector<f64>,
}

impl DenseJacobi {
    pub fn new(split: &DenseSplitting, b: &DVector<f64>) -> Result<Self, SolverError> {
        let d_inv = invert_diagonal(&split.diagonal, "Jacobi")?;
        let mut t = &split.lower + &split.upper;
        for (i, mut row) in t.row_iter_mut().enumerate() {
            row *= -d_inv[i];
        }
        let c = b.component_mul(&d_inv);
        Ok(Self { t, c })
    }

    pub fn iteration_matrix(&self) -> &DMatrix<f64> {
        &self.t
    }
}

impl Sweep for DenseJacobi {
    fn name(&self) -> &'static str {
        "Jacobi (dense)"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, _pinned: &PinnedCells) {
        *x = &self.t * &*x + &self.c;
    }
}

/// `T = -(L + D)⁻¹ U`, `c = (L + D)⁻¹ b`, both by forward substitution.
pub struct DenseGaussSeidel {
    t: DMatrix<f64>,
    c: DVector<f64>,
}

impl DenseGaussSeidel {
    pub fn new(split: &DenseSplitting, b: &DVector<f64>) -> Result<Self, SolverError> {
        let singular = || SolverError::SingularOperator {
            method: "Gauss-Seidel",
        };
        let l_d = &split.lower + DMatrix::from_diagonal(&split.diagonal);
        let t = -l_d.solve_lower_triangular(&split.upper).ok_or_else(singular)?;
        let c = l_d.solve_lower_triangular(b).ok_or_else(singular)?;
        if !t.iter().chain(c.iter()).all(|v| v.is_finite()) {
            return Err(singular());
        }
        Ok(Self { t, c })
    }

    pub fn iteration_matrix(&self) -> &DMatrix<f64> {
        &self.t
    }
}

impl Sweep for DenseGaussSeidel {
    fn name(&self) -> &'static str {
        "Gauss-Seidel (dense)"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, _pinned: &PinnedCells) {
        *x = &self.t * &*x + &self.c;
    }
}

pub struct DenseSor {
    split: DenseSplitting,
    b: DVector<f64>,
    omega: f64,
}

impl DenseSor {
    pub fn new(split: DenseSplitting, b: DVector<f64>, omega: f64) -> Result<Self, SolverError> {
        invert_diagonal(&split.diagonal, "SOR")?;
        Ok(Self { split, b, omega })
    }
}

impl Sweep for DenseSor {
    fn name(&self) -> &'static str {
        "SOR (dense)"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, pinned: &PinnedCells) {
        let n = x.len();
        let w = self.omega;
        for k in 0..n {
            if pinned.is_pinned(k) {
                continue;
            }
            let s1: f64 = (0..k).map(|j| self.split.lower[(k, j)] * x[j]).sum();
            let s2: f64 = (k + 1..n).map(|j| self.split.upper[(k, j)] * x[j]).sum();
            x[k] = (1.0 - w) * x[k] + (w / self.split.diagonal[k]) * (self.b[k] - s1 - s2);
        }
    }
}

fn invert_diagonal(diagonal: &DVector<f64>, method: &'static str) -> Result<DVector<f64>, SolverError> {
    if diagonal.iter().any(|&d| d == 0.0 || !d.is_finite()) {
        return Err(SolverError::SingularOperator { method });
    }
    Ok(diagonal.map(|d| 1.0 / d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::stencil::Stencil;
    use crate::numerics::relaxation::{JacobiSweep, SorSweep};

    fn pins_at(ns: usize, cells: &[((usize, usize), f64)]) -> PinnedCells {
        let mut sources = DMatrix::from_element(ns, ns, false);
        let mut values = DMatrix::zeros(ns, ns);
        for &(cell, v) in cells {
            sources[cell] = true;
            values[cell] = v;
        }
        PinnedCells::new(&sources, &values)
    }

    fn sample(n: usize) -> DVector<f64> {
        DVector::from_fn(n, |i, _| ((i * 13) % 7) as f64 / 7.0)
    }

    #[test]
    fn dense_and_implicit_jacobi_agree() {
        let stencil = Stencil::new(5);
        let b = stencil.rhs();
        let pins = pins_at(5, &[((2, 2), 1.0)]);
        let mut dense = DenseJacobi::new(&stencil.to_dense(), &b).unwrap();
        let mut implicit = JacobiSweep::new(stencil, b);

        let mut x_dense = sample(25);
        let mut x_implicit = x_dense.clone();
        for _ in 0..4 {
            dense.sweep(&mut x_dense, &pins);
            pins.apply(&mut x_dense);
            implicit.sweep(&mut x_implicit, &pins);
            pins.apply(&mut x_implicit);
        }
        assert!((x_dense - x_implicit).amax() < 1e-12);
    }

    #[test]
    fn dense_and_implicit_sor_agree() {
        let stencil = Stencil::new(5);
        let b = stencil.rhs();
        let pins = pins_at(5, &[((1, 3), -0.5), ((4, 0), 2.0)]);
        let mut dense = DenseSor::new(stencil.to_dense(), b.clone(), 1.4).unwrap();
        let mut implicit = SorSweep::new(stencil, b, 1.4);

        let mut x_dense = sample(25);
        pins.apply(&mut x_dense);
        let mut x_implicit = x_dense.clone();
        for _ in 0..4 {
            dense.sweep(&mut x_dense, &pins);
            implicit.sweep(&mut x_implicit, &pins);
        }
        assert!((x_dense - x_implicit).amax() < 1e-12);
    }

    #[test]
    fn dense_gauss_seidel_matches_forward_sweep_without_sources() {
        let stencil = Stencil::new(4);
        let b = stencil.rhs();
        let pins = pins_at(4, &[]);
        let mut dense = DenseGaussSeidel::new(&stencil.to_dense(), &b).unwrap();
        let mut implicit = SorSweep::new(stencil, b, 1.0);

        let mut x_dense = sample(16);
        let mut x_implicit = x_dense.clone();
        dense.sweep(&mut x_dense, &pins);
        implicit.sweep(&mut x_implicit, &pins);
        assert!((x_dense - x_implicit).amax() < 1e-12);
    }

    #[test]
    fn jacobi_iteration_matrix_has_quarter_weights() {
        let stencil = Stencil::new(3);
        let dense = DenseJacobi::new(&stencil.to_dense(), &stencil.rhs()).unwrap();
        let t = dense.iteration_matrix();
        assert_eq!(t[(4, 1)], 0.25);
        assert_eq!(t[(4, 4)], 0.0);
        assert_eq!(t[(0, 8)], 0.0);
    }

    #[test]
    fn zero_diagonal_is_singular() {
        let mut split = Stencil::new(2).to_dense();
        split.diagonal[1] = 0.0;
        let b = DVector::zeros(4);
        assert!(matches!(
            DenseJacobi::new(&split, &b),
            Err(SolverError::SingularOperator { .. })
        ));
        assert!(matches!(
            DenseGaussSeidel::new(&split, &b),
            Err(SolverError::SingularOperator { .. })
        ));
        assert!(DenseSor::new(split, b, 1.5).is_err());
    }
}
