use nalgebra::DVector;

use crate::discretization::stencil::Stencil;
use crate::physics::bc::PinnedCells;

/// One full relaxation sweep over the flattened grid.
///
/// Implementations update `x` in place. Whether pinned cells are skipped or
/// overwritten during the sweep is up to the method; the solver re-pins them
/// after every sweep either way.
pub trait Sweep {
    fn name(&self) -> &'static str;

    fn sweep(&mut self, x: &mut DVector<f64>, pinned: &PinnedCells);
}

/// `x_new = (b - (L + U) x_old) / D`, reading only the previous iterate.
pub struct JacobiSweep {
    stencil: Stencil,
    b: DVector<f64>,
    next: DVector<f64>,
}

impl JacobiSweep {
    pub fn new(stencil: Stencil, b: DVector<f64>) -> Self {
        let next = DVector::zeros(stencil.len());
        Self { stencil, b, next }
    }
}

impl Sweep for JacobiSweep {
    fn name(&self) -> &'static str {
        "Jacobi"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, _pinned: &PinnedCells) {
        for k in 0..self.stencil.len() {
            let off: f64 = self.stencil.weighted_neighbors(k).map(|(j, a)| a * x[j]).sum();
            self.next[k] = (self.b[k] - off) / self.stencil.diagonal(k);
        }
        std::mem::swap(x, &mut self.next);
    }
}

/// Pointwise forward Gauss-Seidel: cells are visited in index order and
/// already-updated neighbours are used immediately. Pinned cells are skipped.
pub struct GaussSeidelSweep {
    stencil: Stencil,
    b: DVector<f64>,
}

impl GaussSeidelSweep {
    pub fn new(stencil: Stencil, b: DVector<f64>) -> Self {
        Self { stencil, b }
    }
}

impl Sweep for GaussSeidelSweep {
    fn name(&self) -> &'static str {
        "Gauss-Seidel"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, pinned: &PinnedCells) {
        for k in 0..self.stencil.len() {
            if pinned.is_pinned(k) {
                continue;
            }
            let off: f64 = self.stencil.weighted_neighbors(k).map(|(j, a)| a * x[j]).sum();
            x[k] = (self.b[k] - off) / self.stencil.diagonal(k);
        }
    }
}

/// Successive over-relaxation:
/// `x[k] = (1 - ω) x[k] + (ω / D[k]) (b[k] - Σ_{j<k} L[k,j] x[j] - Σ_{j>k} U[k,j] x[j])`
/// on the in-progress vector. Pinned cells are never touched.
pub struct SorSweep {
    stencil: Stencil,
    b: DVector<f64>,
    omega: f64,
}

impl SorSweep {
    pub fn new(stencil: Stencil, b: DVector<f64>, omega: f64) -> Self {
        Self { stencil, b, omega }
    }
}

impl Sweep for SorSweep {
    fn name(&self) -> &'static str {
        "SOR"
    }

    fn sweep(&mut self, x: &mut DVector<f64>, pinned: &PinnedCells) {
        let w = self.omega;
        for k in 0..self.stencil.len() {
            if pinned.is_pinned(k) {
                continue;
            }
            let s1: f64 = self.stencil.lower(k).iter().map(|&j| x[j]).sum();
            let s2: f64 = self.stencil.upper(k).iter().map(|&j| x[j]).sum();
            x[k] = (1.0 - w) * x[k] + (w / self.stencil.diagonal(k)) * (self.b[k] - s1 - s2);
        }
    }
}

/// Over-relaxation factor minimising the SOR spectral radius for the
/// 5-point Laplacian on an `ns × ns` grid with a grounded exterior.
pub fn optimal_omega(ns: usize) -> f64 {
    2.0 / (1.0 + (std::f64::consts::PI / (ns as f64 + 1.0)).sin())
}
