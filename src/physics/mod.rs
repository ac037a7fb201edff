pub mod bc;
pub mod region;

pub use region::Region;

use nalgebra::{DMatrix, DVector};

use crate::discretization::grid::Grid;
use crate::discretization::GridError;
use crate::numerics::solver::{
    RelaxationConfig, RelaxationMethod, RelaxationSolver, SolverError, SolverResult,
};
use bc::PinnedCells;

/// The grid/source model: working potential field, source mask and pinned
/// source potentials on one `ns × ns` grid.
///
/// Regions are combined by summation, so overlapping potentials add up and
/// masks combine with a logical OR. Sources cannot be removed once added.
#[derive(Clone, Debug)]
pub struct System {
    grid: Grid,
    potentials: DMatrix<f64>,
    sources: DMatrix<bool>,
    source_potentials: DMatrix<f64>,
}

impl System {
    pub fn new(ns: usize) -> Result<Self, GridError> {
        let grid = Grid::new(ns)?;
        Ok(Self {
            grid,
            potentials: DMatrix::zeros(ns, ns),
            sources: DMatrix::from_element(ns, ns, false),
            source_potentials: DMatrix::zeros(ns, ns),
        })
    }

    /// Add a region's potentials, mask and source potentials element-wise.
    pub fn add(&mut self, region: &Region) -> Result<(), GridError> {
        if region.ns() != self.ns() {
            return Err(GridError::DimensionMismatch {
                expected: self.ns(),
                found: region.ns(),
            });
        }
        self.potentials += region.potentials();
        self.source_potentials += region.source_potentials();
        self.sources.zip_apply(region.sources(), |s, r| *s = *s || r);
        Ok(())
    }

    pub fn ns(&self) -> usize {
        self.grid.ns
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn potentials(&self) -> &DMatrix<f64> {
        &self.potentials
    }

    pub fn sources(&self) -> &DMatrix<bool> {
        &self.sources
    }

    pub fn source_potentials(&self) -> &DMatrix<f64> {
        &self.source_potentials
    }

    pub fn source_count(&self) -> usize {
        self.sources.iter().filter(|&&s| s).count()
    }

    /// Potential field flattened row-major (`k = row * ns + col`).
    pub fn flatten_potentials(&self) -> DVector<f64> {
        DVector::from_iterator(self.grid.len(), self.potentials.transpose().iter().cloned())
    }

    pub fn pinned_cells(&self) -> PinnedCells {
        PinnedCells::new(&self.sources, &self.source_potentials)
    }

    /// Overwrite the potential field from a row-major vector.
    pub(crate) fn set_flat_potentials(&mut self, x: &DVector<f64>) {
        let ns = self.ns();
        self.potentials = DMatrix::from_row_slice(ns, ns, x.as_slice());
    }

    pub fn jacobi(&mut self, config: &RelaxationConfig) -> Result<SolverResult, SolverError> {
        RelaxationSolver::new(RelaxationMethod::Jacobi, config.clone()).solve(self)
    }

    pub fn gauss_seidel(&mut self, config: &RelaxationConfig) -> Result<SolverResult, SolverError> {
        RelaxationSolver::new(RelaxationMethod::GaussSeidel, config.clone()).solve(self)
    }

    pub fn sor(&mut self, omega: f64, config: &RelaxationConfig) -> Result<SolverResult, SolverError> {
        RelaxationSolver::new(RelaxationMethod::Sor { omega }, config.clone()).solve(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::shapes::Shape;

    #[test]
    fn new_system_is_zeroed() {
        let system = System::new(6).unwrap();
        assert_eq!(system.source_count(), 0);
        assert!(system.potentials().iter().all(|&p| p == 0.0));
        assert!(matches!(System::new(0), Err(GridError::InvalidDimension(0))));
    }

    #[test]
    fn add_rejects_other_grid_sizes() {
        let mut system = System::new(10).unwrap();
        let region = Region::new(12, 1.0, (0.5, 0.5), Shape::Point, false).unwrap();
        assert_eq!(
            system.add(&region),
            Err(GridError::DimensionMismatch { expected: 10, found: 12 })
        );
        assert_eq!(system.source_count(), 0);
    }

    #[test]
    fn flatten_is_row_major() {
        let mut system = System::new(4).unwrap();
        system
            .add(&Region::new(4, 3.0, (0.0, 1.0), Shape::Point, false).unwrap())
            .unwrap();
        let flat = system.flatten_potentials();
        assert_eq!(flat[3], 3.0);
        assert_eq!(system.pinned_cells().indices(), &[3]);

        system.set_flat_potentials(&flat);
        assert_eq!(system.potentials()[(0, 3)], 3.0);
    }
}
