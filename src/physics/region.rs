use log::{debug, warn};
use nalgebra::DMatrix;

use crate::discretization::grid::Grid;
use crate::discretization::shapes::Shape;
use crate::discretization::GridError;

/// One rasterized source shape on its own `ns × ns` grid.
///
/// Every marked cell holds `potential` in both `potentials` and
/// `source_potentials`. Marking is assignment: a cell hit twice by the same
/// outline still holds `potential`. Summation only happens in
/// [`System::add`](super::System::add).
#[derive(Clone, Debug)]
pub struct Region {
    ns: usize,
    potential: f64,
    shape: Shape,
    potentials: DMatrix<f64>,
    sources: DMatrix<bool>,
    source_potentials: DMatrix<f64>,
}

impl Region {
    /// Rasterize `shape` centred on `origin`.
    ///
    /// With `filled`, each grid row holding two or more outline cells is
    /// filled between its first and last marked cell (a row-wise scanline
    /// fill, not a polygon fill).
    pub fn new(
        ns: usize,
        potential: f64,
        origin: (f64, f64),
        shape: Shape,
        filled: bool,
    ) -> Result<Self, GridError> {
        let grid = Grid::new(ns)?;
        if !origin.0.is_finite() || !origin.1.is_finite() {
            return Err(GridError::NonFiniteOrigin {
                x: origin.0,
                y: origin.1,
            });
        }
        let mut region = Self::blank(ns, potential, shape);

        match shape {
            Shape::Point => {}
            Shape::Rectangle { width, height } => debug!(
                "Adding rectangle centred at {origin:?} with width: {width}, height: {height}"
            ),
            Shape::Circle { radius } => {
                debug!("Adding circle centred at {origin:?} with radius {radius}")
            }
        }

        for cell in shape.outline(&grid, origin) {
            region.mark(cell);
        }
        if filled {
            region.fill();
        }
        Ok(region)
    }

    /// Lenient constructor for callers holding a shape name and a parameter
    /// list. An unsupported combination is logged and gives an empty region,
    /// so adding it to a system changes nothing.
    pub fn from_args(
        ns: usize,
        potential: f64,
        origin: (f64, f64),
        name: &str,
        params: &[f64],
        filled: bool,
    ) -> Result<Self, GridError> {
        match Shape::from_args(name, params) {
            Ok(shape) => Self::new(ns, potential, origin, shape, filled),
            Err(err @ GridError::UnsupportedShape { .. }) => {
                warn!("{err}; no shape has been added");
                Grid::new(ns)?;
                Ok(Self::blank(ns, potential, Shape::Point))
            }
            Err(err) => Err(err),
        }
    }

    fn blank(ns: usize, potential: f64, shape: Shape) -> Self {
        Self {
            ns,
            potential,
            shape,
            potentials: DMatrix::zeros(ns, ns),
            sources: DMatrix::from_element(ns, ns, false),
            source_potentials: DMatrix::zeros(ns, ns),
        }
    }

    fn mark(&mut self, cell: (usize, usize)) {
        self.potentials[cell] = self.potential;
        self.sources[cell] = true;
        self.source_potentials[cell] = self.potential;
    }

    fn fill(&mut self) {
        for row in 0..self.ns {
            let first = (0..self.ns).find(|&col| self.sources[(row, col)]);
            let last = (0..self.ns).rev().find(|&col| self.sources[(row, col)]);
            if let (Some(first), Some(last)) = (first, last) {
                for col in first + 1..last {
                    self.mark((row, col));
                }
            }
        }
    }

    pub fn ns(&self) -> usize {
        self.ns
    }

    pub fn potential(&self) -> f64 {
        self.potential
    }

    pub fn shape(&self) -> Shape {
        self.shape
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

    /// Marked cells, row-major.
    pub fn cells(&self) -> Vec<(usize, usize)> {
        (0..self.ns)
            .flat_map(|row| (0..self.ns).map(move |col| (row, col)))
            .filter(|&cell| self.sources[cell])
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.sources.iter().any(|&s| s)
    }
}
