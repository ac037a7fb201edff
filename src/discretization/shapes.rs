use std::f64::consts::PI;

use super::grid::{arange, Grid};
use super::GridError;

/// Geometry of a source region, centred on its origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// The single grid point closest to the origin.
    Point,
    /// Axis-aligned rectangle; `width` runs along the first axis.
    Rectangle { width: f64, height: f64 },
    Circle { radius: f64 },
}

impl Shape {
    /// Build a shape from a name and a positional parameter list.
    ///
    /// An empty list always means a point source, whatever the name.
    /// `"rectangle"` takes `[width, height]`, `"circle"` takes `[radius]`.
    pub fn from_args(name: &str, params: &[f64]) -> Result<Self, GridError> {
        match (name, params) {
            (_, []) => Ok(Shape::Point),
            ("rectangle", &[width, height]) => Ok(Shape::Rectangle { width, height }),
            ("circle", &[radius]) => Ok(Shape::Circle { radius }),
            _ => Err(GridError::UnsupportedShape {
                shape: name.to_string(),
                params: params.len(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Point => "point",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Circle { .. } => "circle",
        }
    }

    /// Grid cells hit while walking the outline, in sampling order.
    /// Cells may repeat.
    pub fn outline(&self, grid: &Grid, origin: (f64, f64)) -> Vec<(usize, usize)> {
        match *self {
            Shape::Point => vec![grid.closest_gridpoint(origin)],
            Shape::Rectangle { width, height } => rectangle_outline(grid, origin, width, height),
            Shape::Circle { radius } => circle_outline(grid, origin, radius),
        }
    }
}

fn rectangle_outline(grid: &Grid, origin: (f64, f64), width: f64, height: f64) -> Vec<(usize, usize)> {
    let min_x = origin.0 - width / 2.0;
    let max_x = origin.0 + width / 2.0;
    let min_y = origin.1 - height / 2.0;
    let max_y = origin.1 + height / 2.0;
    let vertices = [
        (min_x, min_y),
        (min_x, max_y),
        (max_x, max_y),
        (max_x, min_y),
        (min_x, min_y),
    ];

    let mut cells = Vec::new();
    for edge in vertices.windows(2) {
        let ((x1, y1), (x2, y2)) = (edge[0], edge[1]);
        if x1 == x2 {
            for y in arange(y1.min(y2), y1.max(y2), grid.h) {
                cells.push(grid.closest_gridpoint((x1, y)));
            }
        } else if y1 == y2 {
            for x in arange(x1.min(x2), x1.max(x2), grid.h) {
                cells.push(grid.closest_gridpoint((x, y1)));
            }
        }
    }
    cells
}

fn circle_outline(grid: &Grid, origin: (f64, f64), radius: f64) -> Vec<(usize, usize)> {
    // Angular step chosen so consecutive samples are about h/2 apart.
    let d_theta = grid.h / (2.0 * radius);
    arange(0.0, 2.0 * PI, d_theta)
        .into_iter()
        .map(|theta| {
            grid.closest_gridpoint((
                origin.0 + radius * theta.sin(),
                origin.1 + radius * theta.cos(),
            ))
        })
        .collect()
}
