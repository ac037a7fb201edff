use std::collections::HashMap;

use super::GridError;

/// A square grid of `ns × ns` points covering the unit square.
///
/// Grid points sit at `i / (ns - 1)` along each axis, endpoints included.
/// The spacing `h = 1 / ns` is the stepping interval used when walking shape
/// outlines, which is slightly finer than the point spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub ns: usize,
    pub h: f64,
    coordinates: Vec<f64>,
}

impl Grid {
    pub fn new(ns: usize) -> Result<Self, GridError> {
        if ns == 0 {
            return Err(GridError::InvalidDimension(ns));
        }
        let coordinates = if ns == 1 {
            vec![0.0]
        } else {
            let step = 1.0 / (ns - 1) as f64;
            (0..ns).map(|i| i as f64 * step).collect()
        };
        Ok(Self {
            ns,
            h: 1.0 / ns as f64,
            coordinates,
        })
    }

    /// Number of cells in the flattened grid.
    pub fn len(&self) -> usize {
        self.ns * self.ns
    }

    pub fn is_empty(&self) -> bool {
        self.ns == 0
    }

    /// Coordinate of grid line `i` (identical on both axes).
    pub fn coordinate(&self, i: usize) -> f64 {
        self.coordinates[i]
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Row-major flattened index of `(row, col)`.
    #[inline]
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.ns + col
    }

    /// Inverse of [`Grid::flat_index`].
    #[inline]
    pub fn cell(&self, k: usize) -> (usize, usize) {
        (k / self.ns, k % self.ns)
    }

    /// Snap `coords` to a grid point.
    ///
    /// Each axis contributes every cell lying on a grid line whose coordinate
    /// attains the minimal absolute distance: axis 0 contributes whole rows,
    /// axis 1 whole columns. The cell listed most often wins, and among equal
    /// counts the one listed first (rows before columns, row-major order).
    /// Without ties this is the plain nearest point; with a tie on an axis the
    /// lower index is taken. Points outside the unit square snap to the edge.
    /// A NaN coordinate contributes no line; NaN on both axes gives `(0, 0)`.
    pub fn closest_gridpoint(&self, coords: (f64, f64)) -> (usize, usize) {
        let rows = self.minimal_lines(coords.0);
        let cols = self.minimal_lines(coords.1);

        let mut candidates: Vec<(usize, usize)> =
            Vec::with_capacity((rows.len() + cols.len()) * self.ns);
        for &row in &rows {
            candidates.extend((0..self.ns).map(|col| (row, col)));
        }
        for row in 0..self.ns {
            candidates.extend(cols.iter().map(|&col| (row, col)));
        }

        let mut counts: HashMap<(usize, usize), usize> = HashMap::with_capacity(candidates.len());
        let mut order: Vec<(usize, usize)> = Vec::with_capacity(candidates.len());
        for &cell in &candidates {
            let count = counts.entry(cell).or_insert(0);
            if *count == 0 {
                order.push(cell);
            }
            *count += 1;
        }

        // NaN on both axes leaves no candidate line.
        let Some(&first) = order.first() else {
            return (0, 0);
        };
        // Strictly greater keeps the first-inserted cell among equal counts.
        let mut best = first;
        let mut best_count = 0;
        for cell in order {
            let count = counts[&cell];
            if count > best_count {
                best = cell;
                best_count = count;
            }
        }
        best
    }

    fn minimal_lines(&self, target: f64) -> Vec<usize> {
        let diffs: Vec<f64> = self
            .coordinates
            .iter()
            .map(|c| (c - target).abs())
            .collect();
        let min = diffs.iter().cloned().fold(f64::INFINITY, f64::min);
        diffs
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == min)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Evenly spaced samples in `[start, stop)`, reproducing the floating-point
/// behaviour of NumPy's `arange`: the count is `ceil((stop - start) / step)`,
/// the second sample is `start + step` and later ones are
/// `start + i * (second - start)`.
pub(crate) fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let count = ((stop - start) / step).ceil();
    if !count.is_finite() || count <= 0.0 {
        return Vec::new();
    }
    let count = count as usize;
    let mut samples = Vec::with_capacity(count);
    samples.push(start);
    if count > 1 {
        let second = start + step;
        samples.push(second);
        let delta = second - start;
        samples.extend((2..count).map(|i| start + i as f64 * delta));
    }
    samples
}
