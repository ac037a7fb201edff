use nalgebra::{DMatrix, DVector};

/// Interior Dirichlet conditions: the flattened cells pinned to a fixed
/// potential, applied strongly (the value is overwritten, never relaxed).
#[derive(Clone, Debug, Default)]
pub struct PinnedCells {
    mask: Vec<bool>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl PinnedCells {
    /// Build from a source mask and the matching pinned values, flattening
    /// row-major.
    pub fn new(sources: &DMatrix<bool>, source_potentials: &DMatrix<f64>) -> Self {
        let mask: Vec<bool> = sources.transpose().iter().cloned().collect();
        let flat_values: Vec<f64> = source_potentials.transpose().iter().cloned().collect();
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, pinned)| **pinned)
            .map(|(k, _)| k)
            .collect();
        let values = indices.iter().map(|&k| flat_values[k]).collect();
        Self {
            mask,
            indices,
            values,
        }
    }

    #[inline]
    pub fn is_pinned(&self, k: usize) -> bool {
        self.mask[k]
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Overwrite every pinned entry of `x` with its value.
    pub fn apply(&self, x: &mut DVector<f64>) {
        for (&k, &value) in self.indices.iter().zip(&self.values) {
            x[k] = value;
        }
    }

    /// True when every pinned entry of `x` equals its value exactly.
    pub fn holds(&self, x: &DVector<f64>) -> bool {
        self.indices
            .iter()
            .zip(&self.values)
            .all(|(&k, &value)| x[k] == value)
    }
}
