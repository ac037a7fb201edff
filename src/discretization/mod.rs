pub mod grid;
pub mod shapes;
pub mod stencil;

use thiserror::Error;

/// Errors raised while setting up grids, regions and systems.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid dimension must be a positive integer, got {0}")]
    InvalidDimension(usize),
    #[error("grid dimension mismatch: system has Ns = {expected}, region has Ns = {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("{params} parameter(s) not implemented for shape '{shape}'")]
    UnsupportedShape { shape: String, params: usize },
    #[error("shape origin ({x}, {y}) is not finite")]
    NonFiniteOrigin { x: f64, y: f64 },
}
