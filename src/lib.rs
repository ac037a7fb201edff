//! Steady-state potentials on a square grid by relaxation of the 5-point
//! Laplace stencil.
//!
//! A [`physics::System`] collects rasterized source regions (cells pinned to a
//! potential). A [`numerics::solver::RelaxationSolver`] then relaxes every
//! other cell with Jacobi, Gauss-Seidel or SOR sweeps until the norm-delta (or
//! residual) rule is met, writing the result back into the system.
//!
//! ```rust
//! use laplace_rs::discretization::shapes::Shape;
//! use laplace_rs::numerics::solver::{RelaxationConfig, RelaxationMethod, RelaxationSolver};
//! use laplace_rs::physics::{Region, System};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut system = System::new(20)?;
//! system.add(&Region::new(20, 1.0, (0.5, 0.5), Shape::Point, false)?)?;
//!
//! let config = RelaxationConfig::default()
//!     .with_tolerance(1e-8)
//!     .with_seed(7);
//! let solver = RelaxationSolver::new(RelaxationMethod::Sor { omega: 1.5 }, config);
//! let result = solver.solve(&mut system)?;
//! assert!(result.iterations > 0);
//! # Ok(())
//! # }
//! ```

pub mod discretization;
pub mod numerics;
pub mod physics;
pub mod processing;
