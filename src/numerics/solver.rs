use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::discretization::stencil::Stencil;
use crate::numerics::dense::{DenseGaussSeidel, DenseJacobi, DenseSor};
use crate::numerics::relaxation::{GaussSeidelSweep, JacobiSweep, SorSweep, Sweep};
use crate::numerics::timing::{finalize_and_print, record_sweep, reset_timing};
use crate::numerics::{Convergence, ConvergenceCriteria, ConvergenceMetric};
use crate::physics::bc::PinnedCells;
use crate::physics::System;

/// Above this many unknowns the dense operator form is logged as a warning.
const DENSE_WARN_UNKNOWNS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error(
        "numerical fault at iteration {iteration}: norm went from {initial_norm} to {final_norm}"
    )]
    NumericalFault {
        iteration: usize,
        initial_norm: f64,
        final_norm: f64,
    },
    #[error("{method}: iteration matrix is singular")]
    SingularOperator { method: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RelaxationMethod {
    Jacobi,
    GaussSeidel,
    /// Successive over-relaxation with weight `omega`. Stable for
    /// `0 < omega < 2`; values outside are accepted with a warning.
    Sor { omega: f64 },
}

impl RelaxationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RelaxationMethod::Jacobi => "jacobi",
            RelaxationMethod::GaussSeidel => "gauss_seidel",
            RelaxationMethod::Sor { .. } => "sor",
        }
    }
}

/// Starting iterate for the free cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialGuess {
    /// Independent uniform samples in `[0, 1)`. `None` seeds from entropy.
    Random { seed: Option<u64> },
    /// Start from the system's present potential field.
    Current,
}

impl Default for InitialGuess {
    fn default() -> Self {
        InitialGuess::Random { seed: None }
    }
}

/// How the stencil is applied during a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OperatorForm {
    /// Neighbour arena, `O(ns²)` memory.
    #[default]
    Implicit,
    /// Dense `L`, `D`, `U` matrices and the matrix-form Jacobi and
    /// Gauss-Seidel updates. `O(ns⁴)` memory.
    Dense,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationConfig {
    pub convergence: Convergence,
    pub max_iterations: usize,
    /// Report every sweep at `info` level instead of `trace`.
    pub verbose: bool,
    pub initial_guess: InitialGuess,
    pub operator: OperatorForm,
    /// Wall-clock budget, checked between sweeps.
    pub time_limit: Option<Duration>,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            convergence: Convergence::default(),
            max_iterations: 5000,
            verbose: false,
            initial_guess: InitialGuess::default(),
            operator: OperatorForm::default(),
            time_limit: None,
        }
    }
}

impl RelaxationConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_criteria(mut self, criteria: ConvergenceCriteria) -> Self {
        self.convergence.criteria = criteria;
        self
    }

    pub fn with_metric(mut self, metric: ConvergenceMetric) -> Self {
        self.convergence.metric = metric;
        self
    }

    /// Random initial guess from a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.initial_guess = InitialGuess::Random { seed: Some(seed) };
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: InitialGuess) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    pub fn with_operator(mut self, operator: OperatorForm) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn validate(&self, method: &RelaxationMethod) -> Result<(), SolverError> {
        let tol = self.convergence.tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(SolverError::InvalidParameter {
                name: "tolerance",
                value: tol.to_string(),
                reason: "must be finite and non-negative",
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidParameter {
                name: "max_iterations",
                value: "0".to_string(),
                reason: "must be positive",
            });
        }
        if let RelaxationMethod::Sor { omega } = *method {
            if !omega.is_finite() || omega <= 0.0 {
                return Err(SolverError::InvalidParameter {
                    name: "omega",
                    value: omega.to_string(),
                    reason: "must be finite and positive",
                });
            }
            if omega >= 2.0 {
                warn!("SOR weight {omega} is outside (0, 2); the iteration will not converge");
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    IterationLimit,
    TimeLimit,
}

/// Diagnostics of one sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub initial_norm: f64,
    pub final_norm: f64,
    /// The quantity compared against the tolerance (norm delta or residual).
    pub measure: f64,
}

#[derive(Clone, Debug)]
pub struct SolverResult {
    pub method: RelaxationMethod,
    /// Number of completed sweeps.
    pub iterations: usize,
    pub final_measure: f64,
    pub stop_reason: StopReason,
    pub history: Vec<IterationRecord>,
}

impl SolverResult {
    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::Converged
    }
}

/// Relaxation solver for a [`System`].
///
/// The solve runs on a private copy of the field; the system is only written
/// once the loop ends without error, so a failed solve leaves it untouched.
#[derive(Clone, Debug)]
pub struct RelaxationSolver {
    pub method: RelaxationMethod,
    pub config: RelaxationConfig,
}

impl RelaxationSolver {
    pub fn new(method: RelaxationMethod, config: RelaxationConfig) -> Self {
        Self { method, config }
    }

    pub fn solve(&self, system: &mut System) -> Result<SolverResult, SolverError> {
        self.solve_with_callback(system, |_, _| {})
    }

    /// Like [`RelaxationSolver::solve`], calling `callback(iteration, x)`
    /// with the re-pinned, row-major iterate after every sweep.
    pub fn solve_with_callback(
        &self,
        system: &mut System,
        mut callback: impl FnMut(usize, &DVector<f64>),
    ) -> Result<SolverResult, SolverError> {
        self.config.validate(&self.method)?;
        let config = &self.config;
        let convergence = &config.convergence;

        let stencil = Stencil::new(system.ns());
        let b = stencil.rhs();
        let pinned = system.pinned_cells();
        let mut sweeper = self.build_sweep(&stencil, &b)?;
        let mut x = self.initial_iterate(system, &pinned);

        debug!(
            "{}: {} unknowns, {} pinned, finished creating operator",
            sweeper.name(),
            x.len(),
            pinned.len()
        );

        reset_timing();
        let start = Instant::now();
        let mut history = Vec::new();
        let mut stop_reason = StopReason::IterationLimit;
        let mut final_measure = f64::NAN;
        let mut iterations = 0;

        for i in 0..config.max_iterations {
            let initial_norm = convergence.norm(&x);
            record_sweep(|| sweeper.sweep(&mut x, &pinned));
            pinned.apply(&mut x);
            let final_norm = convergence.norm(&x);

            if !final_norm.is_finite() {
                warn!(
                    "{}: non-finite norm at iteration {i} ({initial_norm} -> {final_norm})",
                    sweeper.name()
                );
                return Err(SolverError::NumericalFault {
                    iteration: i,
                    initial_norm,
                    final_norm,
                });
            }

            let measure = match convergence.criteria {
                ConvergenceCriteria::NormDelta => convergence.norm_delta(initial_norm, final_norm),
                ConvergenceCriteria::Residual => {
                    convergence.norm(&stencil.residual(&x, &b, pinned.mask()))
                }
            };
            log_iteration(sweeper.name(), i, config.max_iterations, measure, config.verbose);

            history.push(IterationRecord {
                iteration: i,
                initial_norm,
                final_norm,
                measure,
            });
            callback(i, &x);
            iterations = i + 1;
            final_measure = measure;

            if convergence.check_tolerance(measure) {
                stop_reason = StopReason::Converged;
                break;
            }
            if config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                stop_reason = StopReason::TimeLimit;
                break;
            }
        }

        finalize_and_print(start.elapsed());
        debug!(
            "{}: stopped after {iterations} sweeps ({stop_reason:?}), measure {final_measure:.3e}",
            sweeper.name()
        );

        system.set_flat_potentials(&x);
        Ok(SolverResult {
            method: self.method,
            iterations,
            final_measure,
            stop_reason,
            history,
        })
    }

    fn build_sweep(&self, stencil: &Stencil, b: &DVector<f64>) -> Result<Box<dyn Sweep>, SolverError> {
        let sweep: Box<dyn Sweep> = match self.config.operator {
            OperatorForm::Implicit => match self.method {
                RelaxationMethod::Jacobi => Box::new(JacobiSweep::new(stencil.clone(), b.clone())),
                RelaxationMethod::GaussSeidel => {
                    Box::new(GaussSeidelSweep::new(stencil.clone(), b.clone()))
                }
                RelaxationMethod::Sor { omega } => {
                    Box::new(SorSweep::new(stencil.clone(), b.clone(), omega))
                }
            },
            OperatorForm::Dense => {
                if stencil.len() > DENSE_WARN_UNKNOWNS {
                    warn!(
                        "dense operator for {} unknowns needs {} matrix entries",
                        stencil.len(),
                        stencil.len() * stencil.len()
                    );
                }
                let split = stencil.to_dense();
                match self.method {
                    RelaxationMethod::Jacobi => Box::new(DenseJacobi::new(&split, b)?),
                    RelaxationMethod::GaussSeidel => Box::new(DenseGaussSeidel::new(&split, b)?),
                    RelaxationMethod::Sor { omega } => {
                        Box::new(DenseSor::new(split, b.clone(), omega)?)
                    }
                }
            }
        };
        Ok(sweep)
    }

    fn initial_iterate(&self, system: &System, pinned: &PinnedCells) -> DVector<f64> {
        let n = system.grid().len();
        let mut x = match self.config.initial_guess {
            InitialGuess::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                DVector::from_fn(n, |_, _| rng.gen::<f64>())
            }
            InitialGuess::Current => system.flatten_potentials(),
        };
        pinned.apply(&mut x);
        x
    }
}

pub(crate) fn log_iteration(method: &str, i: usize, max_iter: usize, measure: f64, verbose: bool) {
    if verbose {
        info!("{method} {i:>5}/{max_iter} | diff {measure:>10.3e}");
    } else {
        trace!("{method} {i:>5}/{max_iter} | diff {measure:>10.3e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::shapes::Shape;
    use crate::physics::Region;

    fn point_system(ns: usize) -> System {
        let mut system = System::new(ns).unwrap();
        system
            .add(&Region::new(ns, 1.0, (0.5, 0.5), Shape::Point, false).unwrap())
            .unwrap();
        system
    }

    #[test]
    fn rejects_bad_parameters_before_touching_the_field() {
        let mut system = point_system(8);
        let before = system.potentials().clone();

        let bad = [
            (RelaxationMethod::Jacobi, RelaxationConfig::default().with_tolerance(-1.0)),
            (RelaxationMethod::Jacobi, RelaxationConfig::default().with_tolerance(f64::NAN)),
            (RelaxationMethod::GaussSeidel, RelaxationConfig::default().with_max_iterations(0)),
            (RelaxationMethod::Sor { omega: 0.0 }, RelaxationConfig::default()),
            (RelaxationMethod::Sor { omega: f64::INFINITY }, RelaxationConfig::default()),
        ];
        for (method, config) in bad {
            let err = RelaxationSolver::new(method, config).solve(&mut system).unwrap_err();
            assert!(matches!(err, SolverError::InvalidParameter { .. }), "{err}");
        }
        assert_eq!(system.potentials(), &before);
    }

    #[test]
    fn iteration_budget_is_respected() {
        let mut system = point_system(8);
        let config = RelaxationConfig::default()
            .with_tolerance(0.0)
            .with_max_iterations(7)
            .with_seed(1);
        let result = system.jacobi(&config).unwrap();
        assert_eq!(result.iterations, 7);
        assert_eq!(result.history.len(), 7);
        assert_eq!(result.stop_reason, StopReason::IterationLimit);
        assert!(!result.converged());
    }

    #[test]
    fn zero_time_limit_stops_after_one_sweep() {
        let mut system = point_system(8);
        let config = RelaxationConfig::default()
            .with_tolerance(0.0)
            .with_seed(1)
            .with_time_limit(Duration::ZERO);
        let result = system.sor(1.5, &config).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
    }

    #[test]
    fn seeded_solves_are_reproducible() {
        let config = RelaxationConfig::default().with_max_iterations(5).with_seed(42);
        let mut a = point_system(6);
        let mut b = point_system(6);
        a.gauss_seidel(&config).unwrap();
        b.gauss_seidel(&config).unwrap();
        assert_eq!(a.potentials(), b.potentials());
    }

    #[test]
    fn omega_of_two_or_more_is_only_a_warning() {
        let mut system = point_system(5);
        let config = RelaxationConfig::default().with_max_iterations(3).with_seed(3);
        assert!(system.sor(2.0, &config).is_ok());
    }

    #[test]
    fn divergence_is_reported_as_numerical_fault() {
        // omega far above 2 blows the iterate up until the norm overflows.
        let mut system = point_system(6);
        let before = system.potentials().clone();
        let config = RelaxationConfig::default()
            .with_tolerance(0.0)
            .with_max_iterations(100_000)
            .with_seed(9);
        let err = system.sor(50.0, &config).unwrap_err();
        match err {
            SolverError::NumericalFault { iteration, final_norm, .. } => {
                assert!(iteration > 0);
                assert!(!final_norm.is_finite());
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(system.potentials(), &before);
    }

    #[test]
    fn default_rule_stops_on_first_small_norm_change() {
        let mut system = point_system(12);
        let tol = 1e-6;
        let config = RelaxationConfig::default()
            .with_tolerance(tol)
            .with_max_iterations(10_000)
            .with_seed(4);
        assert_eq!(config.convergence.criteria, ConvergenceCriteria::NormDelta);

        let result = system.sor(1.5, &config).unwrap();
        assert_eq!(result.stop_reason, StopReason::Converged);
        assert_eq!(result.iterations, result.history.len());

        let (last, earlier) = result.history.split_last().unwrap();
        assert_eq!(last.measure, (last.initial_norm - last.final_norm).abs());
        assert!(last.measure < tol);
        assert_eq!(result.final_measure, last.measure);
        for record in earlier {
            assert_eq!(record.measure, (record.initial_norm - record.final_norm).abs());
            assert!(record.measure >= tol, "sweep {} already met the tolerance", record.iteration);
        }
    }

    #[test]
    fn residual_criterion_measures_free_cells_only() {
        let mut system = point_system(9);
        let config = RelaxationConfig::default()
            .with_criteria(ConvergenceCriteria::Residual)
            .with_tolerance(1e-9)
            .with_max_iterations(20_000)
            .with_seed(5);
        let result = system.sor(1.6, &config).unwrap();
        assert!(result.converged());
        assert!(result.final_measure < 1e-9);

        let stencil = Stencil::new(9);
        let pinned = system.pinned_cells();
        let r = stencil.residual(&system.flatten_potentials(), &stencil.rhs(), pinned.mask());
        assert!(r.norm() < 1e-9);
    }
}
