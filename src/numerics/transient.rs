use log::info;
use nalgebra::DMatrix;

use crate::numerics::solver::{RelaxationSolver, SolverError};
use crate::physics::System;

/// Records the field after each sweep, for animations of the relaxation.
///
/// Exactly `frames` sweeps are run: the tolerance is forced to zero and any
/// time limit is dropped, so neither stopping rule fires early.
pub struct FrameRecorder {
    pub frames: usize,
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self { frames: 100 }
    }
}

impl FrameRecorder {
    pub fn new(frames: usize) -> Self {
        Self { frames }
    }

    pub fn record(
        &self,
        solver: &RelaxationSolver,
        system: &mut System,
    ) -> Result<Vec<DMatrix<f64>>, SolverError> {
        let mut config = solver.config.clone();
        config.convergence.tolerance = 0.0;
        config.max_iterations = self.frames;
        config.time_limit = None;
        let recording = RelaxationSolver::new(solver.method, config);

        let ns = system.ns();
        let mut frames = Vec::with_capacity(self.frames);
        info!(
            "Recording {} frames of {} on a {ns}x{ns} grid",
            self.frames,
            solver.method.name()
        );
        recording.solve_with_callback(system, |_, x| {
            frames.push(DMatrix::from_row_slice(ns, ns, x.as_slice()));
        })?;
        Ok(frames)
    }
}
