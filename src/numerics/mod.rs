pub mod dense;
pub mod relaxation;
pub mod solver;
pub mod timing;
pub mod transient;

use nalgebra::DVector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConvergenceMetric {
    #[default]
    L2Norm,
    MaxNorm,
}

/// Stopping rule for the relaxation loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConvergenceCriteria {
    /// Stop when the norm of the iterate changes by less than the tolerance
    /// over one sweep. Cheap, but a plateauing norm can hide cells that are
    /// still moving.
    #[default]
    NormDelta,
    /// Stop when the norm of `b - A x` over free cells drops below the
    /// tolerance.
    Residual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Convergence {
    pub criteria: ConvergenceCriteria,
    pub tolerance: f64,
    pub metric: ConvergenceMetric,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            criteria: ConvergenceCriteria::NormDelta,
            tolerance: 1e-3,
            metric: ConvergenceMetric::L2Norm,
        }
    }
}

impl Convergence {
    pub fn norm(&self, vector: &DVector<f64>) -> f64 {
        match self.metric {
            ConvergenceMetric::L2Norm => vector.norm(),
            ConvergenceMetric::MaxNorm => vector.amax(),
        }
    }

    /// Absolute change between the norms before and after a sweep.
    pub fn norm_delta(&self, initial_norm: f64, final_norm: f64) -> f64 {
        (initial_norm - final_norm).abs()
    }

    pub fn check_tolerance(&self, value: f64) -> bool {
        value < self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics() {
        let v = DVector::from_vec(vec![3.0, -4.0]);
        let l2 = Convergence::default();
        let max = Convergence {
            metric: ConvergenceMetric::MaxNorm,
            ..Convergence::default()
        };
        assert_eq!(l2.norm(&v), 5.0);
        assert_eq!(max.norm(&v), 4.0);
    }

    #[test]
    fn tolerance_is_strict() {
        let conv = Convergence {
            tolerance: 0.5,
            ..Convergence::default()
        };
        assert!(conv.check_tolerance(0.4));
        assert!(!conv.check_tolerance(0.5));
        assert_eq!(conv.norm_delta(2.0, 2.75), 0.75);
    }
}
