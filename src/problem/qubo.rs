//! Quadratic unconstrained binary optimization.
//!
//! Minimizes `xᵀ J x + hᵀ x` over `x ∈ {0,1}^n`, where `J` is the
//! instance's symmetric coupling matrix (self-couplings on the diagonal
//! act as linear terms since `x_i² = x_i`) and `h` an optional bias.

use super::types::{Problem, Sense};
use crate::error::ConfigError;
use crate::instance::ProblemInstance;
use crate::scorer::round_marginals;

/// QUBO objective. An empty bias means `h = 0`.
#[derive(Debug, Clone, Default)]
pub struct Qubo {
    linear: Vec<f64>,
}

impl Qubo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the linear bias `h`; its length must match the instance.
    pub fn with_linear(mut self, linear: Vec<f64>) -> Self {
        self.linear = linear;
        self
    }

    fn bias(&self, i: usize) -> f64 {
        self.linear.get(i).copied().unwrap_or(0.0)
    }
}

impl Problem for Qubo {
    fn name(&self) -> &str {
        "qubo"
    }

    fn sense(&self) -> Sense {
        Sense::Minimize
    }

    fn validate(&self, instance: &ProblemInstance) -> Result<(), ConfigError> {
        if !self.linear.is_empty() && self.linear.len() != instance.num_nodes() {
            return Err(ConfigError::DimensionMismatch {
                expected: self.linear.len(),
                found: instance.num_nodes(),
            });
        }
        if self.linear.iter().any(|h| !h.is_finite()) {
            return Err(ConfigError::Problem("qubo bias must be finite".into()));
        }
        Ok(())
    }

    fn expected_value(&self, instance: &ProblemInstance, marginals: &[f64]) -> f64 {
        let m = instance.matrix();
        let mut total = 0.0;
        for i in 0..m.dim() {
            let pi = marginals[i];
            total += (m.diagonal(i) + self.bias(i)) * pi;
            total += pi * m.row(i).map(|(j, w)| w * marginals[j]).sum::<f64>();
        }
        total
    }

    /// `g_i = 2 (J p)_i + J_ii + h_i`
    fn expected_value_gradient(
        &self,
        instance: &ProblemInstance,
        marginals: &[f64],
        grad: &mut [f64],
    ) {
        let m = instance.matrix();
        m.mul_vec(marginals, grad);
        for (i, g) in grad.iter_mut().enumerate() {
            *g = 2.0 * *g + m.diagonal(i) + self.bias(i);
        }
    }

    fn infer(&self, instance: &ProblemInstance, marginals: &[f64]) -> (Vec<u8>, f64) {
        let config = round_marginals(marginals);
        let x: Vec<f64> = config.iter().map(|&b| b as f64).collect();
        let energy = self.expected_value(instance, &x);
        (config, energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::autograd::multilinear_gradient;
    use approx::assert_relative_eq;

    fn instance() -> ProblemInstance {
        // J_01 = 1, J_12 = -2, J_11 = -1
        ProblemInstance::from_couplings(3, &[(0, 1, 1.0), (1, 2, -2.0), (1, 1, -1.0)]).unwrap()
    }

    #[test]
    fn test_energy_of_configurations() {
        let inst = instance();
        let q = Qubo::new().with_linear(vec![0.5, 0.0, 1.0]);
        let (_, e) = q.infer(&inst, &[1.0, 1.0, 1.0]);
        // xᵀJx = 2(1) + 2(-2) + (-1) = -3, plus h = 1.5
        assert_relative_eq!(e, -1.5);
        let (_, e) = q.infer(&inst, &[0.0, 1.0, 1.0]);
        // 2(-2) - 1 + 1 = -4
        assert_relative_eq!(e, -4.0);
    }

    #[test]
    fn test_manual_gradient_matches_derived() {
        let inst = instance();
        let q = Qubo::new().with_linear(vec![0.5, -0.25, 1.0]);
        let p = [0.2, 0.6, 0.9];
        let mut manual = vec![0.0; 3];
        let mut derived = vec![0.0; 3];
        q.expected_value_gradient(&inst, &p, &mut manual);
        multilinear_gradient(&q, &inst, &p, &mut derived);
        for (a, b) in manual.iter().zip(&derived) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bias_dimension_checked() {
        let inst = instance();
        let q = Qubo::new().with_linear(vec![1.0]);
        assert_eq!(
            q.validate(&inst),
            Err(ConfigError::DimensionMismatch {
                expected: 1,
                found: 3
            })
        );
        assert!(Qubo::new().validate(&inst).is_ok());
    }
}
