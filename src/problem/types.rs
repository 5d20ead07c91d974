//! Core trait for relaxed binary objectives.

use super::autograd::multilinear_gradient;
use crate::error::ConfigError;
use crate::instance::ProblemInstance;

/// Optimization direction of a problem's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    Maximize,
    Minimize,
}

impl Sense {
    /// Sign that turns a score into an energy to be minimized.
    pub fn energy_sign(self) -> f64 {
        match self {
            Sense::Maximize => -1.0,
            Sense::Minimize => 1.0,
        }
    }

    /// Whether `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Sense::Maximize => a > b,
            Sense::Minimize => a < b,
        }
    }

    /// The worst possible score in this direction.
    pub fn worst(self) -> f64 {
        match self {
            Sense::Maximize => f64::NEG_INFINITY,
            Sense::Minimize => f64::INFINITY,
        }
    }
}

/// A binary quadratic problem the relaxation solver can optimize.
///
/// Implementors supply the two capabilities the solver needs:
///
/// 1. **Expected value**: the score under independent Bernoulli
///    variables with the given marginals.
/// 2. **Inference**: map marginals to a binary configuration and its
///    exact score.
///
/// A closed-form gradient of the expected value is optional. The
/// default derives it from [`expected_value`](Problem::expected_value)
/// alone, which is exact whenever the expected value is multilinear
/// (true for any expectation over independent binary variables).
///
/// # Examples
///
/// ```
/// use u_fem::instance::ProblemInstance;
/// use u_fem::problem::{Problem, Sense};
///
/// /// Pick as many nodes as possible (trivial objective).
/// struct CountOnes;
///
/// impl Problem for CountOnes {
///     fn sense(&self) -> Sense {
///         Sense::Maximize
///     }
///
///     fn expected_value(&self, _: &ProblemInstance, p: &[f64]) -> f64 {
///         p.iter().sum()
///     }
///
///     fn infer(&self, _: &ProblemInstance, p: &[f64]) -> (Vec<u8>, f64) {
///         let x: Vec<u8> = p.iter().map(|&v| u8::from(v > 0.5)).collect();
///         let score = x.iter().map(|&b| b as f64).sum();
///         (x, score)
///     }
/// }
///
/// let inst = ProblemInstance::from_edges(3, &[]).unwrap();
/// let mut grad = vec![0.0; 3];
/// CountOnes.expected_value_gradient(&inst, &[0.2, 0.5, 0.9], &mut grad);
/// assert_eq!(grad, vec![1.0, 1.0, 1.0]);
/// ```
pub trait Problem: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Whether larger or smaller scores are better.
    fn sense(&self) -> Sense;

    /// Checks that the problem fits `instance` before solving.
    fn validate(&self, _instance: &ProblemInstance) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Expected score for independent marginals `p ∈ [0,1]^n`.
    fn expected_value(&self, instance: &ProblemInstance, marginals: &[f64]) -> f64;

    /// Writes `∂ expected_value / ∂ p_i` into `grad`.
    fn expected_value_gradient(
        &self,
        instance: &ProblemInstance,
        marginals: &[f64],
        grad: &mut [f64],
    ) {
        multilinear_gradient(self, instance, marginals, grad);
    }

    /// Discretizes marginals into a binary configuration and its score.
    fn infer(&self, instance: &ProblemInstance, marginals: &[f64]) -> (Vec<u8>, f64);
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sense(&self) -> Sense {
        (**self).sense()
    }

    fn validate(&self, instance: &ProblemInstance) -> Result<(), ConfigError> {
        (**self).validate(instance)
    }

    fn expected_value(&self, instance: &ProblemInstance, marginals: &[f64]) -> f64 {
        (**self).expected_value(instance, marginals)
    }

    fn expected_value_gradient(
        &self,
        instance: &ProblemInstance,
        marginals: &[f64],
        grad: &mut [f64],
    ) {
        (**self).expected_value_gradient(instance, marginals, grad)
    }

    fn infer(&self, instance: &ProblemInstance, marginals: &[f64]) -> (Vec<u8>, f64) {
        (**self).infer(instance, marginals)
    }
}
