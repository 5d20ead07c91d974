//! Closure-backed problems.

use super::autograd::multilinear_gradient;
use super::types::{Problem, Sense};
use crate::instance::ProblemInstance;

type ExpectedValueFn = dyn Fn(&ProblemInstance, &[f64]) -> f64 + Send + Sync;
type GradientFn = dyn Fn(&ProblemInstance, &[f64], &mut [f64]) + Send + Sync;
type InferFn = dyn Fn(&ProblemInstance, &[f64]) -> (Vec<u8>, f64) + Send + Sync;

/// A [`Problem`] assembled from an expected-value function and an
/// inference function, with an optional closed-form gradient.
///
/// # Examples
///
/// ```
/// use u_fem::instance::ProblemInstance;
/// use u_fem::problem::{CustomProblem, Problem, Sense};
///
/// // Vertex cover size with a penalty for uncovered edges (minimize).
/// let cover = CustomProblem::new(
///     "vertex-cover",
///     Sense::Minimize,
///     |inst: &ProblemInstance, p: &[f64]| {
///         let uncovered: f64 = inst
///             .couplings()
///             .iter()
///             .map(|c| (1.0 - p[c.i]) * (1.0 - p[c.j]))
///             .sum();
///         p.iter().sum::<f64>() + 2.0 * uncovered
///     },
///     |inst: &ProblemInstance, p: &[f64]| {
///         let mut x: Vec<u8> = p.iter().map(|&v| u8::from(v > 0.5)).collect();
///         for c in inst.couplings() {
///             if x[c.i] == 0 && x[c.j] == 0 {
///                 x[c.i] = 1;
///             }
///         }
///         let size = x.iter().map(|&b| b as f64).sum();
///         (x, size)
///     },
/// );
///
/// let inst = ProblemInstance::from_edges(2, &[(0, 1)]).unwrap();
/// assert_eq!(cover.name(), "vertex-cover");
/// assert_eq!(cover.infer(&inst, &[0.1, 0.2]).1, 1.0);
/// ```
pub struct CustomProblem {
    name: String,
    sense: Sense,
    expected_value: Box<ExpectedValueFn>,
    gradient: Option<Box<GradientFn>>,
    infer: Box<InferFn>,
}

impl CustomProblem {
    pub fn new<E, I>(name: impl Into<String>, sense: Sense, expected_value: E, infer: I) -> Self
    where
        E: Fn(&ProblemInstance, &[f64]) -> f64 + Send + Sync + 'static,
        I: Fn(&ProblemInstance, &[f64]) -> (Vec<u8>, f64) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            sense,
            expected_value: Box::new(expected_value),
            gradient: None,
            infer: Box::new(infer),
        }
    }

    /// Supplies a closed-form gradient of the expected value.
    pub fn with_gradient<G>(mut self, gradient: G) -> Self
    where
        G: Fn(&ProblemInstance, &[f64], &mut [f64]) + Send + Sync + 'static,
    {
        self.gradient = Some(Box::new(gradient));
        self
    }
}

impl std::fmt::Debug for CustomProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomProblem")
            .field("name", &self.name)
            .field("sense", &self.sense)
            .field("closed_form_gradient", &self.gradient.is_some())
            .finish()
    }
}

impl Problem for CustomProblem {
    fn name(&self) -> &str {
        &self.name
    }

    fn sense(&self) -> Sense {
        self.sense
    }

    fn expected_value(&self, instance: &ProblemInstance, marginals: &[f64]) -> f64 {
        (self.expected_value)(instance, marginals)
    }

    fn expected_value_gradient(
        &self,
        instance: &ProblemInstance,
        marginals: &[f64],
        grad: &mut [f64],
    ) {
        match &self.gradient {
            Some(gradient) => gradient(instance, marginals, grad),
            None => multilinear_gradient(self, instance, marginals, grad),
        }
    }

    fn infer(&self, instance: &ProblemInstance, marginals: &[f64]) -> (Vec<u8>, f64) {
        (self.infer)(instance, marginals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones() -> CustomProblem {
        CustomProblem::new(
            "ones",
            Sense::Maximize,
            |_: &ProblemInstance, p: &[f64]| p.iter().map(|v| 2.0 * v).sum(),
            |_: &ProblemInstance, p: &[f64]| (vec![1; p.len()], p.len() as f64),
        )
    }

    #[test]
    fn test_derived_gradient_without_closure() {
        let inst = ProblemInstance::from_edges(2, &[]).unwrap();
        let mut grad = vec![0.0; 2];
        ones().expected_value_gradient(&inst, &[0.3, 0.4], &mut grad);
        assert_eq!(grad, vec![2.0, 2.0]);
    }

    #[test]
    fn test_supplied_gradient_is_used() {
        let inst = ProblemInstance::from_edges(2, &[]).unwrap();
        let problem = ones().with_gradient(|_, _, g: &mut [f64]| g.fill(7.0));
        let mut grad = vec![0.0; 2];
        problem.expected_value_gradient(&inst, &[0.3, 0.4], &mut grad);
        assert_eq!(grad, vec![7.0, 7.0]);
        assert!(format!("{problem:?}").contains("closed_form_gradient: true"));
    }
}
