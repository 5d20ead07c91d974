//! Gradient derived from an expected-value function alone.
//!
//! For independent Bernoulli variables the expectation of any function
//! of `x` is affine in each `p_i` separately, so
//!
//! ```text
//! ∂E/∂p_i = E(p | p_i = 1) - E(p | p_i = 0)
//! ```
//!
//! holds exactly. This lets user-supplied objectives run without writing
//! a derivative, at the cost of `2n` objective evaluations per gradient.

use super::types::Problem;
use crate::instance::ProblemInstance;

/// Writes the gradient of `problem.expected_value` at `marginals` into `grad`.
pub fn multilinear_gradient<P: Problem + ?Sized>(
    problem: &P,
    instance: &ProblemInstance,
    marginals: &[f64],
    grad: &mut [f64],
) {
    debug_assert_eq!(marginals.len(), grad.len());
    let mut probe = marginals.to_vec();
    for (i, g) in grad.iter_mut().enumerate() {
        let original = probe[i];
        probe[i] = 1.0;
        let high = problem.expected_value(instance, &probe);
        probe[i] = 0.0;
        let low = problem.expected_value(instance, &probe);
        probe[i] = original;
        *g = high - low;
    }
}
