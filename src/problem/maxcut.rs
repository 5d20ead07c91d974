//! Weighted Max-Cut.
//!
//! Partition the nodes into two sets so that the total weight of
//! couplings crossing the partition is maximal. With marginals `p`, an
//! edge `(i, j)` is cut with probability `p_i + p_j - 2 p_i p_j`.

use super::types::{Problem, Sense};
use crate::instance::ProblemInstance;
use crate::scorer::round_marginals;

/// Max-Cut objective over the instance couplings. The diagonal is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCut;

impl Problem for MaxCut {
    fn name(&self) -> &str {
        "maxcut"
    }

    fn sense(&self) -> Sense {
        Sense::Maximize
    }

    fn expected_value(&self, instance: &ProblemInstance, marginals: &[f64]) -> f64 {
        let m = instance.matrix();
        let mut total = 0.0;
        for i in 0..m.dim() {
            let pi = marginals[i];
            for (j, w) in m.row(i) {
                if j > i {
                    let pj = marginals[j];
                    total += w * (pi + pj - 2.0 * pi * pj);
                }
            }
        }
        total
    }

    /// `g_i = Σ_j w_ij (1 - 2 p_j) = deg_i - 2 (J p)_i`
    fn expected_value_gradient(
        &self,
        instance: &ProblemInstance,
        marginals: &[f64],
        grad: &mut [f64],
    ) {
        let m = instance.matrix();
        m.mul_vec(marginals, grad);
        for (i, g) in grad.iter_mut().enumerate() {
            *g = m.degree(i) - 2.0 * *g;
        }
    }

    fn infer(&self, instance: &ProblemInstance, marginals: &[f64]) -> (Vec<u8>, f64) {
        let config = round_marginals(marginals);
        let value = cut_value(instance, &config);
        (config, value)
    }
}

/// Total weight of couplings whose endpoints lie on different sides.
pub fn cut_value(instance: &ProblemInstance, config: &[u8]) -> f64 {
    let m = instance.matrix();
    let mut total = 0.0;
    for i in 0..m.dim() {
        for (j, w) in m.row(i) {
            if j > i && config[i] != config[j] {
                total += w;
            }
        }
    }
    total
}
