//! Discretization and cross-trial reduction.
//!
//! After the relaxation phase every surviving trial is discretized with
//! the problem's inference function ([`discretize`]); [`reduce`] then
//! finds the best score and the distinct configurations achieving it.

mod reduce;

pub use reduce::{reduce, scores_tie, BestSet};

use crate::error::InferenceError;
use crate::instance::ProblemInstance;
use crate::problem::Problem;

/// Rounds marginals to a binary configuration (`p > 0.5 → 1`).
pub fn round_marginals(marginals: &[f64]) -> Vec<u8> {
    marginals.iter().map(|&p| u8::from(p > 0.5)).collect()
}

/// A discretized trial: binary configuration plus its exact score.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretized {
    pub configuration: Vec<u8>,
    pub score: f64,
}

/// Runs the problem's inference on final marginals.
///
/// # Errors
///
/// [`InferenceError`] if the configuration does not have one entry per
/// node or holds anything other than 0 and 1.
pub fn discretize<P: Problem + ?Sized>(
    problem: &P,
    instance: &ProblemInstance,
    marginals: &[f64],
) -> Result<Discretized, InferenceError> {
    let (configuration, score) = problem.infer(instance, marginals);
    if configuration.len() != instance.num_nodes() {
        return Err(InferenceError::WrongLength {
            expected: instance.num_nodes(),
            found: configuration.len(),
        });
    }
    if let Some((index, &value)) = configuration.iter().enumerate().find(|&(_, &b)| b > 1) {
        return Err(InferenceError::NonBinary { index, value });
    }
    Ok(Discretized {
        configuration,
        score,
    })
}
