//! Solve results.

use crate::error::NumericalError;

/// Final state of one surviving trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialResult {
    /// Trial index in `0..num_trials`.
    pub trial: usize,

    /// Final marginals in `[0, 1]^n`.
    pub marginals: Vec<f64>,

    /// Discretized configuration (entries in `{0, 1}`).
    pub configuration: Vec<u8>,

    /// Exact score of `configuration`.
    pub score: f64,
}

/// A trial aborted by a numerical failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergedTrial {
    pub trial: usize,
    pub error: NumericalError,
}

/// Result of a relaxation solve.
#[derive(Debug, Clone, PartialEq)]
pub struct FemResult {
    /// Surviving trials in trial order.
    pub trials: Vec<TrialResult>,

    /// Best score over the surviving trials.
    pub best_score: f64,

    /// Distinct configurations achieving `best_score`.
    pub best_configurations: Vec<Vec<u8>>,

    /// Trials excluded after a numerical failure.
    pub diverged: Vec<DivergedTrial>,

    /// Annealing steps executed (the longest surviving trajectory).
    pub steps: usize,

    /// Whether the solve was cancelled externally.
    pub cancelled: bool,

    /// Best expected score across trials at each history checkpoint.
    pub score_history: Vec<f64>,
}

impl FemResult {
    /// The first optimal configuration.
    pub fn best_configuration(&self) -> &[u8] {
        self.best_configurations
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of trials reaching the best score.
    pub fn best_count(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| crate::scorer::scores_tie(t.score, self.best_score))
            .count()
    }
}
