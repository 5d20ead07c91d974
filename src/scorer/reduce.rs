//! Best-score reduction across trials.

use crate::problem::Sense;
use std::collections::HashSet;

/// The best score over all trials and the distinct configurations reaching it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestSet {
    pub score: f64,
    /// Distinct optimal configurations, in order of the first trial reaching each.
    pub configurations: Vec<Vec<u8>>,
    /// Indices (into the input) of every trial reaching the best score.
    pub trials: Vec<usize>,
}

/// Whether two scores are equal within a relative tolerance of `1e-9`.
pub fn scores_tie(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Reduces `(configuration, score)` pairs to the best set.
///
/// Returns `None` for an empty input. Non-finite scores never win.
pub fn reduce<'a, I>(sense: Sense, items: I) -> Option<BestSet>
where
    I: IntoIterator<Item = (&'a [u8], f64)>,
    I::IntoIter: Clone,
{
    let items = items.into_iter();

    let best = items
        .clone()
        .map(|(_, score)| score)
        .filter(|s| s.is_finite())
        .fold(None, |acc: Option<f64>, s| match acc {
            Some(b) if !sense.is_better(s, b) => Some(b),
            _ => Some(s),
        })?;

    let mut seen: HashSet<&[u8]> = HashSet::new();
    let mut configurations = Vec::new();
    let mut trials = Vec::new();
    for (idx, (config, score)) in items.enumerate() {
        if score.is_finite() && scores_tie(score, best) {
            trials.push(idx);
            if seen.insert(config) {
                configurations.push(config.to_vec());
            }
        }
    }

    Some(BestSet {
        score: best,
        configurations,
        trials,
    })
}
