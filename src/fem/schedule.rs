//! Inverse-temperature annealing schedules.

use std::fmt;
use std::str::FromStr;

/// How `beta` moves from `beta_min` to `beta_max` over the run.
///
/// All schedules start exactly at `beta_min` on step 0 and end exactly at
/// `beta_max` on the last step. A single-step run uses `beta_max`.
///
/// # References
///
/// - Linear / Geometric: standard annealing textbook schedules
/// - Inverse: temperature `1/beta` decreases linearly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnnealingSchedule {
    /// `beta_k = beta_min + k/(N-1) * (beta_max - beta_min)`.
    Linear,

    /// `beta_k = beta_min * (beta_max / beta_min)^(k/(N-1))`.
    ///
    /// Spends equal time per order of magnitude of `beta`.
    #[default]
    Geometric,

    /// `1/beta_k = 1/beta_min + k/(N-1) * (1/beta_max - 1/beta_min)`.
    Inverse,
}

impl AnnealingSchedule {
    /// Inverse temperature at `step` of `num_steps`.
    pub fn beta_at(self, step: usize, num_steps: usize, beta_min: f64, beta_max: f64) -> f64 {
        if num_steps <= 1 {
            return beta_max;
        }
        let t = step.min(num_steps - 1) as f64 / (num_steps - 1) as f64;
        match self {
            AnnealingSchedule::Linear => beta_min + t * (beta_max - beta_min),
            AnnealingSchedule::Geometric => beta_min * (beta_max / beta_min).powf(t),
            AnnealingSchedule::Inverse => {
                let inv = 1.0 / beta_min + t * (1.0 / beta_max - 1.0 / beta_min);
                1.0 / inv
            }
        }
    }

    /// The full schedule for a run.
    pub fn betas(self, num_steps: usize, beta_min: f64, beta_max: f64) -> Vec<f64> {
        (0..num_steps)
            .map(|k| self.beta_at(k, num_steps, beta_min, beta_max))
            .collect()
    }
}

impl fmt::Display for AnnealingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnealingSchedule::Linear => "linear",
            AnnealingSchedule::Geometric => "geometric",
            AnnealingSchedule::Inverse => "inverse",
        };
        f.write_str(name)
    }
}

impl FromStr for AnnealingSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(AnnealingSchedule::Linear),
            "geometric" | "exp" => Ok(AnnealingSchedule::Geometric),
            "inverse" => Ok(AnnealingSchedule::Inverse),
            other => Err(format!(
                "unknown schedule `{other}` (expected linear, geometric or inverse)"
            )),
        }
    }
}
