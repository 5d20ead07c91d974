//! Free-energy gradient providers.
//!
//! Each trial descends the mean-field free energy
//!
//! ```text
//! F(p) = s · E[score](p) - S(p) / beta
//! S(p) = -Σ_i [p_i ln p_i + (1 - p_i) ln(1 - p_i)]
//! ```
//!
//! with `s = -1` for maximization and `+1` for minimization, so
//!
//! ```text
//! ∂F/∂p_i = s · ∂E[score]/∂p_i + ln(p_i / (1 - p_i)) / beta
//! ```

use crate::instance::ProblemInstance;
use crate::problem::autograd::multilinear_gradient;
use crate::problem::Problem;
use std::fmt;
use std::str::FromStr;

/// Marginals are clamped to `[ENTROPY_EPS, 1 - ENTROPY_EPS]` inside the
/// entropy term so its logarithms stay finite at the clip boundaries.
pub const ENTROPY_EPS: f64 = 1e-12;

/// Which gradient of the expected score the solver uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GradientMode {
    /// The problem's closed-form [`Problem::expected_value_gradient`].
    #[default]
    Manual,

    /// Derived from [`Problem::expected_value`] alone.
    Automatic,
}

impl fmt::Display for GradientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GradientMode::Manual => "manual",
            GradientMode::Automatic => "automatic",
        })
    }
}

impl FromStr for GradientMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(GradientMode::Manual),
            "automatic" | "auto" => Ok(GradientMode::Automatic),
            other => Err(format!("unknown gradient mode `{other}` (expected manual or automatic)")),
        }
    }
}

/// Mean-field entropy `S(p)` in nats.
pub fn entropy(marginals: &[f64]) -> f64 {
    marginals
        .iter()
        .map(|&p| {
            let p = p.clamp(ENTROPY_EPS, 1.0 - ENTROPY_EPS);
            -(p * p.ln() + (1.0 - p) * (1.0 - p).ln())
        })
        .sum()
}

/// Free energy `F(p)` at inverse temperature `beta`.
pub fn free_energy<P: Problem + ?Sized>(
    problem: &P,
    instance: &ProblemInstance,
    marginals: &[f64],
    beta: f64,
) -> f64 {
    problem.sense().energy_sign() * problem.expected_value(instance, marginals)
        - entropy(marginals) / beta
}

/// Computes `∂F/∂p` for one trial.
///
/// Holds the scratch buffer used for discretized gradient input so the
/// hot loop does not allocate.
#[derive(Debug, Clone)]
pub(crate) struct GradientProvider {
    mode: GradientMode,
    /// First step whose score gradient sees rounded marginals.
    discretize_from: Option<usize>,
    rounded: Vec<f64>,
}

impl GradientProvider {
    pub(crate) fn new(mode: GradientMode, discretize_from: Option<usize>, n: usize) -> Self {
        Self {
            mode,
            discretize_from,
            rounded: if discretize_from.is_some() {
                vec![0.0; n]
            } else {
                Vec::new()
            },
        }
    }

    /// Whether step `step` evaluates the score part at rounded marginals.
    pub(crate) fn rounds_at(&self, step: usize) -> bool {
        self.discretize_from.is_some_and(|from| step >= from)
    }

    /// Writes `∂F/∂p` at `marginals` into `grad` for annealing step `step`.
    ///
    /// Once discretization is engaged, the score part is evaluated at the
    /// rounded marginals and only the entropy part sees the continuous
    /// values. Earlier steps use the continuous marginals throughout.
    pub(crate) fn free_energy_gradient<P: Problem + ?Sized>(
        &mut self,
        problem: &P,
        instance: &ProblemInstance,
        marginals: &[f64],
        beta: f64,
        step: usize,
        grad: &mut [f64],
    ) {
        let input: &[f64] = if self.rounds_at(step) {
            for (r, &p) in self.rounded.iter_mut().zip(marginals) {
                *r = if p > 0.5 { 1.0 } else { 0.0 };
            }
            &self.rounded
        } else {
            marginals
        };

        match self.mode {
            GradientMode::Manual => problem.expected_value_gradient(instance, input, grad),
            GradientMode::Automatic => multilinear_gradient(problem, instance, input, grad),
        }

        let sign = problem.sense().energy_sign();
        for (g, &p) in grad.iter_mut().zip(marginals) {
            let p = p.clamp(ENTROPY_EPS, 1.0 - ENTROPY_EPS);
            *g = sign * *g + (p / (1.0 - p)).ln() / beta;
        }
    }
}
