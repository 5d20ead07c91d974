//! Relaxation solve loop.
//!
//! [`FemRunner`] orchestrates a complete solve:
//! initialization → annealed free-energy descent per trial →
//! discretization → reduction across trials.

use super::config::SolverConfig;
use super::gradient::GradientProvider;
use super::optimizer::OptimizerState;
use super::types::{DivergedTrial, FemResult, TrialResult};
use crate::error::{Error, InferenceError, NumericalError, Result};
use crate::instance::ProblemInstance;
use crate::problem::{Problem, Sense};
use crate::scorer::{discretize, reduce, Discretized};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One trial's private state during a solve.
struct Trial {
    index: usize,
    marginals: Vec<f64>,
    steps: usize,
    history: Vec<f64>,
    cancelled: bool,
    error: Option<NumericalError>,
    invalid: Option<InferenceError>,
    discretized: Option<Discretized>,
}

impl Trial {
    /// Marginals start at `0.5 + noise * u`, `u ~ U(-1, 1)`.
    fn new(index: usize, seed: u64, n: usize, noise: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let marginals = (0..n)
            .map(|_| 0.5 + noise * rng.random_range(-1.0f64..1.0))
            .collect();
        Self {
            index,
            marginals,
            steps: 0,
            history: Vec::new(),
            cancelled: false,
            error: None,
            invalid: None,
            discretized: None,
        }
    }
}

/// Executes the free-energy relaxation solver.
///
/// # Usage
///
/// ```
/// use u_fem::fem::{FemRunner, SolverConfig};
/// use u_fem::instance::ProblemInstance;
/// use u_fem::problem::MaxCut;
///
/// let square = ProblemInstance::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
/// let config = SolverConfig::fast().with_num_trials(16).with_seed(42);
/// let result = FemRunner::run(&MaxCut, &square, &config).unwrap();
/// assert_eq!(result.best_score, 4.0);
/// ```
pub struct FemRunner;

impl FemRunner {
    /// Runs the solver.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`](crate::error::ConfigError) if the configuration
    ///   or the problem/instance pairing is invalid
    /// - [`NumericalError::AllTrialsDiverged`] if no trial survives
    /// - [`NumericalError::NoFiniteScore`] if every surviving trial scores
    ///   NaN or infinity
    /// - [`Error::Inference`] if the problem's inference returns a
    ///   configuration of the wrong length or with non-binary entries
    pub fn run<P: Problem + ?Sized>(
        problem: &P,
        instance: &ProblemInstance,
        config: &SolverConfig,
    ) -> Result<FemResult> {
        Self::run_with_cancel(problem, instance, config, None)
    }

    /// Runs the solver with an optional cancellation token.
    ///
    /// Trials check the flag before every step. Once it is set they stop,
    /// and their current marginals are discretized as usual.
    pub fn run_with_cancel<P: Problem + ?Sized>(
        problem: &P,
        instance: &ProblemInstance,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FemResult> {
        config.validate()?;
        problem.validate(instance)?;

        let n = instance.num_nodes();
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(
            "fem: {} on {} nodes / {} couplings, {} trials x {} steps, beta {}..{} ({}), {} gradient, discretize from step {:?}, seed={}",
            problem.name(),
            n,
            instance.num_couplings(),
            config.num_trials,
            config.num_steps,
            config.beta_min,
            config.beta_max,
            config.schedule,
            config.gradient,
            config.discretize_start(),
            seed,
        );

        // Per-trial seeds keep results independent of thread scheduling.
        let mut master = StdRng::seed_from_u64(seed);
        let mut trials: Vec<Trial> = (0..config.num_trials)
            .map(|index| Trial::new(index, master.random(), n, config.init_noise))
            .collect();

        let betas = config
            .schedule
            .betas(config.num_steps, config.beta_min, config.beta_max);
        let flag = cancel.as_deref();

        execute(&mut trials, config, |trial: &mut Trial| {
            run_trial(problem, instance, config, &betas, flag, trial)
        });

        collect(problem.sense(), problem.name(), config, trials)
    }
}

/// Runs every trial, on rayon when enabled.
#[cfg(feature = "parallel")]
fn execute<F>(trials: &mut [Trial], config: &SolverConfig, work: F)
where
    F: Fn(&mut Trial) + Send + Sync,
{
    if !config.parallel {
        trials.iter_mut().for_each(work);
        return;
    }

    match config.threads {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| trials.par_iter_mut().for_each(&work)),
            Err(e) => {
                warn!("fem: cannot build a {threads}-thread pool ({e}); using the global pool");
                trials.par_iter_mut().for_each(&work);
            }
        },
        None => trials.par_iter_mut().for_each(&work),
    }
}

#[cfg(not(feature = "parallel"))]
fn execute<F>(trials: &mut [Trial], config: &SolverConfig, work: F)
where
    F: Fn(&mut Trial),
{
    if config.parallel {
        debug!("fem: built without the `parallel` feature; running trials sequentially");
    }
    trials.iter_mut().for_each(work);
}

/// Anneals one trial through the whole schedule, then discretizes it.
fn run_trial<P: Problem + ?Sized>(
    problem: &P,
    instance: &ProblemInstance,
    config: &SolverConfig,
    betas: &[f64],
    cancel: Option<&AtomicBool>,
    trial: &mut Trial,
) {
    let n = trial.marginals.len();
    let mut optimizer = OptimizerState::new(config.optimizer, config.learning_rate, n);
    let mut provider = GradientProvider::new(config.gradient, config.discretize_start(), n);
    let mut grad = vec![0.0; n];

    for (step, &beta) in betas.iter().enumerate() {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                trial.cancelled = true;
                break;
            }
        }

        provider.free_energy_gradient(problem, instance, &trial.marginals, beta, step, &mut grad);
        if grad.iter().any(|g| !g.is_finite()) {
            trial.error = Some(NumericalError::NonFiniteGradient {
                trial: trial.index,
                step,
            });
            return;
        }

        optimizer.step(&mut trial.marginals, &grad);
        if trial.marginals.iter().any(|p| !p.is_finite()) {
            trial.error = Some(NumericalError::NonFiniteMarginal {
                trial: trial.index,
                step,
            });
            return;
        }
        for p in trial.marginals.iter_mut() {
            *p = p.clamp(0.0, 1.0);
        }
        trial.steps = step + 1;

        if config.history_interval > 0 && trial.steps % config.history_interval == 0 {
            trial
                .history
                .push(problem.expected_value(instance, &trial.marginals));
        }
    }

    match discretize(problem, instance, &trial.marginals) {
        Ok(d) => trial.discretized = Some(d),
        Err(e) => trial.invalid = Some(e),
    }
}

/// Barrier: drops diverged trials and reduces the rest.
///
/// Malformed inference output fails the whole solve at the lowest
/// offending trial index.
fn collect(
    sense: Sense,
    name: &str,
    config: &SolverConfig,
    trials: Vec<Trial>,
) -> Result<FemResult> {
    let cancelled = trials.iter().any(|t| t.cancelled);
    let mut diverged = Vec::new();
    let mut histories = Vec::new();
    let mut results = Vec::with_capacity(trials.len());
    let mut steps = 0;

    for trial in trials {
        if let Some(source) = trial.invalid {
            return Err(Error::Inference {
                trial: trial.index,
                source,
            });
        }
        if let Some(error) = trial.error {
            warn!("fem: {error}; trial excluded from results");
            diverged.push(DivergedTrial {
                trial: trial.index,
                error,
            });
            continue;
        }
        let Some(d) = trial.discretized else {
            continue;
        };
        steps = steps.max(trial.steps);
        histories.push(trial.history);
        results.push(TrialResult {
            trial: trial.index,
            marginals: trial.marginals,
            configuration: d.configuration,
            score: d.score,
        });
    }

    if results.is_empty() {
        return Err(NumericalError::AllTrialsDiverged {
            trials: config.num_trials,
        }
        .into());
    }

    let Some(best) = reduce(
        sense,
        results.iter().map(|t| (t.configuration.as_slice(), t.score)),
    ) else {
        return Err(NumericalError::NoFiniteScore {
            trials: results.len(),
        }
        .into());
    };

    info!(
        "fem: {name} best score {} reached by {} of {} trials ({} distinct, {} diverged{})",
        best.score,
        best.trials.len(),
        results.len(),
        best.configurations.len(),
        diverged.len(),
        if cancelled { ", cancelled" } else { "" },
    );

    Ok(FemResult {
        trials: results,
        best_score: best.score,
        best_configurations: best.configurations,
        diverged,
        steps,
        cancelled,
        score_history: merge_history(sense, &histories),
    })
}

/// Best value across trials at each checkpoint.
fn merge_history(sense: Sense, histories: &[Vec<f64>]) -> Vec<f64> {
    let len = histories.iter().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|k| {
            histories
                .iter()
                .filter_map(|h| h.get(k).copied())
                .fold(sense.worst(), |best, v| {
                    if sense.is_better(v, best) {
                        v
                    } else {
                        best
                    }
                })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
