//! Solver configuration.
//!
//! [`SolverConfig`] holds every hyperparameter of a relaxation run. It is
//! validated before the first iteration and never changes during a solve.

use super::gradient::GradientMode;
use super::optimizer::OptimizerKind;
use super::schedule::AnnealingSchedule;
use crate::error::ConfigError;

/// Configuration for the free-energy relaxation solver.
///
/// # Defaults
///
/// ```
/// use u_fem::fem::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.num_trials, 100);
/// assert_eq!(config.num_steps, 1000);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_fem::fem::{AnnealingSchedule, GradientMode, OptimizerKind, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_num_trials(500)
///     .with_num_steps(2000)
///     .with_beta_range(0.005, 10.0)
///     .with_schedule(AnnealingSchedule::Inverse)
///     .with_optimizer(OptimizerKind::adam())
///     .with_gradient(GradientMode::Manual)
///     .with_discretize(true)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Number of independent trials (parallel marginal vectors).
    pub num_trials: usize,

    /// Number of annealing steps per trial.
    pub num_steps: usize,

    /// Inverse temperature at the first step.
    pub beta_min: f64,

    /// Inverse temperature at the last step.
    pub beta_max: f64,

    /// Interpolation between `beta_min` and `beta_max`.
    pub schedule: AnnealingSchedule,

    /// Optimizer step size.
    pub learning_rate: f64,

    /// Optimizer update rule.
    pub optimizer: OptimizerKind,

    /// Evaluate the score gradient at rounded marginals each step of the
    /// low-temperature tail, from [`discretize_from`](Self::discretize_from)
    /// onward.
    pub discretize: bool,

    /// Fraction of the schedule after which discretization engages, in
    /// `[0, 1]`. `0.0` rounds from the first step.
    ///
    /// Rounding from the start turns every step into a zero-temperature
    /// greedy update, whatever `beta` is. Engaging it in the last tenth
    /// snaps the annealed marginals to a nearby local optimum instead.
    pub discretize_from: f64,

    /// Closed-form or derived score gradient.
    pub gradient: GradientMode,

    /// Half-width of the uniform perturbation around 0.5 used to
    /// initialize marginals. Must be in `[0, 0.5)`.
    pub init_noise: f64,

    /// Record the best expected score every this many steps (0 = off).
    pub history_interval: usize,

    /// Run trials on the rayon thread pool.
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub parallel: bool,

    /// Dedicated worker count for this solve. `None` uses the global pool.
    pub threads: Option<usize>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_trials: 100,
            num_steps: 1000,
            beta_min: 0.01,
            beta_max: 20.0,
            schedule: AnnealingSchedule::default(),
            learning_rate: 0.05,
            optimizer: OptimizerKind::default(),
            discretize: false,
            discretize_from: 0.9,
            gradient: GradientMode::default(),
            init_noise: 0.01,
            history_interval: 0,
            parallel: true,
            threads: None,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_num_trials(mut self, n: usize) -> Self {
        self.num_trials = n;
        self
    }

    pub fn with_num_steps(mut self, n: usize) -> Self {
        self.num_steps = n;
        self
    }

    /// Sets `beta_min` and `beta_max`.
    pub fn with_beta_range(mut self, beta_min: f64, beta_max: f64) -> Self {
        self.beta_min = beta_min;
        self.beta_max = beta_max;
        self
    }

    pub fn with_schedule(mut self, schedule: AnnealingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_discretize(mut self, discretize: bool) -> Self {
        self.discretize = discretize;
        self
    }

    /// Sets the schedule fraction after which discretization engages.
    pub fn with_discretize_from(mut self, fraction: f64) -> Self {
        self.discretize_from = fraction;
        self
    }

    pub fn with_gradient(mut self, mode: GradientMode) -> Self {
        self.gradient = mode;
        self
    }

    pub fn with_init_noise(mut self, noise: f64) -> Self {
        self.init_noise = noise;
        self
    }

    pub fn with_history_interval(mut self, interval: usize) -> Self {
        self.history_interval = interval;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick runs: 32 trials, 300 steps.
    pub fn fast() -> Self {
        Self {
            num_trials: 32,
            num_steps: 300,
            ..Self::default()
        }
    }

    /// Preset for typical instances: 100 trials, 1000 steps, discretized.
    pub fn balanced() -> Self {
        Self {
            num_trials: 100,
            num_steps: 1000,
            discretize: true,
            ..Self::default()
        }
    }

    /// Preset for hard instances: 500 trials, 3000 steps, discretized.
    pub fn quality() -> Self {
        Self {
            num_trials: 500,
            num_steps: 3000,
            discretize: true,
            ..Self::default()
        }
    }

    /// Picks a preset from the number of variables.
    ///
    /// - `n < 100` → [`fast()`](Self::fast)
    /// - `100 ≤ n < 1000` → [`balanced()`](Self::balanced)
    /// - `n ≥ 1000` → [`quality()`](Self::quality)
    pub fn auto_select(n: usize) -> Self {
        if n < 100 {
            Self::fast()
        } else if n < 1000 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.num_steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        let positive = |b: f64| b.is_finite() && b > 0.0;
        if !positive(self.beta_min) || !positive(self.beta_max) {
            return Err(ConfigError::NonPositiveBeta {
                beta_min: self.beta_min,
                beta_max: self.beta_max,
            });
        }
        if self.beta_min > self.beta_max {
            return Err(ConfigError::BetaRange {
                beta_min: self.beta_min,
                beta_max: self.beta_max,
            });
        }
        if !positive(self.learning_rate) {
            return Err(ConfigError::LearningRate(self.learning_rate));
        }
        self.optimizer.validate()?;
        if !(0.0..0.5).contains(&self.init_noise) {
            return Err(ConfigError::InitNoise(self.init_noise));
        }
        if !(0.0..=1.0).contains(&self.discretize_from) {
            return Err(ConfigError::DiscretizeFrom(self.discretize_from));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// First step whose score gradient uses rounded marginals, or `None`
    /// when discretization is off.
    pub fn discretize_start(&self) -> Option<usize> {
        if !self.discretize {
            return None;
        }
        let last = self.num_steps.saturating_sub(1) as f64;
        Some((self.discretize_from * last).ceil() as usize)
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    #[cfg(feature = "serde")]
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.num_trials, 100);
        assert_eq!(config.num_steps, 1000);
        assert!((config.beta_min - 0.01).abs() < 1e-15);
        assert!((config.beta_max - 20.0).abs() < 1e-12);
        assert_eq!(config.schedule, AnnealingSchedule::Geometric);
        assert_eq!(config.optimizer, OptimizerKind::rmsprop());
        assert_eq!(config.gradient, GradientMode::Manual);
        assert!(!config.discretize);
        assert!((config.discretize_from - 0.9).abs() < 1e-15);
        assert!(config.parallel);
        assert!(config.seed.is_none());
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SolverConfig::default()
            .with_num_trials(8)
            .with_num_steps(50)
            .with_beta_range(0.1, 1.0)
            .with_learning_rate(0.2)
            .with_discretize(true)
            .with_gradient(GradientMode::Automatic)
            .with_init_noise(0.1)
            .with_history_interval(10)
            .with_parallel(false)
            .with_threads(2)
            .with_seed(42);

        assert_eq!(config.num_trials, 8);
        assert_eq!(config.num_steps, 50);
        assert!((config.beta_min - 0.1).abs() < 1e-15);
        assert!((config.learning_rate - 0.2).abs() < 1e-15);
        assert!(config.discretize);
        assert_eq!(config.gradient, GradientMode::Automatic);
        assert_eq!(config.history_interval, 10);
        assert!(!config.parallel);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.seed, Some(42));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_trials() {
        let config = SolverConfig::default().with_num_trials(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTrials));
    }

    #[test]
    fn test_validate_zero_steps() {
        let config = SolverConfig::default().with_num_steps(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSteps));
    }

    #[test]
    fn test_validate_beta_order() {
        let config = SolverConfig::default().with_beta_range(2.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::BetaRange { .. })));

        let config = SolverConfig::default().with_beta_range(1.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_non_positive_beta() {
        for (lo, hi) in [(0.0, 1.0), (-1.0, 1.0), (0.1, f64::INFINITY), (f64::NAN, 1.0)] {
            let config = SolverConfig::default().with_beta_range(lo, hi);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NonPositiveBeta { .. })
            ));
        }
    }

    #[test]
    fn test_validate_learning_rate() {
        let config = SolverConfig::default().with_learning_rate(0.0);
        assert_eq!(config.validate(), Err(ConfigError::LearningRate(0.0)));
    }

    #[test]
    fn test_validate_init_noise() {
        assert!(SolverConfig::default().with_init_noise(0.5).validate().is_err());
        assert!(SolverConfig::default().with_init_noise(-0.1).validate().is_err());
        assert!(SolverConfig::default().with_init_noise(0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_discretize_from() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let config = SolverConfig::default().with_discretize_from(bad);
            assert!(matches!(config.validate(), Err(ConfigError::DiscretizeFrom(_))));
        }
        assert!(SolverConfig::default().with_discretize_from(0.0).validate().is_ok());
        assert!(SolverConfig::default().with_discretize_from(1.0).validate().is_ok());
    }

    #[test]
    fn test_discretize_start() {
        let config = SolverConfig::default().with_num_steps(1001);
        assert_eq!(config.discretize_start(), None);

        let config = config.with_discretize(true);
        assert_eq!(config.discretize_start(), Some(900));
        assert_eq!(config.clone().with_discretize_from(0.0).discretize_start(), Some(0));
        assert_eq!(config.with_discretize_from(1.0).discretize_start(), Some(1000));

        let single = SolverConfig::default().with_num_steps(1).with_discretize(true);
        assert_eq!(single.discretize_start(), Some(0));
    }

    #[test]
    fn test_validate_threads() {
        let config = SolverConfig::default().with_threads(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroThreads));
    }

    #[test]
    fn test_validate_optimizer() {
        let config = SolverConfig::default().with_optimizer(OptimizerKind::RmsProp {
            alpha: -0.5,
            eps: 1e-8,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Optimizer(_))));
    }

    #[test]
    fn test_presets() {
        for config in [
            SolverConfig::fast(),
            SolverConfig::balanced(),
            SolverConfig::quality(),
        ] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(SolverConfig::auto_select(10).num_trials, 32);
        assert_eq!(SolverConfig::auto_select(100).num_trials, 100);
        assert_eq!(SolverConfig::auto_select(800).num_steps, 1000);
        assert_eq!(SolverConfig::auto_select(5000).num_trials, 500);
    }

    #[test]
    fn test_preset_chainable() {
        let config = SolverConfig::fast().with_num_trials(4).with_seed(9);
        assert_eq!(config.num_trials, 4);
        assert_eq!(config.num_steps, 300);
        assert_eq!(config.seed, Some(9));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let json = r#"{
            "num_trials": 16,
            "beta_max": 5.0,
            "optimizer": { "kind": "adam", "beta1": 0.9, "beta2": 0.99, "eps": 1e-8 },
            "schedule": "inverse",
            "gradient": "automatic",
            "discretize": true
        }"#;
        let config = SolverConfig::from_json_str(json).unwrap();
        assert_eq!(config.num_trials, 16);
        assert_eq!(config.num_steps, 1000);
        assert_eq!(config.schedule, AnnealingSchedule::Inverse);
        assert_eq!(config.gradient, GradientMode::Automatic);
        assert!(matches!(config.optimizer, OptimizerKind::Adam { .. }));
        assert!(config.discretize);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_rejects_invalid() {
        let err = SolverConfig::from_json_str(r#"{ "num_trials": 0 }"#).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::ZeroTrials)));

        let err = SolverConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Parse(_))));

        let err = SolverConfig::from_json_str(r#"{ "num_trials": "many" }"#).unwrap_err();
        match err {
            crate::error::Error::Config(ConfigError::Parse(msg)) => {
                assert!(msg.contains("invalid type"), "{msg}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
