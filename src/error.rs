//! Error types.
//!
//! Each concern has its own enum so callers can match on exactly the
//! failures an operation can produce. [`Error`] unifies them for the
//! top-level solve and load entry points.

use thiserror::Error;

/// Malformed or inconsistent instance data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("instance is empty: expected a `n_nodes n_edges` header")]
    MissingHeader,

    #[error("line {line}: malformed header `{content}`, expected `n_nodes n_edges`")]
    MalformedHeader { line: usize, content: String },

    #[error("line {line}: cannot parse {field} from `{value}`")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: expected `i j [weight]`, found {found} fields")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: node index {index} out of range for {nodes} nodes")]
    NodeOutOfRange {
        line: usize,
        index: usize,
        nodes: usize,
    },

    #[error("header declares {declared} couplings but {found} were found")]
    EdgeCountMismatch { declared: usize, found: usize },

    #[error("coupling ({i}, {j}) references a node outside 0..{nodes}")]
    CouplingOutOfRange { i: usize, j: usize, nodes: usize },

    #[error("coupling ({i}, {j}) has non-finite weight {weight}")]
    NonFiniteWeight { i: usize, j: usize, weight: f64 },

    #[error("line {line}: {nodes} nodes exceeds the loader limit of {max}")]
    NodeLimit {
        line: usize,
        nodes: usize,
        max: usize,
    },

    #[error("cannot allocate an instance with {nodes} nodes")]
    TooManyNodes { nodes: usize },
}

/// Invalid hyperparameters or a problem that does not fit the instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("num_trials must be at least 1")]
    ZeroTrials,

    #[error("num_steps must be at least 1")]
    ZeroSteps,

    #[error("beta_min and beta_max must be finite and positive, got {beta_min} and {beta_max}")]
    NonPositiveBeta { beta_min: f64, beta_max: f64 },

    #[error("beta_min ({beta_min}) must not exceed beta_max ({beta_max})")]
    BetaRange { beta_min: f64, beta_max: f64 },

    #[error("learning_rate must be finite and positive, got {0}")]
    LearningRate(f64),

    #[error("invalid optimizer parameter: {0}")]
    Optimizer(String),

    #[error("init_noise must be in [0, 0.5), got {0}")]
    InitNoise(f64),

    #[error("discretize_from must be in [0, 1], got {0}")]
    DiscretizeFrom(f64),

    #[error("threads must be at least 1 when set")]
    ZeroThreads,

    #[error("problem expects {expected} variables but the instance has {found} nodes")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid problem parameter: {0}")]
    Problem(String),

    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

/// Divergence detected while iterating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericalError {
    #[error("trial {trial}: non-finite gradient at step {step}")]
    NonFiniteGradient { trial: usize, step: usize },

    #[error("trial {trial}: non-finite marginal at step {step}")]
    NonFiniteMarginal { trial: usize, step: usize },

    #[error("all {trials} trials diverged")]
    AllTrialsDiverged { trials: usize },

    #[error("none of the {trials} surviving trials has a finite score")]
    NoFiniteScore { trials: usize },
}

/// A problem's inference returned something other than a configuration
/// of the instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("configuration has {found} entries, expected {expected}")]
    WrongLength { expected: usize, found: usize },

    #[error("configuration entry {index} is {value}, expected 0 or 1")]
    NonBinary { index: usize, value: u8 },
}

/// Any error produced by loading or solving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("numerical error: {0}")]
    Numerical(#[from] NumericalError),

    #[error("trial {trial}: invalid inference output: {source}")]
    Inference {
        trial: usize,
        #[source]
        source: InferenceError,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let e: Error = ConfigError::ZeroTrials.into();
        assert!(matches!(e, Error::Config(ConfigError::ZeroTrials)));

        let e: Error = NumericalError::AllTrialsDiverged { trials: 3 }.into();
        assert!(matches!(e, Error::Numerical(_)));
    }

    #[test]
    fn test_messages_carry_context() {
        let e = FormatError::NodeOutOfRange {
            line: 4,
            index: 9,
            nodes: 5,
        };
        let msg = e.to_string();
        assert!(msg.contains("line 4"));
        assert!(msg.contains("9"));

        let e = ConfigError::BetaRange {
            beta_min: 2.0,
            beta_max: 1.0,
        };
        assert!(e.to_string().contains("beta_min (2)"));
    }

    #[test]
    fn test_inference_error_names_trial() {
        let e = Error::Inference {
            trial: 7,
            source: InferenceError::NonBinary { index: 2, value: 3 },
        };
        let msg = e.to_string();
        assert!(msg.contains("trial 7"));
        assert!(msg.contains("entry 2 is 3"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
