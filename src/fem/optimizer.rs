//! First-order update rules for the marginals.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Gradient-descent update rule.
///
/// `RmsProp` and `Adam` follow the PyTorch formulations (no momentum,
/// no weight decay; Adam with bias correction).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum OptimizerKind {
    /// `p -= lr * g`
    Sgd,

    /// `v = alpha v + (1 - alpha) g²; p -= lr g / (sqrt(v) + eps)`
    #[cfg_attr(feature = "serde", serde(rename = "rmsprop"))]
    RmsProp { alpha: f64, eps: f64 },

    /// Adam with bias-corrected first and second moments.
    Adam { beta1: f64, beta2: f64, eps: f64 },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        Self::rmsprop()
    }
}

impl OptimizerKind {
    /// RMSProp with `alpha = 0.99`, `eps = 1e-8`.
    pub fn rmsprop() -> Self {
        OptimizerKind::RmsProp {
            alpha: 0.99,
            eps: 1e-8,
        }
    }

    /// Adam with `beta1 = 0.9`, `beta2 = 0.999`, `eps = 1e-8`.
    pub fn adam() -> Self {
        OptimizerKind::Adam {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, v: f64| {
            if (0.0..1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::Optimizer(format!("{name} must be in [0, 1), got {v}")))
            }
        };
        let eps = |v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Optimizer(format!("eps must be positive, got {v}")))
            }
        };
        match *self {
            OptimizerKind::Sgd => Ok(()),
            OptimizerKind::RmsProp { alpha, eps: e } => {
                unit("alpha", alpha)?;
                eps(e)
            }
            OptimizerKind::Adam {
                beta1,
                beta2,
                eps: e,
            } => {
                unit("beta1", beta1)?;
                unit("beta2", beta2)?;
                eps(e)
            }
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::RmsProp { .. } => "rmsprop",
            OptimizerKind::Adam { .. } => "adam",
        };
        f.write_str(name)
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "rmsprop" => Ok(OptimizerKind::rmsprop()),
            "adam" => Ok(OptimizerKind::adam()),
            other => Err(format!(
                "unknown optimizer `{other}` (expected sgd, rmsprop or adam)"
            )),
        }
    }
}

/// Per-trial optimizer buffers.
#[derive(Debug, Clone)]
pub(crate) struct OptimizerState {
    kind: OptimizerKind,
    lr: f64,
    first: Vec<f64>,
    second: Vec<f64>,
    t: i32,
}

impl OptimizerState {
    pub(crate) fn new(kind: OptimizerKind, lr: f64, n: usize) -> Self {
        let (first, second) = match kind {
            OptimizerKind::Sgd => (Vec::new(), Vec::new()),
            OptimizerKind::RmsProp { .. } => (Vec::new(), vec![0.0; n]),
            OptimizerKind::Adam { .. } => (vec![0.0; n], vec![0.0; n]),
        };
        Self {
            kind,
            lr,
            first,
            second,
            t: 0,
        }
    }

    /// Applies one descent step to `params`.
    pub(crate) fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        self.t = self.t.saturating_add(1);
        match self.kind {
            OptimizerKind::Sgd => {
                for (p, g) in params.iter_mut().zip(grad) {
                    *p -= self.lr * g;
                }
            }
            OptimizerKind::RmsProp { alpha, eps } => {
                for ((p, g), v) in params.iter_mut().zip(grad).zip(self.second.iter_mut()) {
                    *v = alpha * *v + (1.0 - alpha) * g * g;
                    *p -= self.lr * g / (v.sqrt() + eps);
                }
            }
            OptimizerKind::Adam { beta1, beta2, eps } => {
                let c1 = 1.0 - beta1.powi(self.t);
                let c2 = 1.0 - beta2.powi(self.t);
                for (((p, g), m), v) in params
                    .iter_mut()
                    .zip(grad)
                    .zip(self.first.iter_mut())
                    .zip(self.second.iter_mut())
                {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / c1;
                    let v_hat = *v / c2;
                    *p -= self.lr * m_hat / (v_hat.sqrt() + eps);
                }
            }
        }
    }
}
