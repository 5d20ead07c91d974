//! Free-Energy Machine (FEM) relaxation solver.
//!
//! Each binary variable is relaxed to a marginal probability `p_i ∈ [0, 1]`.
//! Many independent trials descend the mean-field free energy
//! `F = s · E[score] - S / beta` while `beta` is annealed from `beta_min`
//! to `beta_max`. At low temperature the entropy term vanishes and the
//! marginals settle near binary values, which are then discretized by the
//! problem's inference function and reduced to the best score.
//!
//! # References
//!
//! - Shen et al. (2025), "Free-Energy Machine for Combinatorial Optimization"
//! - Tieleman & Hinton (2012), RMSProp lecture notes
//! - Kingma & Ba (2015), "Adam: A Method for Stochastic Optimization"

mod config;
mod gradient;
mod optimizer;
mod runner;
mod schedule;
mod types;

pub use config::SolverConfig;
pub use gradient::{entropy, free_energy, GradientMode, ENTROPY_EPS};
pub use optimizer::OptimizerKind;
pub use runner::FemRunner;
pub use schedule::AnnealingSchedule;
pub use types::{DivergedTrial, FemResult, TrialResult};
