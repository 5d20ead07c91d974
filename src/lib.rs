//! Free-energy relaxation solver for binary quadratic optimization.
//!
//! Combinatorial problems over binary variables (Max-Cut, Maximum
//! Independent Set, QUBO, or user-defined objectives) are solved by
//! relaxing each variable to a marginal probability and running many
//! annealed gradient-descent trials on the mean-field free energy in
//! parallel. The pipeline has three stages:
//!
//! - **[`instance`]**: loads a weighted graph / coupling matrix from a
//!   line-based text file (G-set style) or from in-memory arrays.
//! - **[`fem`]**: the relaxation solver (annealing schedule, optimizer,
//!   manual or automatic gradients, independent trials).
//! - **[`scorer`]**: discretizes final marginals and reduces the trials
//!   to the best score and its distinct configurations.
//!
//! Objectives live in [`problem`]; errors in [`error`].
//!
//! # Example
//!
//! ```
//! use u_fem::fem::{FemRunner, SolverConfig};
//! use u_fem::instance::InstanceLoader;
//! use u_fem::problem::MaxCut;
//!
//! let text = "4 4\n1 2 1\n2 3 1\n3 4 1\n4 1 1\n";
//! let instance = InstanceLoader::new().parse(text).unwrap();
//! let config = SolverConfig::fast().with_seed(7);
//! let result = FemRunner::run(&MaxCut, &instance, &config).unwrap();
//! assert_eq!(result.best_score, 4.0);
//! ```

pub mod error;
pub mod fem;
pub mod instance;
pub mod problem;
pub mod scorer;

pub use error::{Error, Result};
