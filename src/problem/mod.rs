//! Relaxed binary objectives.
//!
//! The solver is generic over [`Problem`], the capability pair
//! {expected value, inference} plus an optional closed-form gradient.
//!
//! # Built-in problems
//!
//! - [`MaxCut`]: weighted Max-Cut (maximize)
//! - [`MaximumIndependentSet`]: MIS with a conflict penalty (maximize)
//! - [`Qubo`]: `xᵀJx + hᵀx` (minimize)
//! - [`CustomProblem`]: user closures; gradient derived automatically
//!   unless supplied
//!
//! [`ProblemKind`] selects a built-in by name.

pub mod autograd;
mod custom;
mod kind;
mod maxcut;
mod mis;
mod qubo;
mod types;

pub use custom::CustomProblem;
pub use kind::ProblemKind;
pub use maxcut::{cut_value, MaxCut};
pub use mis::{is_independent_set, MaximumIndependentSet};
pub use qubo::Qubo;
pub use types::{Problem, Sense};
