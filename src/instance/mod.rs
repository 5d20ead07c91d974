//! Problem instances.
//!
//! A [`ProblemInstance`] is a node count plus weighted couplings, held as
//! a symmetric sparse [`CouplingMatrix`]. Instances come from
//! [`InstanceLoader`] (line-based text, e.g. G-set files) or directly
//! from in-memory arrays.

mod loader;
mod types;

pub use loader::{IndexBase, InstanceLoader, DEFAULT_MAX_NODES};
pub use types::{Coupling, CouplingMatrix, ProblemInstance};
