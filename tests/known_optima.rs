//! End-to-end solves on graphs with known optima.

use std::path::PathBuf;

use u_fem::fem::{FemRunner, GradientMode, SolverConfig};
use u_fem::instance::InstanceLoader;
use u_fem::problem::{cut_value, is_independent_set, MaxCut, MaximumIndependentSet};

fn petersen() -> u_fem::instance::ProblemInstance {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/petersen.txt");
    InstanceLoader::new().load(path).unwrap()
}

fn config() -> SolverConfig {
    SolverConfig::default()
        .with_num_trials(128)
        .with_num_steps(600)
        .with_discretize(true)
        .with_seed(2024)
}

#[test]
fn petersen_loads() {
    let inst = petersen();
    assert_eq!(inst.num_nodes(), 10);
    assert_eq!(inst.num_couplings(), 15);
    for i in 0..10 {
        assert_eq!(inst.matrix().neighbors(i).len(), 3);
    }
}

#[test]
fn petersen_max_cut() {
    let inst = petersen();
    let result = FemRunner::run(&MaxCut, &inst, &config()).unwrap();
    assert_eq!(result.best_score, 12.0);
    for c in &result.best_configurations {
        assert_eq!(cut_value(&inst, c), 12.0);
    }
}

#[test]
fn petersen_max_cut_automatic_gradient() {
    let inst = petersen();
    let config = config().with_gradient(GradientMode::Automatic);
    let result = FemRunner::run(&MaxCut, &inst, &config).unwrap();
    assert_eq!(result.best_score, 12.0);
}

#[test]
fn petersen_independent_set() {
    let inst = petersen();
    let result = FemRunner::run(&MaximumIndependentSet::new(), &inst, &config()).unwrap();
    assert_eq!(result.best_score, 4.0);
    for c in &result.best_configurations {
        assert!(is_independent_set(&inst, c));
        assert_eq!(c.iter().filter(|&&b| b == 1).count(), 4);
    }
}
