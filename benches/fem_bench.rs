//! Criterion benchmarks for the relaxation solver.
//!
//! Uses seeded random sparse graphs to measure solver throughput and the
//! cost of automatic versus closed-form gradients.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_fem::fem::{FemRunner, GradientMode, SolverConfig};
use u_fem::instance::ProblemInstance;
use u_fem::problem::{MaxCut, MaximumIndependentSet};

/// Erdős–Rényi-style graph with roughly `degree * n / 2` unit edges.
fn random_graph(n: usize, degree: usize, seed: u64) -> ProblemInstance {
    let mut rng = StdRng::seed_from_u64(seed);
    let m = degree * n / 2;
    let edges: Vec<(usize, usize)> = (0..m)
        .map(|_| loop {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if i != j {
                break (i, j);
            }
        })
        .collect();
    ProblemInstance::from_edges(n, &edges).expect("valid edges")
}

fn config(trials: usize, steps: usize) -> SolverConfig {
    SolverConfig::default()
        .with_num_trials(trials)
        .with_num_steps(steps)
        .with_seed(42)
}

fn bench_maxcut(c: &mut Criterion) {
    let mut group = c.benchmark_group("maxcut");
    group.sample_size(10);

    for (n, trials, steps) in [(100usize, 32usize, 300usize), (800, 64, 300), (2000, 64, 200)] {
        let instance = random_graph(n, 6, 7);
        let config = config(trials, steps);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_t{}_s{}", n, trials, steps), n),
            &(instance, config),
            |b, (inst, cfg)| {
                b.iter(|| {
                    let result = FemRunner::run(&MaxCut, black_box(inst), black_box(cfg));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_gradient_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient_mode");
    group.sample_size(10);

    let instance = random_graph(200, 4, 11);
    for mode in [GradientMode::Manual, GradientMode::Automatic] {
        let config = config(8, 100).with_gradient(mode);
        group.bench_with_input(BenchmarkId::from_parameter(mode), &config, |b, cfg| {
            b.iter(|| {
                let result = FemRunner::run(&MaxCut, black_box(&instance), black_box(cfg));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_mis(c: &mut Criterion) {
    let mut group = c.benchmark_group("mis");
    group.sample_size(10);

    let problem = MaximumIndependentSet::new();
    for n in [100usize, 500] {
        let instance = random_graph(n, 4, 3);
        let config = config(32, 300).with_discretize(true);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(instance, config),
            |b, (inst, cfg)| {
                b.iter(|| {
                    let result = FemRunner::run(&problem, black_box(inst), black_box(cfg));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_maxcut, bench_gradient_mode, bench_mis);
criterion_main!(benches);
