use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use u_fem::fem::{AnnealingSchedule, FemRunner, GradientMode, OptimizerKind, SolverConfig};
use u_fem::instance::{IndexBase, InstanceLoader};
use u_fem::problem::{MaximumIndependentSet, Problem, ProblemKind};

#[derive(Parser, Debug)]
#[command(name = "fem", about = "Free-energy relaxation solver for Max-Cut, MIS and QUBO")]
struct Cli {
    /// Instance file: header `n m`, then `i j [w]` per line.
    #[arg(long)]
    instance: PathBuf,
    #[arg(long, default_value = "maxcut")]
    problem: ProblemKind,
    /// JSON solver configuration; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    trials: Option<usize>,
    #[arg(long)]
    steps: Option<usize>,
    #[arg(long)]
    beta_min: Option<f64>,
    #[arg(long)]
    beta_max: Option<f64>,
    #[arg(long)]
    lr: Option<f64>,
    #[arg(long)]
    optimizer: Option<OptimizerKind>,
    #[arg(long)]
    schedule: Option<AnnealingSchedule>,
    /// Derive gradients from the expected score instead of the closed form.
    #[arg(long)]
    auto_grad: bool,
    /// Evaluate the score gradient at rounded marginals late in the schedule.
    #[arg(long, overrides_with = "no_discretize")]
    discretize: bool,
    /// Keep continuous gradients even if the config or preset discretizes.
    #[arg(long, overrides_with = "discretize")]
    no_discretize: bool,
    /// Schedule fraction after which discretization engages.
    #[arg(long)]
    discretize_from: Option<f64>,
    /// Conflict penalty; only valid with `--problem mis`.
    #[arg(long)]
    penalty: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    threads: Option<usize>,
    /// Node indices in the file start at 0 instead of 1.
    #[arg(long)]
    zero_indexed: bool,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn solver_config(&self, n: usize) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => SolverConfig::auto_select(n),
        };
        if let Some(trials) = self.trials {
            config.num_trials = trials;
        }
        if let Some(steps) = self.steps {
            config.num_steps = steps;
        }
        if let Some(beta_min) = self.beta_min {
            config.beta_min = beta_min;
        }
        if let Some(beta_max) = self.beta_max {
            config.beta_max = beta_max;
        }
        if let Some(lr) = self.lr {
            config.learning_rate = lr;
        }
        if let Some(optimizer) = self.optimizer {
            config.optimizer = optimizer;
        }
        if let Some(schedule) = self.schedule {
            config.schedule = schedule;
        }
        if self.auto_grad {
            config.gradient = GradientMode::Automatic;
        }
        if self.discretize {
            config.discretize = true;
        } else if self.no_discretize {
            config.discretize = false;
        }
        if let Some(fraction) = self.discretize_from {
            config.discretize_from = fraction;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        Ok(config)
    }

    fn build_problem(&self) -> Result<Box<dyn Problem>> {
        match (self.problem, self.penalty) {
            (ProblemKind::Mis, Some(penalty)) => {
                Ok(Box::new(MaximumIndependentSet::new().with_penalty(penalty)))
            }
            (kind, Some(_)) => bail!("--penalty applies to --problem mis, not {kind}"),
            (kind, None) => Ok(kind.build()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let problem = cli.build_problem()?;

    let base = if cli.zero_indexed {
        IndexBase::Zero
    } else {
        IndexBase::One
    };
    let instance = InstanceLoader::new()
        .with_index_base(base)
        .load(&cli.instance)
        .with_context(|| format!("loading instance {}", cli.instance.display()))?;
    let config = cli.solver_config(instance.num_nodes())?;

    eprintln!(
        "{}: {} nodes, {} couplings, {} trials x {} steps",
        cli.instance.display(),
        instance.num_nodes(),
        instance.num_couplings(),
        config.num_trials,
        config.num_steps,
    );

    let start = Instant::now();
    let result = FemRunner::run(&problem, &instance, &config)?;
    let elapsed = start.elapsed();

    if cli.json {
        let summary = serde_json::json!({
            "problem": problem.name(),
            "nodes": instance.num_nodes(),
            "best_score": result.best_score,
            "best_count": result.best_count(),
            "best_configurations": result.best_configurations,
            "trials": result.trials,
            "diverged": result.diverged.iter().map(|d| d.trial).collect::<Vec<_>>(),
            "steps": result.steps,
            "elapsed_secs": elapsed.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("best score      {}", result.best_score);
        println!(
            "reached by      {} of {} trials ({} distinct)",
            result.best_count(),
            result.trials.len(),
            result.best_configurations.len()
        );
        if !result.diverged.is_empty() {
            println!("diverged        {}", result.diverged.len());
        }
        println!("elapsed         {:.3}s", elapsed.as_secs_f64());
        let bits: String = result
            .best_configuration()
            .iter()
            .map(|&b| if b == 1 { '1' } else { '0' })
            .collect();
        println!("configuration   {bits}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let argv = ["fem", "--instance", "graph.txt"].iter().chain(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_penalty_requires_mis() {
        // Box<dyn Problem> is not Debug, so go through `err()`.
        let err = cli(&["--penalty", "3"]).build_problem().err().unwrap();
        assert!(err.to_string().contains("--problem mis"), "{err}");

        let err = cli(&["--problem", "qubo", "--penalty", "3"])
            .build_problem()
            .err()
            .unwrap();
        assert!(err.to_string().contains("qubo"), "{err}");

        let problem = cli(&["--problem", "mis", "--penalty", "3"]).build_problem();
        assert_eq!(problem.ok().map(|p| p.name().to_string()).as_deref(), Some("mis"));
    }

    #[test]
    fn test_discretize_flags() {
        // auto_select(500) is the balanced preset, which discretizes.
        assert!(cli(&[]).solver_config(500).unwrap().discretize);
        assert!(!cli(&["--no-discretize"]).solver_config(500).unwrap().discretize);
        assert!(cli(&["--discretize"]).solver_config(10).unwrap().discretize);

        // The last of the pair wins.
        let both = cli(&["--discretize", "--no-discretize"]);
        assert!(!both.solver_config(10).unwrap().discretize);
        let both = cli(&["--no-discretize", "--discretize"]);
        assert!(both.solver_config(500).unwrap().discretize);

        let config = cli(&["--discretize-from", "0.5"]).solver_config(10).unwrap();
        assert_eq!(config.discretize_from, 0.5);
    }
}
