//! Batch Experiment Runner
//!
//! Executes many independent Hawk-Dove runs from a TOML configuration
//! file, sweeping parameter combinations, and writes model-level (and
//! optionally agent-level) CSV data.
//!
//! Usage:
//!   cargo run --release --bin batch_run -- experiments/risk_adjustment.toml

use chrono::Local;
use hawkdove::{HawkDoveConfig, HawkDoveModel, PayoffMatrix, Play, RiskAttitudeMode, RISK_LEVELS};
use rayon::prelude::*;
use serde::Deserialize;
use simrisk::{ConfigError, Model};
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Top-level experiment configuration
#[derive(Debug, Clone, Deserialize)]
struct ExperimentConfig {
    experiment: ExperimentMetadata,
    model: ModelParams,
    output: OutputSettings,
    sweep: Option<SweepConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExperimentMetadata {
    name: String,
    description: String,
    /// Seeded repetitions per parameter combination.
    iterations: usize,
    max_rounds: usize,
    base_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelParams {
    grid_size: Option<usize>,
    play_neighborhood: Option<usize>,
    observed_neighborhood: Option<usize>,
    adjust_neighborhood: Option<usize>,
    hawk_odds: Option<f64>,
    random_play_odds: Option<f64>,
    /// single / variable / adopt / average
    risk_attitudes: Option<String>,
    /// Shared risk level, required when risk_attitudes = "single".
    risk_level: Option<usize>,
    risk_distribution: Option<String>,
    adjust_every: Option<usize>,
    /// recent / total
    adjust_payoff: Option<String>,
    /// standard / dove_bias
    payoff_variant: Option<String>,
}

impl ModelParams {
    fn to_model_config(&self) -> Result<HawkDoveConfig, ConfigError> {
        let defaults = HawkDoveConfig::default();
        let mode = match self.risk_attitudes.as_deref() {
            None => defaults.mode,
            Some("single") => RiskAttitudeMode::Single {
                level: self.risk_level.unwrap_or(0),
            },
            Some("variable") => RiskAttitudeMode::Variable,
            Some("adopt") => RiskAttitudeMode::MultiAdopt,
            Some("average") => RiskAttitudeMode::MultiAverage,
            Some(other) => {
                return Err(ConfigError::UnsupportedMode(
                    other.to_string(),
                    "single, variable, adopt, average",
                ))
            }
        };
        let payoffs = match self.payoff_variant.as_deref() {
            None => defaults.payoffs,
            Some("standard") => PayoffMatrix::standard(),
            Some("dove_bias") => PayoffMatrix::dove_bias(),
            Some(other) => {
                return Err(ConfigError::UnsupportedMode(
                    other.to_string(),
                    "standard, dove_bias",
                ))
            }
        };
        Ok(HawkDoveConfig {
            grid_size: self.grid_size.unwrap_or(defaults.grid_size),
            play_neighborhood: self.play_neighborhood.unwrap_or(defaults.play_neighborhood),
            observed_neighborhood: self
                .observed_neighborhood
                .unwrap_or(defaults.observed_neighborhood),
            adjust_neighborhood: self
                .adjust_neighborhood
                .unwrap_or(defaults.adjust_neighborhood),
            hawk_odds: self.hawk_odds.unwrap_or(defaults.hawk_odds),
            random_play_odds: self.random_play_odds.unwrap_or(defaults.random_play_odds),
            mode,
            risk_distribution: match self.risk_distribution.as_deref() {
                Some(name) => name.parse()?,
                None => defaults.risk_distribution,
            },
            adjust_every: self.adjust_every.unwrap_or(defaults.adjust_every),
            adjust_payoff: match self.adjust_payoff.as_deref() {
                Some(name) => name.parse()?,
                None => defaults.adjust_payoff,
            },
            payoffs,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OutputSettings {
    /// Base output directory; data/hawkdove by default.
    directory: Option<String>,
    /// Also write one row per agent per collected round.
    save_agent_data: bool,
    /// Collect every round instead of only the final one.
    all_rounds: bool,
}

/// Parameter lists whose cartesian product defines the sweep.
#[derive(Debug, Clone, Default, Deserialize)]
struct SweepConfig {
    grid_size: Option<Vec<usize>>,
    observed_neighborhood: Option<Vec<usize>>,
    hawk_odds: Option<Vec<f64>>,
    risk_attitudes: Option<Vec<String>>,
    risk_distribution: Option<Vec<String>>,
    adjust_every: Option<Vec<usize>>,
    adjust_payoff: Option<Vec<String>>,
}

impl SweepConfig {
    /// Expand the base parameters into one variant per combination.
    fn combinations(&self, base: &ModelParams) -> Vec<ModelParams> {
        let mut variants = vec![base.clone()];
        fn expand<T: Clone>(
            variants: Vec<ModelParams>,
            values: &Option<Vec<T>>,
            apply: impl Fn(&mut ModelParams, T),
        ) -> Vec<ModelParams> {
            let Some(values) = values else {
                return variants;
            };
            let mut expanded = Vec::with_capacity(variants.len() * values.len());
            for variant in variants {
                for value in values {
                    let mut next = variant.clone();
                    apply(&mut next, value.clone());
                    expanded.push(next);
                }
            }
            expanded
        }
        variants = expand(variants, &self.grid_size, |p, v| p.grid_size = Some(v));
        variants = expand(variants, &self.observed_neighborhood, |p, v| {
            p.observed_neighborhood = Some(v)
        });
        variants = expand(variants, &self.hawk_odds, |p, v| p.hawk_odds = Some(v));
        variants = expand(variants, &self.risk_attitudes, |p, v| {
            p.risk_attitudes = Some(v)
        });
        variants = expand(variants, &self.risk_distribution, |p, v| {
            p.risk_distribution = Some(v)
        });
        variants = expand(variants, &self.adjust_every, |p, v| {
            p.adjust_every = Some(v)
        });
        variants = expand(variants, &self.adjust_payoff, |p, v| {
            p.adjust_payoff = Some(v)
        });
        variants
    }
}

/// One independent seeded run to execute.
struct RunTask {
    run: usize,
    iteration: usize,
    seed: u64,
    config: HawkDoveConfig,
}

/// Collected rows from one completed run.
struct RunResult {
    model_rows: Vec<Vec<String>>,
    agent_rows: Vec<Vec<String>>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <experiment_config.toml>", args[0]);
        std::process::exit(1);
    }

    println!("=== Hawk-Dove Batch Runner ===\n");
    println!("Loading experiment config: {}\n", args[1]);

    let config_str = fs::read_to_string(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    let exp_config: ExperimentConfig = toml::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing TOML config: {}", e);
        std::process::exit(1);
    });

    println!("Experiment: {}", exp_config.experiment.name);
    println!("Description: {}", exp_config.experiment.description);

    let variants = exp_config
        .sweep
        .clone()
        .unwrap_or_default()
        .combinations(&exp_config.model);
    println!(
        "Configuration: {} parameter combinations × {} iterations\n",
        variants.len(),
        exp_config.experiment.iterations
    );

    // Validate every combination up front so bad sweeps fail before any
    // simulation work starts.
    let mut tasks = Vec::new();
    for (run, params) in variants.iter().enumerate() {
        let config = params.to_model_config().unwrap_or_else(|e| {
            eprintln!("Invalid parameter combination {}: {}", run, e);
            std::process::exit(1);
        });
        for iteration in 0..exp_config.experiment.iterations {
            let seed = exp_config.experiment.base_seed + tasks.len() as u64;
            tasks.push(RunTask {
                run,
                iteration,
                seed,
                config: config.clone(),
            });
        }
    }

    let start_time = Instant::now();
    let total_tasks = tasks.len();
    let output = exp_config.output.clone();
    println!("Running {} simulations...\n", total_tasks);

    let results: Vec<RunResult> = tasks
        .into_par_iter()
        .filter_map(|task| match execute_run(&task, &exp_config, &output) {
            Ok(result) => Some(result),
            Err(err) => {
                eprintln!(
                    "run {} iteration {} (seed {}) failed: {}",
                    task.run, task.iteration, task.seed, err
                );
                None
            }
        })
        .collect();

    let output_dir = PathBuf::from(
        output
            .directory
            .clone()
            .unwrap_or_else(|| "data/hawkdove".to_string()),
    );
    if let Err(err) = write_output(&exp_config, &output, &output_dir, &results) {
        eprintln!("Error writing output: {}", err);
        std::process::exit(1);
    }

    println!(
        "\n✓ Experiment complete in {:.1}s ({} of {} runs succeeded)",
        start_time.elapsed().as_secs_f64(),
        results.len(),
        total_tasks
    );
    println!("Results saved to: {}", output_dir.display());
}

fn execute_run(
    task: &RunTask,
    exp_config: &ExperimentConfig,
    output: &OutputSettings,
) -> Result<RunResult, ConfigError> {
    let mut model = HawkDoveModel::new(task.config.clone(), task.seed)?;
    let mut result = RunResult {
        model_rows: Vec::new(),
        agent_rows: Vec::new(),
    };
    while model.running() && model.round() < exp_config.experiment.max_rounds {
        model.advance_round();
        if output.all_rounds || !model.running() {
            collect_round(task, &model, output, &mut result);
        }
    }
    // A run that hit the round budget without converging still reports
    // its last completed round.
    if result.model_rows.is_empty() {
        collect_round(task, &model, output, &mut result);
    }
    Ok(result)
}

fn collect_round(
    task: &RunTask,
    model: &HawkDoveModel,
    output: &OutputSettings,
    result: &mut RunResult,
) {
    let mut row = vec![
        task.run.to_string(),
        task.iteration.to_string(),
        task.seed.to_string(),
        model.round().to_string(),
        (!model.running()).to_string(),
        task.config.grid_size.to_string(),
        task.config.risk_distribution.name().to_string(),
        task.config.adjust_every.to_string(),
        task.config.adjust_payoff.name().to_string(),
        format!("{}", model.percent_hawk()),
        model
            .rolling_percent_hawk()
            .map(|v| format!("{}", v))
            .unwrap_or_default(),
        format!("{}", model.max_agent_points()),
        model.population_risk_category().value().to_string(),
        model.population_risk_category().category().to_string(),
    ];
    for level in 0..RISK_LEVELS {
        row.push(model.total_at_risk_level(level).to_string());
    }
    result.model_rows.push(row);

    if output.save_agent_data {
        for agent in model.agents() {
            result.agent_rows.push(vec![
                task.run.to_string(),
                task.iteration.to_string(),
                model.round().to_string(),
                agent.id.to_string(),
                agent.risk_level.to_string(),
                match agent.choice {
                    Play::Hawk => "hawk".to_string(),
                    Play::Dove => "dove".to_string(),
                },
                format!("{}", agent.points),
                format!("{}", agent.recent_points),
            ]);
        }
    }
}

fn write_output(
    exp_config: &ExperimentConfig,
    output: &OutputSettings,
    output_dir: &Path,
    results: &[RunResult],
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let prefix = format!("{}_{}", exp_config.experiment.name, timestamp);

    let model_path = output_dir.join(format!("{}_model.csv", prefix));
    let mut writer = csv::Writer::from_path(&model_path)?;
    let mut header = vec![
        "run".to_string(),
        "iteration".to_string(),
        "seed".to_string(),
        "round".to_string(),
        "converged".to_string(),
        "grid_size".to_string(),
        "risk_distribution".to_string(),
        "adjust_every".to_string(),
        "adjust_payoff".to_string(),
        "percent_hawk".to_string(),
        "rolling_percent_hawk".to_string(),
        "max_agent_points".to_string(),
        "population_risk_category".to_string(),
        "risk_category_label".to_string(),
    ];
    for level in 0..RISK_LEVELS {
        header.push(format!("total_r{}", level));
    }
    writer.write_record(&header)?;
    for result in results {
        for row in &result.model_rows {
            writer.write_record(row)?;
        }
    }
    writer.flush()?;
    println!("Wrote {}", model_path.display());

    if output.save_agent_data {
        let agent_path = output_dir.join(format!("{}_agent.csv", prefix));
        let mut writer = csv::Writer::from_path(&agent_path)?;
        writer.write_record([
            "run",
            "iteration",
            "round",
            "agent",
            "risk_level",
            "choice",
            "points",
            "recent_points",
        ])?;
        for result in results {
            for row in &result.agent_rows {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
        println!("Wrote {}", agent_path.display());
    }
    Ok(())
}
