//! Hawk-Dove Risk Attitude Simulation - Demo Run
//!
//! Runs a single multi-risk game with adopting adaptation and prints
//! the population's trajectory.

use hawkdove::{HawkDoveConfig, HawkDoveModel, RiskAttitudeMode, MAX_RISK_LEVEL};
use simrisk::Model;

fn main() {
    println!("=== Hawk-Dove Game with Adapting Risk Attitudes ===\n");

    let config = HawkDoveConfig {
        grid_size: 10,
        mode: RiskAttitudeMode::MultiAdopt,
        ..HawkDoveConfig::default()
    };
    let max_rounds = 500;
    let seed = 42;

    println!("Configuration:");
    println!("  Grid: {}x{}", config.grid_size, config.grid_size);
    println!(
        "  Neighborhoods (play/observed/adjust): {}/{}/{}",
        config.play_neighborhood, config.observed_neighborhood, config.adjust_neighborhood
    );
    println!("  Risk distribution: {}", config.risk_distribution.name());
    println!("  Adjustment: every {} rounds", config.adjust_every);
    println!("  Seed: {}\n", seed);

    let mut model = match HawkDoveModel::new(config, seed) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    while model.running() && model.round() < max_rounds {
        model.advance_round();
        if model.round() % 50 == 0 || !model.running() {
            println!(
                "Round {:4}: {:5.1}% hawk, risk state {}",
                model.round(),
                model.percent_hawk() * 100.0,
                model.population_risk_category(),
            );
        }
    }

    println!("\nFinished after {} rounds", model.round());
    if !model.running() {
        println!("Population converged");
    }
    println!(
        "Final % hawk: {:.1}",
        model.percent_hawk() * 100.0
    );
    if let Some(rolling) = model.rolling_percent_hawk() {
        println!("Final rolling average % hawk: {:.1}", rolling * 100.0);
    }
    if let Some(summary) = model.risk_summary() {
        println!(
            "Risk levels: min {} / median {} / max {} (mean {:.2})",
            summary.min, summary.median, summary.max, summary.mean
        );
    }
    println!(
        "Population risk state: {} ({})",
        model.population_risk_category(),
        model.population_risk_category().category()
    );

    println!("\nAgents at each risk level:");
    for level in 0..=MAX_RISK_LEVEL {
        println!("  level {}: {:3}", level, model.total_at_risk_level(level));
    }
}
