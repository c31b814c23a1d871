//! Risky Food Simulation - Demo Run

use risky_food::{RiskyFoodConfig, RiskyFoodModel};
use simrisk::Model;

fn main() {
    println!("=== Risky Food Foraging Game ===\n");

    let config = RiskyFoodConfig::default();
    // Population multiplies every round, so keep demo runs short.
    let max_rounds = 12;
    let seed = 42;

    println!("Configuration:");
    println!("  Mode: {}", config.mode.name());
    println!("  Seed: {}\n", seed);

    let mut model = match RiskyFoodModel::new(config, seed) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    while model.running() && model.round() < max_rounds {
        model.advance_round();
        println!(
            "Round {:2}: uncontaminated chance {:.2}, contaminated {:5}, \
             {:5.1}% risky, {} foragers",
            model.round(),
            model.prob_notcontaminated(),
            model.contaminated(),
            model.percent_risky() * 100.0,
            model.total_agents(),
        );
    }

    println!("\nFinished after {} rounds", model.round());
    if let Some(summary) = model.risk_summary() {
        println!(
            "Risk levels: min {:.2} / median {:.2} / max {:.2} (mean {:.3})",
            summary.min, summary.median, summary.max, summary.mean
        );
    }
    println!("Final population: {}", model.agents().len());
}
