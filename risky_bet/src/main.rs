//! Risky Bet Simulation - Demo Run

use risky_bet::{RiskyBetConfig, RiskyBetModel};
use simrisk::Model;

fn main() {
    println!("=== Risky Bet Game ===\n");

    let config = RiskyBetConfig::default();
    let max_rounds = 1000;
    let seed = 42;

    println!("Configuration:");
    println!("  Grid: {}x{}", config.grid_size, config.grid_size);
    println!("  Adjust neighborhood: {}", config.adjust_neighborhood);
    println!("  Adjustment: every {} rounds", config.adjust_every);
    println!("  Seed: {}\n", seed);

    let mut model = match RiskyBetModel::new(config, seed) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    while model.running() && model.round() < max_rounds {
        model.advance_round();
        if model.round() % 100 == 0 || !model.running() {
            println!(
                "Round {:4}: payoff chance {:.2}, paid off {:5}, {:5.1}% risky",
                model.round(),
                model.prob_risky_payoff(),
                model.risky_payoff(),
                model.percent_risky() * 100.0,
            );
        }
    }

    println!("\nFinished after {} rounds", model.round());
    if !model.running() {
        println!("Population converged");
    }
    if let Some(rolling) = model.rolling_percent_risky() {
        println!("Final rolling average % risky: {:.1}", rolling * 100.0);
    }
    if let Some(summary) = model.risk_summary() {
        println!(
            "Risk levels: min {:.3} / median {:.3} / max {:.3} (mean {:.3})",
            summary.min, summary.median, summary.max, summary.mean
        );
    }
}
