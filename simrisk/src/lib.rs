//! Shared toolkit for the risk-attitude simulations.
//!
//! Provides the pieces every game variant is built from:
//! - weighted sampling and risk-attitude distributions ([`sampling`])
//! - a toroidal single-occupancy grid with 4/8/24 neighborhoods ([`grid`])
//! - the periodic imitate/average adaptation machinery ([`adapt`])
//! - rolling-window convergence detection ([`convergence`])
//! - summary statistics for reporting ([`stats`])
//!
//! Each game crate implements [`Model`] so external collaborators (batch
//! runners, demo binaries) can drive any variant through the same seam.

pub mod adapt;
pub mod convergence;
pub mod error;
pub mod grid;
pub mod sampling;
pub mod stats;

pub use error::ConfigError;

/// A turn-based simulation advanced one full round at a time.
///
/// All state for round `r` is derived exclusively from state frozen at the
/// end of round `r-1`; implementations must not let agents observe each
/// other's in-progress choices. Once `running` goes false it stays false,
/// and further `advance_round` calls are no-ops.
pub trait Model {
    /// Run one complete round: environment, choices, payoffs, adaptation,
    /// statistics, convergence check.
    fn advance_round(&mut self);

    /// Whether the run is still going (false once converged).
    fn running(&self) -> bool;

    /// Number of fully completed rounds.
    fn round(&self) -> usize;
}

/// Drive a model until it converges or the round budget is exhausted.
/// Returns the number of completed rounds.
pub fn run_until_converged<M: Model>(model: &mut M, max_rounds: usize) -> usize {
    while model.running() && model.round() < max_rounds {
        model.advance_round();
    }
    model.round()
}
