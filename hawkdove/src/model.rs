//! Round orchestration for the Hawk-Dove game.
//!
//! All phases of a round operate on state frozen at the end of the
//! previous phase: choices are computed for every agent before any are
//! applied, payoffs before any are credited, and risk adjustments before
//! any levels change. No agent ever sees a neighbor's in-progress state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simrisk::adapt::{
    averaged_level, best_comparison, AdjustmentPolicy, AdjustmentSchedule, PayoffComparison,
};
use simrisk::convergence::{AttitudeShiftDetector, StabilityDetector};
use simrisk::error::check_probability;
use simrisk::grid::{Neighborhood, TorusGrid};
use simrisk::sampling::{coinflip, weighted_choice, RiskAttitudeGenerator};
use simrisk::stats::RiskSummary;
use simrisk::{ConfigError, Model};

use crate::agent::{decide, scaled_dove_count, HawkDoveAgent};
use crate::{
    HawkDoveConfig, PayoffMatrix, Play, RiskAttitudeMode, RiskState, MAX_RISK_LEVEL, RISK_LEVELS,
};

pub struct HawkDoveModel {
    grid: TorusGrid,
    agents: Vec<HawkDoveAgent>,
    rng: StdRng,
    play_hood: Neighborhood,
    observed_hood: Neighborhood,
    adjust_hood: Neighborhood,
    random_play_odds: f64,
    payoffs: PayoffMatrix,
    policy: Option<AdjustmentPolicy>,
    schedule: AdjustmentSchedule,
    adjust_payoff: PayoffComparison,
    round: usize,
    running: bool,
    stability: StabilityDetector,
    shift: Option<AttitudeShiftDetector>,
    // recomputed once per round
    percent_hawk: f64,
    risk_totals: [usize; RISK_LEVELS],
    risk_summary: Option<RiskSummary>,
    max_agent_points: f64,
}

impl HawkDoveModel {
    pub fn new(config: HawkDoveConfig, seed: u64) -> Result<Self, ConfigError> {
        check_probability("hawk_odds", config.hawk_odds)?;
        check_probability("random_play_odds", config.random_play_odds)?;
        let play_hood = Neighborhood::from_size(config.play_neighborhood)?;
        let observed_hood = Neighborhood::from_size(config.observed_neighborhood)?;
        let adjust_hood = Neighborhood::from_size(config.adjust_neighborhood)?;
        for hood in [play_hood, observed_hood, adjust_hood] {
            TorusGrid::check_fits(config.grid_size, hood)?;
        }
        let schedule = AdjustmentSchedule::new(config.adjust_every)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let grid = TorusGrid::populate(config.grid_size, &mut rng)?;
        let population = grid.len();

        let levels: Vec<usize> = match config.mode {
            RiskAttitudeMode::Single { level } => {
                if level > MAX_RISK_LEVEL {
                    return Err(ConfigError::RiskLevelOutOfBounds {
                        level,
                        min: 0,
                        max: MAX_RISK_LEVEL,
                    });
                }
                vec![level; population]
            }
            _ => {
                let mut generator =
                    RiskAttitudeGenerator::new(config.risk_distribution, 0, MAX_RISK_LEVEL)?;
                (0..population).map(|_| generator.sample(&mut rng)).collect()
            }
        };

        let agents: Vec<HawkDoveAgent> = levels
            .into_iter()
            .enumerate()
            .map(|(id, level)| {
                let choice = weighted_choice(&mut rng, [Play::Hawk, Play::Dove], config.hawk_odds);
                HawkDoveAgent::new(id, level, choice)
            })
            .collect();

        let shift = if config.mode.is_multi() {
            Some(AttitudeShiftDetector::new(config.adjust_every, population))
        } else {
            None
        };

        let mut model = HawkDoveModel {
            grid,
            agents,
            rng,
            play_hood,
            observed_hood,
            adjust_hood,
            random_play_odds: config.random_play_odds,
            payoffs: config.payoffs,
            policy: config.mode.adjustment(),
            schedule,
            adjust_payoff: config.adjust_payoff,
            round: 0,
            running: true,
            stability: StabilityDetector::new(),
            shift,
            percent_hawk: 0.0,
            risk_totals: [0; RISK_LEVELS],
            risk_summary: None,
            max_agent_points: 0.0,
        };
        model.collect();
        Ok(model)
    }

    fn choose_phase(&mut self) {
        let observed_size = self.observed_hood.size();
        let choices: Vec<Play> = (0..self.agents.len())
            .map(|id| {
                let doves = self
                    .grid
                    .neighbors_of(id, self.observed_hood)
                    .into_iter()
                    .filter(|&n| self.agents[n].choice == Play::Dove)
                    .count();
                decide(
                    scaled_dove_count(doves, observed_size),
                    self.agents[id].risk_level,
                )
            })
            .collect();
        let odds = self.random_play_odds;
        let rng = &mut self.rng;
        for (agent, choice) in self.agents.iter_mut().zip(choices) {
            agent.choice = if odds > 0.0 && rng.random::<f64>() < odds {
                coinflip(rng, [Play::Hawk, Play::Dove])
            } else {
                choice
            };
        }
    }

    fn play_phase(&mut self) {
        let payoffs: Vec<f64> = (0..self.agents.len())
            .map(|id| {
                self.grid
                    .neighbors_of(id, self.play_hood)
                    .into_iter()
                    .map(|n| {
                        self.payoffs
                            .payoff(self.agents[id].choice, self.agents[n].choice)
                    })
                    .sum()
            })
            .collect();
        for (agent, gain) in self.agents.iter_mut().zip(payoffs) {
            agent.points += gain;
            agent.recent_points += gain;
        }
    }

    fn adjust_phase(&mut self, policy: AdjustmentPolicy) {
        let comparison = self.adjust_payoff;
        let updates: Vec<Option<usize>> = (0..self.agents.len())
            .map(|id| {
                let mine = self.agents[id].comparison_points(comparison);
                let best = best_comparison(
                    self.grid
                        .neighbors_of(id, self.adjust_hood)
                        .into_iter()
                        .map(|n| (n, self.agents[n].comparison_points(comparison))),
                );
                match best {
                    Some((neighbor, theirs))
                        if theirs > mine
                            && self.agents[neighbor].risk_level != self.agents[id].risk_level =>
                    {
                        Some(match policy {
                            AdjustmentPolicy::Adopt => self.agents[neighbor].risk_level,
                            AdjustmentPolicy::Average => averaged_level(
                                self.agents[id].risk_level,
                                self.agents[neighbor].risk_level,
                            ),
                        })
                    }
                    _ => None,
                }
            })
            .collect();

        let mut changed = 0;
        for (agent, update) in self.agents.iter_mut().zip(updates) {
            // Averaging with a close neighbor can land back on the
            // agent's own level; only a real move counts as a change.
            if let Some(level) = update {
                if level != agent.risk_level {
                    agent.risk_level = level;
                    changed += 1;
                }
            }
            agent.recent_points = 0.0;
        }

        let totals = self.level_totals();
        if let Some(shift) = &mut self.shift {
            shift.record_adjustment(totals.to_vec(), changed);
        }
    }

    fn collect(&mut self) {
        let population = self.agents.len() as f64;
        let hawks = self
            .agents
            .iter()
            .filter(|agent| agent.choice == Play::Hawk)
            .count();
        self.percent_hawk = hawks as f64 / population;
        self.risk_totals = self.level_totals();
        let levels: Vec<f64> = self
            .agents
            .iter()
            .map(|agent| agent.risk_level as f64)
            .collect();
        self.risk_summary = RiskSummary::of(&levels);
        self.max_agent_points = self
            .agents
            .iter()
            .map(|agent| agent.points)
            .fold(0.0, f64::max);
    }

    fn level_totals(&self) -> [usize; RISK_LEVELS] {
        let mut totals = [0; RISK_LEVELS];
        for agent in &self.agents {
            totals[agent.risk_level] += 1;
        }
        totals
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn agents(&self) -> &[HawkDoveAgent] {
        &self.agents
    }

    /// Fraction of agents whose latest choice was HAWK.
    pub fn percent_hawk(&self) -> f64 {
        self.percent_hawk
    }

    /// Rolling average of [`percent_hawk`](Self::percent_hawk); `None`
    /// until enough rounds of history exist.
    pub fn rolling_percent_hawk(&self) -> Option<f64> {
        self.stability.latest_rolling()
    }

    /// Number of agents currently at the given risk level.
    pub fn total_at_risk_level(&self, level: usize) -> usize {
        self.risk_totals.get(level).copied().unwrap_or(0)
    }

    pub fn risk_summary(&self) -> Option<RiskSummary> {
        self.risk_summary
    }

    pub fn population_risk_category(&self) -> RiskState {
        RiskState::classify(&self.risk_totals)
    }

    pub fn max_agent_points(&self) -> f64 {
        self.max_agent_points
    }

    /// Whether the current round was an adjustment round.
    pub fn adjustment_round(&self) -> bool {
        self.policy.is_some() && self.schedule.is_adjustment_round(self.round)
    }

    /// Agents that changed risk level on the last adjustment round;
    /// `None` for non-adapting modes or before the first adjustment.
    pub fn agents_changed(&self) -> Option<usize> {
        self.shift.as_ref()?.agents_changed()
    }

    /// Total movement in per-level population counts between the two
    /// most recent adjustment rounds; `None` until both have happened.
    pub fn level_change(&self) -> Option<usize> {
        self.shift.as_ref()?.level_change()
    }
}

impl Model for HawkDoveModel {
    fn advance_round(&mut self) {
        if !self.running {
            return;
        }
        self.round += 1;
        // Round 1 plays the initial choices sampled at construction;
        // the neighbor-observation rule starts on round 2.
        if self.round > 1 {
            self.choose_phase();
        }
        self.play_phase();
        if self.schedule.is_adjustment_round(self.round) {
            match self.policy {
                Some(policy) => self.adjust_phase(policy),
                // The recent-payoff interval follows the schedule even
                // when nobody adapts.
                None => {
                    for agent in &mut self.agents {
                        agent.recent_points = 0.0;
                    }
                }
            }
        }
        self.collect();
        self.stability.observe(self.percent_hawk);
        let converged = match &self.shift {
            Some(shift) => shift.is_settled(self.round),
            None => self.stability.is_stable(),
        };
        if converged {
            self.running = false;
        }
    }

    fn running(&self) -> bool {
        self.running
    }

    fn round(&self) -> usize {
        self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_risk(level: usize) -> HawkDoveConfig {
        HawkDoveConfig {
            grid_size: 5,
            mode: RiskAttitudeMode::Single { level },
            ..HawkDoveConfig::default()
        }
    }

    #[test]
    fn bad_probability_rejected() {
        let config = HawkDoveConfig {
            hawk_odds: 1.5,
            ..HawkDoveConfig::default()
        };
        assert!(matches!(
            HawkDoveModel::new(config, 1),
            Err(ConfigError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn bad_neighborhood_rejected() {
        let config = HawkDoveConfig {
            observed_neighborhood: 6,
            ..HawkDoveConfig::default()
        };
        assert!(matches!(
            HawkDoveModel::new(config, 1),
            Err(ConfigError::UnsupportedNeighborhoodSize { size: 6 })
        ));
    }

    #[test]
    fn big_neighborhood_needs_big_grid() {
        let config = HawkDoveConfig {
            grid_size: 4,
            adjust_neighborhood: 24,
            ..HawkDoveConfig::default()
        };
        assert!(matches!(
            HawkDoveModel::new(config, 1),
            Err(ConfigError::NeighborhoodTooLarge { .. })
        ));
    }

    #[test]
    fn single_level_out_of_bounds_rejected() {
        assert!(matches!(
            HawkDoveModel::new(single_risk(10), 1),
            Err(ConfigError::RiskLevelOutOfBounds { level: 10, .. })
        ));
    }

    #[test]
    fn risk_zero_population_all_hawk_from_round_two() {
        let mut model = HawkDoveModel::new(single_risk(0), 42).unwrap();
        model.advance_round();
        model.advance_round();
        assert_relative_eq!(model.percent_hawk(), 1.0);
        assert!(model
            .agents()
            .iter()
            .all(|agent| agent.choice == Play::Hawk));
    }

    #[test]
    fn max_risk_population_all_dove_from_round_two() {
        let mut model = HawkDoveModel::new(single_risk(MAX_RISK_LEVEL), 42).unwrap();
        model.advance_round();
        model.advance_round();
        assert_relative_eq!(model.percent_hawk(), 0.0);
    }

    #[test]
    fn first_round_plays_the_choices_sampled_at_construction() {
        let config = HawkDoveConfig {
            hawk_odds: 1.0,
            ..single_risk(MAX_RISK_LEVEL)
        };
        let mut model = HawkDoveModel::new(config, 11).unwrap();
        model.advance_round();
        // Everyone was seeded HAWK, so the first round scores as all-hawk
        // even though the maximal risk level would pick DOVE.
        assert_relative_eq!(model.percent_hawk(), 1.0);
        assert!(model.agents().iter().all(|agent| agent.points == 0.0));
        model.advance_round();
        assert_relative_eq!(model.percent_hawk(), 0.0);
    }

    #[test]
    fn recent_points_reset_on_adjustment_rounds() {
        let config = HawkDoveConfig {
            grid_size: 5,
            adjust_every: 3,
            mode: RiskAttitudeMode::MultiAdopt,
            ..HawkDoveConfig::default()
        };
        let mut model = HawkDoveModel::new(config, 7).unwrap();
        for _ in 0..2 {
            model.advance_round();
        }
        assert!(!model.adjustment_round());
        assert!(model.agents().iter().any(|agent| agent.recent_points > 0.0));
        model.advance_round();
        assert!(model.adjustment_round());
        assert!(model
            .agents()
            .iter()
            .all(|agent| agent.recent_points == 0.0));
    }

    #[test]
    fn recent_points_reset_without_an_adaptation_policy() {
        let config = HawkDoveConfig {
            adjust_every: 2,
            ..single_risk(0)
        };
        let mut model = HawkDoveModel::new(config, 7).unwrap();
        model.advance_round();
        assert!(model.agents().iter().any(|agent| agent.recent_points > 0.0));
        model.advance_round();
        assert!(model.agents().iter().any(|agent| agent.points > 0.0));
        assert!(model
            .agents()
            .iter()
            .all(|agent| agent.recent_points == 0.0));
    }

    #[test]
    fn level_totals_account_for_everyone() {
        let model = HawkDoveModel::new(HawkDoveConfig::default(), 3).unwrap();
        let total: usize = (0..RISK_LEVELS)
            .map(|level| model.total_at_risk_level(level))
            .sum();
        assert_eq!(total, model.population());
        assert_eq!(model.population(), 100);
    }

    #[test]
    fn single_mode_never_adjusts() {
        let mut model = HawkDoveModel::new(single_risk(4), 9).unwrap();
        for _ in 0..12 {
            model.advance_round();
        }
        assert!(!model.adjustment_round());
        assert!(model.agents_changed().is_none());
        assert!(model.agents().iter().all(|agent| agent.risk_level == 4));
    }
}
