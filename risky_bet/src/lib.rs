//! Spatial risky-betting game.
//!
//! Gamblers on a toroidal grid start with equal wealth and a continuous
//! risk attitude in [0, 1): 0 is maximally risk-seeking, 1 maximally
//! risk-averse. Each round the chance of the risky bet paying off is
//! drawn fresh; gamblers bet risky when that chance beats their risk
//! level, multiplying wealth by 1.5 on a payoff and 0.5 otherwise. On
//! adjustment rounds gamblers may imitate their wealthiest neighbor,
//! after which everyone's wealth resets to even footing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simrisk::adapt::{
    averaged_level_continuous, best_comparison, AdjustmentPolicy, AdjustmentSchedule,
};
use simrisk::convergence::StabilityDetector;
use simrisk::grid::{Neighborhood, TorusGrid};
use simrisk::sampling::weighted_choice;
use simrisk::stats::RiskSummary;
use simrisk::{ConfigError, Model};

pub const INITIAL_WEALTH: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bet {
    Risky,
    Safe,
}

/// Bet risky when the payoff chance beats the gambler's risk level.
/// Strict comparison: a gambler at 0.0 takes any positive chance, and
/// equality plays safe.
pub fn choose(prob_risky_payoff: f64, risk_level: f64) -> Bet {
    if prob_risky_payoff > risk_level {
        Bet::Risky
    } else {
        Bet::Safe
    }
}

#[derive(Debug, Clone)]
pub struct Gambler {
    pub id: usize,
    pub risk_level: f64,
    pub wealth: f64,
    pub choice: Option<Bet>,
}

impl Gambler {
    fn new(id: usize, risk_level: f64) -> Self {
        Gambler {
            id,
            risk_level,
            wealth: INITIAL_WEALTH,
            choice: None,
        }
    }

    /// Apply one round's outcome: risky wealth swings by half either
    /// way, safe wealth stays put.
    fn settle(&mut self, bet: Bet, paid_off: bool) {
        if bet == Bet::Risky {
            self.wealth *= if paid_off { 1.5 } else { 0.5 };
        }
        self.choice = Some(bet);
    }
}

#[derive(Debug, Clone)]
pub struct RiskyBetConfig {
    pub grid_size: usize,
    /// Neighborhood searched for the wealthiest neighbor, one of 4, 8, 24.
    pub adjust_neighborhood: usize,
    pub adjust_every: usize,
    pub risk_adjustment: Option<AdjustmentPolicy>,
}

impl Default for RiskyBetConfig {
    fn default() -> Self {
        RiskyBetConfig {
            grid_size: 10,
            adjust_neighborhood: 4,
            adjust_every: 10,
            risk_adjustment: Some(AdjustmentPolicy::Adopt),
        }
    }
}

pub struct RiskyBetModel {
    grid: TorusGrid,
    agents: Vec<Gambler>,
    rng: StdRng,
    adjust_hood: Neighborhood,
    schedule: AdjustmentSchedule,
    policy: Option<AdjustmentPolicy>,
    round: usize,
    running: bool,
    prob_risky_payoff: f64,
    risky_payoff: bool,
    percent_risky: f64,
    stability: StabilityDetector,
}

impl RiskyBetModel {
    pub fn new(config: RiskyBetConfig, seed: u64) -> Result<Self, ConfigError> {
        let adjust_hood = Neighborhood::from_size(config.adjust_neighborhood)?;
        TorusGrid::check_fits(config.grid_size, adjust_hood)?;
        let schedule = AdjustmentSchedule::new(config.adjust_every)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let grid = TorusGrid::populate(config.grid_size, &mut rng)?;
        let agents: Vec<Gambler> = (0..grid.len())
            .map(|id| Gambler::new(id, rng.random::<f64>()))
            .collect();

        Ok(RiskyBetModel {
            grid,
            agents,
            rng,
            adjust_hood,
            schedule,
            policy: config.risk_adjustment,
            round: 0,
            running: true,
            prob_risky_payoff: 0.0,
            risky_payoff: false,
            percent_risky: 0.0,
            stability: StabilityDetector::new(),
        })
    }

    fn adjust_phase(&mut self, policy: AdjustmentPolicy) {
        let updates: Vec<Option<f64>> = (0..self.agents.len())
            .map(|id| {
                let mine = self.agents[id].wealth;
                let best = best_comparison(
                    self.grid
                        .neighbors_of(id, self.adjust_hood)
                        .into_iter()
                        .map(|n| (n, self.agents[n].wealth)),
                );
                match best {
                    Some((neighbor, wealth))
                        if wealth > mine
                            && self.agents[neighbor].risk_level != self.agents[id].risk_level =>
                    {
                        Some(match policy {
                            AdjustmentPolicy::Adopt => self.agents[neighbor].risk_level,
                            AdjustmentPolicy::Average => averaged_level_continuous(
                                self.agents[id].risk_level,
                                self.agents[neighbor].risk_level,
                            ),
                        })
                    }
                    _ => None,
                }
            })
            .collect();
        for (agent, update) in self.agents.iter_mut().zip(updates) {
            if let Some(level) = update {
                agent.risk_level = level;
            }
            // Everyone restarts the next interval on even footing.
            agent.wealth = INITIAL_WEALTH;
        }
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn agents(&self) -> &[Gambler] {
        &self.agents
    }

    /// This round's chance that the risky bet pays off.
    pub fn prob_risky_payoff(&self) -> f64 {
        self.prob_risky_payoff
    }

    /// Whether the risky bet actually paid off this round.
    pub fn risky_payoff(&self) -> bool {
        self.risky_payoff
    }

    /// Fraction of gamblers whose latest bet was risky.
    pub fn percent_risky(&self) -> f64 {
        self.percent_risky
    }

    pub fn rolling_percent_risky(&self) -> Option<f64> {
        self.stability.latest_rolling()
    }

    pub fn risk_summary(&self) -> Option<RiskSummary> {
        let levels: Vec<f64> = self.agents.iter().map(|agent| agent.risk_level).collect();
        RiskSummary::of(&levels)
    }

    pub fn adjustment_round(&self) -> bool {
        self.policy.is_some() && self.schedule.is_adjustment_round(self.round)
    }
}

impl Model for RiskyBetModel {
    fn advance_round(&mut self) {
        if !self.running {
            return;
        }
        self.round += 1;

        self.prob_risky_payoff = self.rng.random::<f64>();
        self.risky_payoff = weighted_choice(&mut self.rng, [true, false], self.prob_risky_payoff);

        let prob = self.prob_risky_payoff;
        let paid_off = self.risky_payoff;
        let mut risky = 0;
        for agent in &mut self.agents {
            let bet = choose(prob, agent.risk_level);
            if bet == Bet::Risky {
                risky += 1;
            }
            agent.settle(bet, paid_off);
        }
        self.percent_risky = risky as f64 / self.agents.len() as f64;

        if let Some(policy) = self.policy {
            if self.schedule.is_adjustment_round(self.round) {
                self.adjust_phase(policy);
            }
        }

        self.stability.observe(self.percent_risky);
        if self.stability.is_stable() {
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
