//! Contaminated-food foraging game.
//!
//! No spatial structure: each round a fresh chance that the risky food
//! is uncontaminated is drawn, foragers choose risky or safe food by
//! weighing that chance against their risk attitude, and the population
//! then grows or shrinks in proportion to payoffs. This is the one game
//! whose population changes during a run.

use std::collections::BTreeMap;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simrisk::convergence::StabilityDetector;
use simrisk::sampling::weighted_choice;
use simrisk::stats::RiskSummary;
use simrisk::{ConfigError, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodChoice {
    Risky,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodStatus {
    Contaminated,
    NotContaminated,
}

/// Choose risky food when the chance it is uncontaminated beats the
/// forager's risk level. Strict comparison: equality plays safe, a
/// level of 1.0 always plays safe, a level of 0.0 takes any positive
/// chance.
pub fn choose(prob_notcontaminated: f64, risk_level: f64) -> FoodChoice {
    if prob_notcontaminated > risk_level {
        FoodChoice::Risky
    } else {
        FoodChoice::Safe
    }
}

/// Population seeding and payoff scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodMode {
    /// Uniform random risk levels; each forager spawns payoff - 1
    /// offspring per round.
    Range,
    /// Ten foragers at each of the eleven levels 0.0, 0.1, ..., 1.0;
    /// each level group is resized to floor(size * payoff / 2).
    Types,
}

impl FoodMode {
    pub fn name(self) -> &'static str {
        match self {
            FoodMode::Range => "range",
            FoodMode::Types => "types",
        }
    }

    /// Payoff for one choice given this round's food status. Safe food
    /// always pays 2; risky food pays off only when uncontaminated.
    pub fn payoff(self, choice: FoodChoice, status: FoodStatus) -> usize {
        match (choice, status) {
            (FoodChoice::Safe, _) => 2,
            (FoodChoice::Risky, FoodStatus::NotContaminated) => match self {
                FoodMode::Range => 3,
                FoodMode::Types => 4,
            },
            (FoodChoice::Risky, FoodStatus::Contaminated) => 1,
        }
    }
}

impl FromStr for FoodMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "range" => Ok(FoodMode::Range),
            "types" => Ok(FoodMode::Types),
            _ => Err(ConfigError::UnsupportedMode(s.to_string(), "range, types")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForagerAgent {
    pub id: usize,
    pub risk_level: f64,
    pub choice: Option<FoodChoice>,
    /// Payoff from the most recent round.
    pub payoff: usize,
}

impl ForagerAgent {
    fn new(id: usize, risk_level: f64) -> Self {
        ForagerAgent {
            id,
            risk_level,
            choice: None,
            payoff: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskyFoodConfig {
    /// Starting population in range mode; types mode always seeds 110.
    pub n: usize,
    pub mode: FoodMode,
}

impl Default for RiskyFoodConfig {
    fn default() -> Self {
        RiskyFoodConfig {
            n: 110,
            mode: FoodMode::Types,
        }
    }
}

pub struct RiskyFoodModel {
    agents: Vec<ForagerAgent>,
    rng: StdRng,
    mode: FoodMode,
    next_id: usize,
    round: usize,
    running: bool,
    prob_notcontaminated: f64,
    food_status: FoodStatus,
    // collected before propagation each round
    percent_risky: f64,
    collected_population: usize,
    risk_summary: Option<RiskSummary>,
    stability: StabilityDetector,
}

impl RiskyFoodModel {
    pub fn new(config: RiskyFoodConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let agents: Vec<ForagerAgent> = match config.mode {
            FoodMode::Types => {
                let mut agents = Vec::with_capacity(110);
                for level in 0..=10 {
                    for _ in 0..10 {
                        agents.push(ForagerAgent::new(agents.len(), level as f64 / 10.0));
                    }
                }
                agents
            }
            FoodMode::Range => {
                if config.n == 0 {
                    return Err(ConfigError::EmptyPopulation);
                }
                (0..config.n)
                    .map(|id| ForagerAgent::new(id, rng.random::<f64>()))
                    .collect()
            }
        };
        let next_id = agents.len();
        let collected_population = agents.len();
        Ok(RiskyFoodModel {
            agents,
            rng,
            mode: config.mode,
            next_id,
            round: 0,
            running: true,
            prob_notcontaminated: 0.0,
            food_status: FoodStatus::NotContaminated,
            percent_risky: 0.0,
            collected_population,
            risk_summary: None,
            stability: StabilityDetector::new(),
        })
    }

    /// One round with a known environment. `advance_round` draws the
    /// environment and delegates here.
    fn run_round(&mut self, prob_notcontaminated: f64, food_status: FoodStatus) {
        self.round += 1;
        self.prob_notcontaminated = prob_notcontaminated;
        self.food_status = food_status;

        let mode = self.mode;
        let mut risky = 0;
        for agent in &mut self.agents {
            let choice = choose(prob_notcontaminated, agent.risk_level);
            if choice == FoodChoice::Risky {
                risky += 1;
            }
            agent.choice = Some(choice);
            agent.payoff = mode.payoff(choice, food_status);
        }

        // Statistics describe the round as played, so they are taken
        // before propagation changes the population.
        self.percent_risky = risky as f64 / self.agents.len() as f64;
        self.collected_population = self.agents.len();
        let levels: Vec<f64> = self.agents.iter().map(|agent| agent.risk_level).collect();
        self.risk_summary = RiskSummary::of(&levels);

        self.stability.observe(self.percent_risky);
        if self.stability.is_stable() {
            self.running = false;
        }

        match self.mode {
            FoodMode::Types => self.propagate_types(),
            FoodMode::Range => self.propagate(),
        }
    }

    /// Each forager spawns payoff - 1 offspring at its own risk level,
    /// so the population multiplies by the payoff each round.
    fn propagate(&mut self) {
        let mut offspring = Vec::new();
        for agent in &self.agents {
            for _ in 1..agent.payoff {
                offspring.push(ForagerAgent::new(self.next_id, agent.risk_level));
                self.next_id += 1;
            }
        }
        self.agents.append(&mut offspring);
    }

    /// Resize each risk-level group to floor(size * payoff / 2),
    /// dropping from the group's tail or cloning at the same level.
    fn propagate_types(&mut self) {
        // Group by exact level. Levels are multiples of 0.1 fixed at
        // seeding, so bit-identical grouping is safe, and bit order on
        // non-negative floats is numeric order.
        let mut groups: BTreeMap<u64, Vec<ForagerAgent>> = BTreeMap::new();
        for agent in self.agents.drain(..) {
            groups.entry(agent.risk_level.to_bits()).or_default().push(agent);
        }
        for (_, mut group) in groups {
            let total = group.len();
            let payoff = group[0].payoff;
            let new_total = (total * payoff) / 2;
            let risk_level = group[0].risk_level;
            group.truncate(new_total);
            for _ in total.min(new_total)..new_total {
                group.push(ForagerAgent::new(self.next_id, risk_level));
                self.next_id += 1;
            }
            self.agents.append(&mut group);
        }
    }

    /// Current foragers (after the latest propagation).
    pub fn agents(&self) -> &[ForagerAgent] {
        &self.agents
    }

    /// Population of the most recently played round, before propagation.
    pub fn total_agents(&self) -> usize {
        self.collected_population
    }

    /// This round's chance that the risky food was uncontaminated.
    pub fn prob_notcontaminated(&self) -> f64 {
        self.prob_notcontaminated
    }

    pub fn contaminated(&self) -> bool {
        self.food_status == FoodStatus::Contaminated
    }

    /// Fraction of foragers who chose the risky food this round.
    pub fn percent_risky(&self) -> f64 {
        self.percent_risky
    }

    pub fn rolling_percent_risky(&self) -> Option<f64> {
        self.stability.latest_rolling()
    }

    /// Risk levels of the round as played, before propagation.
    pub fn risk_summary(&self) -> Option<RiskSummary> {
        self.risk_summary
    }

    /// Current foragers at the given risk level.
    pub fn total_agents_at_risk(&self, risk_level: f64) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.risk_level == risk_level)
            .count()
    }
}

impl Model for RiskyFoodModel {
    fn advance_round(&mut self) {
        if !self.running {
            return;
        }
        let prob = self.rng.random::<f64>();
        let status = weighted_choice(
            &mut self.rng,
            [FoodStatus::NotContaminated, FoodStatus::Contaminated],
            prob,
        );
        self.run_round(prob, status);
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

    #[test]
    fn choice_is_strictly_greater_than() {
        assert_eq!(choose(0.3, 0.2), FoodChoice::Risky);
        assert_eq!(choose(0.2, 0.2), FoodChoice::Safe);
        // The extremes never waver.
        assert_eq!(choose(0.99, 1.0), FoodChoice::Safe);
        assert_eq!(choose(0.01, 0.0), FoodChoice::Risky);
    }

    #[test]
    fn payoff_tables_per_mode() {
        for mode in [FoodMode::Range, FoodMode::Types] {
            assert_eq!(mode.payoff(FoodChoice::Safe, FoodStatus::Contaminated), 2);
            assert_eq!(
                mode.payoff(FoodChoice::Safe, FoodStatus::NotContaminated),
                2
            );
            assert_eq!(mode.payoff(FoodChoice::Risky, FoodStatus::Contaminated), 1);
        }
        assert_eq!(
            FoodMode::Range.payoff(FoodChoice::Risky, FoodStatus::NotContaminated),
            3
        );
        assert_eq!(
            FoodMode::Types.payoff(FoodChoice::Risky, FoodStatus::NotContaminated),
            4
        );
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("range".parse::<FoodMode>().unwrap(), FoodMode::Range);
        assert_eq!("Types".parse::<FoodMode>().unwrap(), FoodMode::Types);
        assert!("spatial".parse::<FoodMode>().is_err());
    }

    #[test]
    fn types_mode_seeds_ten_agents_per_level() {
        let model = RiskyFoodModel::new(RiskyFoodConfig::default(), 1).unwrap();
        assert_eq!(model.agents().len(), 110);
        for level in 0..=10 {
            assert_eq!(model.total_agents_at_risk(level as f64 / 10.0), 10);
        }
    }

    #[test]
    fn range_mode_rejects_empty_population() {
        let config = RiskyFoodConfig {
            n: 0,
            mode: FoodMode::Range,
        };
        assert!(matches!(
            RiskyFoodModel::new(config, 1),
            Err(ConfigError::EmptyPopulation)
        ));
    }

    #[test]
    fn uncontaminated_round_rewards_risk_takers() {
        let mut model = RiskyFoodModel::new(RiskyFoodConfig::default(), 1).unwrap();
        model.run_round(0.95, FoodStatus::NotContaminated);
        // Levels 0.0 through 0.9 went risky (0.95 beats them) and pay 4,
        // so their groups double; level 1.0 played safe and holds at 10.
        assert_relative_eq!(model.percent_risky(), 100.0 / 110.0);
        assert_eq!(model.total_agents(), 110);
        assert_eq!(model.agents().len(), 10 * 20 + 10);
        assert_eq!(model.total_agents_at_risk(0.0), 20);
        assert_eq!(model.total_agents_at_risk(1.0), 10);
    }

    #[test]
    fn contaminated_round_culls_risk_takers() {
        let mut model = RiskyFoodModel::new(RiskyFoodConfig::default(), 1).unwrap();
        model.run_round(0.05, FoodStatus::Contaminated);
        // Only level 0.0 went risky; it pays 1 and shrinks to 5.
        assert_relative_eq!(model.percent_risky(), 10.0 / 110.0);
        assert_eq!(model.total_agents_at_risk(0.0), 5);
        assert_eq!(model.total_agents_at_risk(0.1), 10);
        assert_eq!(model.agents().len(), 5 + 10 * 10);
    }

    #[test]
    fn range_mode_spawns_payoff_minus_one_offspring() {
        let config = RiskyFoodConfig {
            n: 4,
            mode: FoodMode::Range,
        };
        let mut model = RiskyFoodModel::new(config, 9).unwrap();
        model.run_round(1.1, FoodStatus::NotContaminated);
        // Every level is below 1.1, so all four went risky, paid 3 and
        // spawned two offspring each.
        assert_eq!(model.total_agents(), 4);
        assert_eq!(model.agents().len(), 12);
        // Offspring inherit the parent's level and fresh state.
        assert!(model
            .agents()
            .iter()
            .skip(4)
            .all(|agent| agent.choice.is_none() && agent.payoff == 0));
    }

    #[test]
    fn stats_describe_the_round_before_propagation() {
        let mut model = RiskyFoodModel::new(RiskyFoodConfig::default(), 2).unwrap();
        model.run_round(0.95, FoodStatus::NotContaminated);
        let summary = model.risk_summary().unwrap();
        // The pre-propagation population had one forager in ten at each
        // level, so its mean risk level is 0.5 even though propagation
        // has already reshaped the population.
        assert_relative_eq!(summary.mean, 0.5, epsilon = 1e-12);
        assert_eq!(model.total_agents(), 110);
        assert_ne!(model.agents().len(), 110);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let config = RiskyFoodConfig {
            n: 20,
            mode: FoodMode::Range,
        };
        let mut a = RiskyFoodModel::new(config.clone(), 33).unwrap();
        let mut b = RiskyFoodModel::new(config, 33).unwrap();
        for _ in 0..5 {
            a.advance_round();
            b.advance_round();
            assert_eq!(a.prob_notcontaminated(), b.prob_notcontaminated());
            assert_eq!(a.contaminated(), b.contaminated());
            assert_eq!(a.agents().len(), b.agents().len());
        }
    }
}
