//! Spatial Hawk-Dove game with risk attitudes.
//!
//! Agents on a toroidal grid repeatedly choose HAWK or DOVE based on how
//! many observed neighbors played DOVE last round, weighed against their
//! own risk attitude. Variants differ in how risk attitudes are assigned
//! (one shared level, or drawn from a distribution) and whether agents
//! periodically imitate their most successful neighbor.

use std::fmt;

use simrisk::adapt::AdjustmentPolicy;
use simrisk::adapt::PayoffComparison;
use simrisk::sampling::RiskDistribution;

pub mod agent;
pub mod model;

pub use agent::HawkDoveAgent;
pub use model::HawkDoveModel;

/// Highest discrete risk level. An agent at 0 always plays HAWK, an
/// agent at the maximum always plays DOVE.
pub const MAX_RISK_LEVEL: usize = 9;

/// Number of distinct risk levels (0 through [`MAX_RISK_LEVEL`]).
pub const RISK_LEVELS: usize = MAX_RISK_LEVEL + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Play {
    Hawk,
    Dove,
}

impl Play {
    pub fn name(self) -> &'static str {
        match self {
            Play::Hawk => "hawk",
            Play::Dove => "dove",
        }
    }
}

/// Payoff table for one interaction, from the row player's perspective.
///
/// Two variants are in use: the standard table scores DOVE/DOVE at 2.0,
/// the dove-bias table at 2.1 so mutual-dove outcomes break ties against
/// hawk/dove splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoffMatrix {
    dove_dove: f64,
}

impl PayoffMatrix {
    pub fn standard() -> Self {
        PayoffMatrix { dove_dove: 2.0 }
    }

    pub fn dove_bias() -> Self {
        PayoffMatrix { dove_dove: 2.1 }
    }

    pub fn payoff(self, mine: Play, theirs: Play) -> f64 {
        match (mine, theirs) {
            (Play::Hawk, Play::Dove) => 3.0,
            (Play::Dove, Play::Dove) => self.dove_dove,
            (Play::Dove, Play::Hawk) => 1.0,
            (Play::Hawk, Play::Hawk) => 0.0,
        }
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        PayoffMatrix::dove_bias()
    }
}

/// How risk attitudes are assigned and whether they adapt during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskAttitudeMode {
    /// Every agent shares one fixed risk level.
    Single { level: usize },
    /// Levels drawn from the configured distribution, fixed thereafter.
    Variable,
    /// Drawn levels, periodically adopting the best neighbor's level.
    MultiAdopt,
    /// Drawn levels, periodically averaging with the best neighbor.
    MultiAverage,
}

impl RiskAttitudeMode {
    /// The adaptation policy in effect, if any.
    pub fn adjustment(self) -> Option<AdjustmentPolicy> {
        match self {
            RiskAttitudeMode::Single { .. } | RiskAttitudeMode::Variable => None,
            RiskAttitudeMode::MultiAdopt => Some(AdjustmentPolicy::Adopt),
            RiskAttitudeMode::MultiAverage => Some(AdjustmentPolicy::Average),
        }
    }

    pub fn is_multi(self) -> bool {
        self.adjustment().is_some()
    }
}

/// Full parameter set for one run. Validated by
/// [`HawkDoveModel::new`], never silently clamped.
#[derive(Debug, Clone)]
pub struct HawkDoveConfig {
    pub grid_size: usize,
    /// Neighborhood sizes, each one of 4, 8 or 24.
    pub play_neighborhood: usize,
    pub observed_neighborhood: usize,
    pub adjust_neighborhood: usize,
    /// Probability an agent's initial choice is HAWK.
    pub hawk_odds: f64,
    /// Probability a computed choice is replaced by a fair coin flip.
    pub random_play_odds: f64,
    pub mode: RiskAttitudeMode,
    pub risk_distribution: RiskDistribution,
    /// Adaptation happens every this many rounds.
    pub adjust_every: usize,
    /// Payoff agents compare when sizing up neighbors.
    pub adjust_payoff: PayoffComparison,
    pub payoffs: PayoffMatrix,
}

impl Default for HawkDoveConfig {
    fn default() -> Self {
        HawkDoveConfig {
            grid_size: 10,
            play_neighborhood: 8,
            observed_neighborhood: 8,
            adjust_neighborhood: 8,
            hawk_odds: 0.5,
            random_play_odds: 0.0,
            mode: RiskAttitudeMode::MultiAdopt,
            risk_distribution: RiskDistribution::Uniform,
            adjust_every: 10,
            adjust_payoff: PayoffComparison::Total,
            payoffs: PayoffMatrix::default(),
        }
    }
}

/// Categorization of the population's mix of risk attitudes into one of
/// 13 states, keyed on which band holds an outright majority (>50%) and
/// whether the other two bands individually exceed 10%.
///
/// Bands over levels 0..=9: risk-inclined 0..=3, risk-moderate 4..=6,
/// risk-avoidant 7..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskState {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    C11,
    C12,
    C13,
}

impl RiskState {
    /// Classify per-level population totals (index = risk level).
    pub fn classify(totals: &[usize; RISK_LEVELS]) -> RiskState {
        let population: usize = totals.iter().sum();
        if population == 0 {
            return RiskState::C13;
        }
        let band = |range: std::ops::RangeInclusive<usize>| {
            range.map(|level| totals[level]).sum::<usize>() as f64 / population as f64
        };
        let inclined = band(0..=3);
        let moderate = band(4..=6);
        let avoidant = band(7..=9);

        if inclined > 0.5 {
            if moderate < 0.1 && avoidant < 0.1 {
                return RiskState::C1;
            }
            if moderate > 0.1 && avoidant < 0.1 {
                return RiskState::C2;
            }
            if moderate > 0.1 && avoidant > 0.1 {
                return RiskState::C3;
            }
            if moderate < 0.1 && avoidant > 0.1 {
                return RiskState::C4;
            }
        }
        if moderate > 0.5 {
            if inclined > 0.1 && avoidant < 0.1 {
                return RiskState::C5;
            }
            if inclined > 0.1 && avoidant > 0.1 {
                return RiskState::C6;
            }
            if inclined < 0.1 && avoidant < 0.1 {
                return RiskState::C7;
            }
            if inclined < 0.1 && avoidant > 0.1 {
                return RiskState::C8;
            }
        }
        if avoidant > 0.5 {
            if moderate < 0.1 && inclined > 0.1 {
                return RiskState::C9;
            }
            if moderate > 0.1 && inclined > 0.1 {
                return RiskState::C10;
            }
            if moderate > 0.1 && inclined < 0.1 {
                return RiskState::C11;
            }
            if moderate < 0.1 && inclined < 0.1 {
                return RiskState::C12;
            }
        }
        // No outright majority, or a minority band sits exactly at 10%.
        RiskState::C13
    }

    pub fn value(self) -> u8 {
        match self {
            RiskState::C1 => 1,
            RiskState::C2 => 2,
            RiskState::C3 => 3,
            RiskState::C4 => 4,
            RiskState::C5 => 5,
            RiskState::C6 => 6,
            RiskState::C7 => 7,
            RiskState::C8 => 8,
            RiskState::C9 => 9,
            RiskState::C10 => 10,
            RiskState::C11 => 11,
            RiskState::C12 => 12,
            RiskState::C13 => 13,
        }
    }

    pub fn category(self) -> &'static str {
        match self.value() {
            1..=4 => "majority risk inclined",
            5..=8 => "majority risk moderate",
            9..=12 => "majority risk avoidant",
            _ => "no majority",
        }
    }
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payoff_matrix_all_four_combinations() {
        let standard = PayoffMatrix::standard();
        assert_eq!(standard.payoff(Play::Hawk, Play::Dove), 3.0);
        assert_eq!(standard.payoff(Play::Dove, Play::Dove), 2.0);
        assert_eq!(standard.payoff(Play::Dove, Play::Hawk), 1.0);
        assert_eq!(standard.payoff(Play::Hawk, Play::Hawk), 0.0);

        let biased = PayoffMatrix::dove_bias();
        assert_eq!(biased.payoff(Play::Dove, Play::Dove), 2.1);
        assert_eq!(biased.payoff(Play::Hawk, Play::Dove), 3.0);
    }

    fn totals(pairs: &[(usize, usize)]) -> [usize; RISK_LEVELS] {
        let mut totals = [0; RISK_LEVELS];
        for &(level, count) in pairs {
            totals[level] = count;
        }
        totals
    }

    #[test]
    fn all_inclined_is_c1() {
        let state = RiskState::classify(&totals(&[(0, 1), (1, 1), (2, 1)]));
        assert_eq!(state, RiskState::C1);
        assert_eq!(state.category(), "majority risk inclined");
    }

    #[test]
    fn inclined_majority_with_moderate_minority_is_c2() {
        let state = RiskState::classify(&totals(&[(0, 1), (1, 1), (2, 1), (4, 1)]));
        assert_eq!(state, RiskState::C2);
    }

    #[test]
    fn all_moderate_is_c7() {
        let state = RiskState::classify(&totals(&[(4, 5), (5, 5), (6, 5)]));
        assert_eq!(state, RiskState::C7);
        assert_eq!(state.category(), "majority risk moderate");
    }

    #[test]
    fn all_avoidant_is_c12() {
        let state = RiskState::classify(&totals(&[(7, 3), (8, 3), (9, 4)]));
        assert_eq!(state, RiskState::C12);
        assert_eq!(state.category(), "majority risk avoidant");
    }

    #[test]
    fn even_three_way_split_is_c13() {
        let state = RiskState::classify(&totals(&[(0, 10), (5, 10), (9, 10)]));
        assert_eq!(state, RiskState::C13);
        assert_eq!(state.category(), "no majority");
    }

    #[test]
    fn exact_ten_percent_minority_is_c13() {
        // 60% inclined majority, but both minorities sit exactly at 10%
        // so neither the strict > nor the strict < branch matches.
        let state = RiskState::classify(&totals(&[(0, 12), (4, 2), (8, 2), (1, 4)]));
        assert_eq!(state, RiskState::C13);
    }

    #[test]
    fn mode_adjustment_policies() {
        assert_eq!(RiskAttitudeMode::Single { level: 3 }.adjustment(), None);
        assert_eq!(RiskAttitudeMode::Variable.adjustment(), None);
        assert_eq!(
            RiskAttitudeMode::MultiAdopt.adjustment(),
            Some(AdjustmentPolicy::Adopt)
        );
        assert_eq!(
            RiskAttitudeMode::MultiAverage.adjustment(),
            Some(AdjustmentPolicy::Average)
        );
        assert!(RiskAttitudeMode::MultiAdopt.is_multi());
        assert!(!RiskAttitudeMode::Variable.is_multi());
    }
}
