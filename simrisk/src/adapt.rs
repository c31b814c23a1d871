//! Periodic risk-attitude adaptation: schedules, policies, and the
//! best-neighbor comparison shared by the grid-based games.

use std::str::FromStr;

use crate::error::ConfigError;

/// How an agent revises its risk attitude against its best neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentPolicy {
    /// Take the neighbor's risk level outright.
    Adopt,
    /// Move to the mean of the two levels (rounded for discrete models).
    Average,
}

impl AdjustmentPolicy {
    /// Parse the configured `risk_adjustment` setting; `none` (or empty)
    /// disables adjustment entirely.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(None),
            "adopt" => Ok(Some(AdjustmentPolicy::Adopt)),
            "average" => Ok(Some(AdjustmentPolicy::Average)),
            _ => Err(ConfigError::UnsupportedAdjustment(s.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AdjustmentPolicy::Adopt => "adopt",
            AdjustmentPolicy::Average => "average",
        }
    }
}

/// Which payoff agents compare when sizing up neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoffComparison {
    /// Payoff accrued since the last adjustment round.
    Recent,
    /// Cumulative payoff since the start of the run.
    Total,
}

impl PayoffComparison {
    pub fn name(self) -> &'static str {
        match self {
            PayoffComparison::Recent => "recent",
            PayoffComparison::Total => "total",
        }
    }
}

impl FromStr for PayoffComparison {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" => Ok(PayoffComparison::Recent),
            "total" => Ok(PayoffComparison::Total),
            _ => Err(ConfigError::UnsupportedPayoffComparison(s.to_string())),
        }
    }
}

/// Marks every Nth round as an adjustment round.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentSchedule {
    every: usize,
}

impl AdjustmentSchedule {
    pub fn new(every: usize) -> Result<Self, ConfigError> {
        if every == 0 {
            return Err(ConfigError::InvalidAdjustFrequency);
        }
        Ok(AdjustmentSchedule { every })
    }

    pub fn every(&self) -> usize {
        self.every
    }

    /// Is the given (1-based) round an adjustment round?
    pub fn is_adjustment_round(&self, round: usize) -> bool {
        round > 0 && round % self.every == 0
    }
}

/// Round half-to-even, the rounding rule used for every discrete
/// conversion in these models (pinned by tests: 2.5 rounds to 2).
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Averaged discrete risk level under the `average` policy.
pub fn averaged_level(mine: usize, theirs: usize) -> usize {
    round_half_even((mine + theirs) as f64 / 2.0) as usize
}

/// Averaged continuous risk level (no rounding).
pub fn averaged_level_continuous(mine: f64, theirs: f64) -> f64 {
    (mine + theirs) / 2.0
}

/// Scan `(agent index, comparison payoff)` candidates and return the one
/// with the highest payoff. Ties go to the first candidate encountered,
/// which is the grid iteration order.
pub fn best_comparison<I>(candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (id, payoff) in candidates {
        let replace = match best {
            None => true,
            Some((_, top)) => payoff > top,
        };
        if replace {
            best = Some((id, payoff));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parsing() {
        assert_eq!(AdjustmentPolicy::parse_optional("none").unwrap(), None);
        assert_eq!(
            AdjustmentPolicy::parse_optional("adopt").unwrap(),
            Some(AdjustmentPolicy::Adopt)
        );
        assert_eq!(
            AdjustmentPolicy::parse_optional("Average").unwrap(),
            Some(AdjustmentPolicy::Average)
        );
        assert!(AdjustmentPolicy::parse_optional("bogus").is_err());
    }

    #[test]
    fn payoff_comparison_parsing() {
        assert_eq!(
            "recent".parse::<PayoffComparison>().unwrap(),
            PayoffComparison::Recent
        );
        assert_eq!(
            "total".parse::<PayoffComparison>().unwrap(),
            PayoffComparison::Total
        );
        assert!("bogus".parse::<PayoffComparison>().is_err());
    }

    #[test]
    fn adjustment_rounds_every_three() {
        let schedule = AdjustmentSchedule::new(3).unwrap();
        let adjustment_rounds: Vec<usize> = (1..=9)
            .filter(|&round| schedule.is_adjustment_round(round))
            .collect();
        assert_eq!(adjustment_rounds, vec![3, 6, 9]);
    }

    #[test]
    fn round_zero_is_never_an_adjustment_round() {
        let schedule = AdjustmentSchedule::new(1).unwrap();
        assert!(!schedule.is_adjustment_round(0));
        assert!(schedule.is_adjustment_round(1));
    }

    #[test]
    fn zero_frequency_rejected() {
        assert!(matches!(
            AdjustmentSchedule::new(0),
            Err(ConfigError::InvalidAdjustFrequency)
        ));
    }

    #[test]
    fn half_to_even_rounding() {
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(2.4), 2);
        assert_eq!(round_half_even(2.6), 3);
        assert_eq!(round_half_even(-0.5), 0);
    }

    #[test]
    fn averaged_level_uses_bankers_rounding() {
        // mean(2, 3) = 2.5 rounds down to the even value
        assert_eq!(averaged_level(2, 3), 2);
        // mean(3, 4) = 3.5 rounds up to the even value
        assert_eq!(averaged_level(3, 4), 4);
        assert_eq!(averaged_level(2, 6), 4);
        assert_eq!(averaged_level(5, 5), 5);
    }

    #[test]
    fn best_comparison_first_max_wins() {
        let best = best_comparison(vec![(10, 5.0), (11, 9.0), (12, 9.0), (13, 2.0)]);
        assert_eq!(best, Some((11, 9.0)));
        assert_eq!(best_comparison(Vec::<(usize, f64)>::new()), None);
    }
}
