//! Hawk-Dove agents and the per-round choice rule.

use simrisk::adapt::{round_half_even, PayoffComparison};

use crate::Play;

/// One agent on the grid. The agent's index in the model's vector is its
/// id and its cell assignment in the grid.
#[derive(Debug, Clone)]
pub struct HawkDoveAgent {
    pub id: usize,
    pub risk_level: usize,
    /// Choice played in the most recent round (the initial weighted coin
    /// flip before the first round).
    pub choice: Play,
    /// Cumulative payoff since the start of the run.
    pub points: f64,
    /// Payoff since the last adjustment round.
    pub recent_points: f64,
}

impl HawkDoveAgent {
    pub fn new(id: usize, risk_level: usize, choice: Play) -> Self {
        HawkDoveAgent {
            id,
            risk_level,
            choice,
            points: 0.0,
            recent_points: 0.0,
        }
    }

    /// Payoff used when neighbors compare success.
    pub fn comparison_points(&self, comparison: PayoffComparison) -> f64 {
        match comparison {
            PayoffComparison::Recent => self.recent_points,
            PayoffComparison::Total => self.points,
        }
    }
}

/// Rescale a dove count from an arbitrary observed-neighborhood size to
/// the 8-neighbor scale risk levels are calibrated against.
pub fn scaled_dove_count(dove_count: usize, observed_size: usize) -> usize {
    round_half_even(dove_count as f64 * 8.0 / observed_size as f64) as usize
}

/// The choice rule: play HAWK when enough observed neighbors dove last
/// round. Level 0 always hawks; the maximum level always doves, since
/// the scaled count never exceeds 8.
pub fn decide(scaled_dove_count: usize, risk_level: usize) -> Play {
    if scaled_dove_count >= risk_level {
        Play::Hawk
    } else {
        Play::Dove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_RISK_LEVEL;

    #[test]
    fn risk_zero_always_hawks() {
        for doves in 0..=8 {
            assert_eq!(decide(doves, 0), Play::Hawk);
        }
    }

    #[test]
    fn max_risk_always_doves() {
        for doves in 0..=8 {
            assert_eq!(decide(doves, MAX_RISK_LEVEL), Play::Dove);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(decide(5, 5), Play::Hawk);
        assert_eq!(decide(4, 5), Play::Dove);
    }

    #[test]
    fn dove_count_rescales_to_eight() {
        // 8-neighborhoods pass through unchanged.
        assert_eq!(scaled_dove_count(3, 8), 3);
        // 4-neighborhoods double.
        assert_eq!(scaled_dove_count(2, 4), 4);
        // 24-neighborhoods shrink by a third, banker's rounding on ties:
        // 7 * 8 / 24 = 2.33 -> 2, and 24 * 8 / 24 = 8.
        assert_eq!(scaled_dove_count(7, 24), 2);
        assert_eq!(scaled_dove_count(24, 24), 8);
    }

    #[test]
    fn comparison_points_track_the_configured_payoff() {
        let mut agent = HawkDoveAgent::new(0, 4, Play::Dove);
        agent.points = 30.0;
        agent.recent_points = 5.0;
        assert_eq!(agent.comparison_points(PayoffComparison::Total), 30.0);
        assert_eq!(agent.comparison_points(PayoffComparison::Recent), 5.0);
    }
}
