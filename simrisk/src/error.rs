use thiserror::Error;

/// Configuration problems detected at model construction.
///
/// These are always fatal: the run never starts, and the message names the
/// offending parameter and its valid set or range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{size} is not a supported neighborhood size; must be one of 4, 8, 24")]
    UnsupportedNeighborhoodSize { size: usize },

    #[error(
        "neighborhood size {size} does not fit on a {grid_size}x{grid_size} grid; \
         grid size must be at least {min_grid}"
    )]
    NeighborhoodTooLarge {
        size: usize,
        grid_size: usize,
        min_grid: usize,
    },

    #[error("grid size must be at least 1")]
    EmptyGrid,

    #[error("population must be at least 1")]
    EmptyPopulation,

    #[error("risk level {level} is out of bounds; must be between {min} and {max}")]
    RiskLevelOutOfBounds {
        level: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid risk level range {min}..={max}; min must be less than max")]
    InvalidRiskRange { min: usize, max: usize },

    #[error(
        "'{0}' is not a supported risk distribution; must be one of \
         uniform, normal, skewed left, skewed right, bimodal"
    )]
    UnsupportedDistribution(String),

    #[error("'{0}' is not a supported risk adjustment; must be one of none, adopt, average")]
    UnsupportedAdjustment(String),

    #[error("'{0}' is not a supported adjust payoff; must be one of recent, total")]
    UnsupportedPayoffComparison(String),

    #[error("adjustment frequency must be at least 1 round")]
    InvalidAdjustFrequency,

    #[error("{name} is {value} but must be a probability between 0.0 and 1.0")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("'{0}' is not a supported mode; must be one of {1}")]
    UnsupportedMode(String, &'static str),
}

/// Validate a probability-valued parameter, naming it in the error.
pub fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ConfigError::UnsupportedNeighborhoodSize { size: 6 };
        assert!(err.to_string().contains('6'));
        assert!(err.to_string().contains("4, 8, 24"));

        let err = ConfigError::RiskLevelOutOfBounds {
            level: 12,
            min: 0,
            max: 9,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("between 0 and 9"));
    }

    #[test]
    fn probability_bounds() {
        assert!(check_probability("hawk_odds", 0.0).is_ok());
        assert!(check_probability("hawk_odds", 1.0).is_ok());
        assert!(check_probability("hawk_odds", 1.5).is_err());
        assert!(check_probability("hawk_odds", -0.1).is_err());
    }
}
