//! Weighted coin flips and initial risk-attitude generation.

use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Normal, Triangular};

use crate::error::ConfigError;

/// Flip a weighted coin: returns `choices[0]` with probability `weight`.
pub fn weighted_choice<T: Copy>(rng: &mut impl Rng, choices: [T; 2], weight: f64) -> T {
    if rng.random::<f64>() < weight {
        choices[0]
    } else {
        choices[1]
    }
}

/// Flip a fair coin between the two choices.
pub fn coinflip<T: Copy>(rng: &mut impl Rng, choices: [T; 2]) -> T {
    weighted_choice(rng, choices, 0.5)
}

/// Statistical shape used to draw initial risk attitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDistribution {
    Uniform,
    Normal,
    SkewedLeft,
    SkewedRight,
    Bimodal,
}

impl RiskDistribution {
    pub fn name(self) -> &'static str {
        match self {
            RiskDistribution::Uniform => "uniform",
            RiskDistribution::Normal => "normal",
            RiskDistribution::SkewedLeft => "skewed left",
            RiskDistribution::SkewedRight => "skewed right",
            RiskDistribution::Bimodal => "bimodal",
        }
    }
}

impl FromStr for RiskDistribution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "uniform" => Ok(RiskDistribution::Uniform),
            "normal" => Ok(RiskDistribution::Normal),
            "skewed left" => Ok(RiskDistribution::SkewedLeft),
            "skewed right" => Ok(RiskDistribution::SkewedRight),
            "bimodal" => Ok(RiskDistribution::Bimodal),
            _ => Err(ConfigError::UnsupportedDistribution(s.to_string())),
        }
    }
}

/// Standard deviation for the normal and bimodal shapes.
const RISK_STD_DEV: f64 = 1.5;

enum Sampler {
    Uniform,
    Normal(Normal<f64>),
    Skewed(Triangular<f64>),
    Bimodal {
        low: Normal<f64>,
        high: Normal<f64>,
        next_high: bool,
    },
}

/// Draws one initial risk attitude per call, always within `[min, max]`.
///
/// Out-of-bounds draws are silently redrawn, except for the bimodal shape
/// which clamps into bounds instead. Consumed only while building the
/// starting population.
pub struct RiskAttitudeGenerator {
    min: usize,
    max: usize,
    sampler: Sampler,
}

impl RiskAttitudeGenerator {
    pub fn new(
        distribution: RiskDistribution,
        min: usize,
        max: usize,
    ) -> Result<Self, ConfigError> {
        if min >= max {
            return Err(ConfigError::InvalidRiskRange { min, max });
        }
        let range_err = ConfigError::InvalidRiskRange { min, max };
        let (lo, hi) = (min as f64, max as f64);
        let sampler = match distribution {
            RiskDistribution::Uniform => Sampler::Uniform,
            RiskDistribution::Normal => Sampler::Normal(
                Normal::new((lo + hi) / 2.0, RISK_STD_DEV).map_err(|_| range_err)?,
            ),
            RiskDistribution::SkewedLeft => {
                Sampler::Skewed(Triangular::new(lo, hi, lo).map_err(|_| range_err)?)
            }
            RiskDistribution::SkewedRight => {
                Sampler::Skewed(Triangular::new(lo, hi, hi).map_err(|_| range_err)?)
            }
            RiskDistribution::Bimodal => Sampler::Bimodal {
                low: Normal::new(lo, RISK_STD_DEV).map_err(|_| range_err.clone())?,
                high: Normal::new(hi, RISK_STD_DEV).map_err(|_| range_err)?,
                next_high: false,
            },
        };
        Ok(RiskAttitudeGenerator { min, max, sampler })
    }

    pub fn sample(&mut self, rng: &mut impl Rng) -> usize {
        let (lo, hi) = (self.min as f64, self.max as f64);
        match &mut self.sampler {
            Sampler::Uniform => rng.random_range(self.min..=self.max),
            Sampler::Normal(dist) => loop {
                let drawn = dist.sample(rng).round_ties_even();
                if drawn >= lo && drawn <= hi {
                    return drawn as usize;
                }
            },
            Sampler::Skewed(dist) => loop {
                let drawn = dist.sample(rng).round_ties_even();
                if drawn >= lo && drawn <= hi {
                    return drawn as usize;
                }
            },
            Sampler::Bimodal {
                low,
                high,
                next_high,
            } => {
                // alternate between the two peaks; clamp rather than redraw
                let dist = if *next_high { *high } else { *low };
                *next_high = !*next_high;
                dist.sample(rng).round_ties_even().clamp(lo, hi) as usize
            }
        }
    }
}
