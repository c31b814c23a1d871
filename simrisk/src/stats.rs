//! Per-round summary statistics for reported series.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median and quartiles via median-of-halves (the lower half excludes
/// the overall median for odd-length input).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let median = median_sorted(&sorted);
        let half = n / 2;
        let (lower, upper) = if n % 2 == 0 {
            (&sorted[..half], &sorted[half..])
        } else {
            (&sorted[..half], &sorted[half + 1..])
        };
        Some(Quartiles {
            q1: if lower.is_empty() {
                median
            } else {
                median_sorted(lower)
            },
            median,
            q3: if upper.is_empty() {
                median
            } else {
                median_sorted(upper)
            },
        })
    }
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Summary of a population's risk levels in one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl RiskSummary {
    pub fn of(levels: &[f64]) -> Option<Self> {
        let mean = mean(levels)?;
        let quartiles = Quartiles::of(levels)?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &level in levels {
            min = min.min(level);
            max = max.max(level);
        }
        Some(RiskSummary {
            mean,
            min,
            max,
            q1: quartiles.q1,
            median: quartiles.median,
            q3: quartiles.q3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_empty_is_none() {
        assert!(mean(&[]).is_none());
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn quartiles_odd_length() {
        // Lower half excludes the median for odd input.
        let q = Quartiles::of(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(q.q1, 1.5);
        assert_relative_eq!(q.median, 3.0);
        assert_relative_eq!(q.q3, 4.5);
    }

    #[test]
    fn quartiles_even_length() {
        let q = Quartiles::of(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(q.q1, 1.5);
        assert_relative_eq!(q.median, 2.5);
        assert_relative_eq!(q.q3, 3.5);
    }

    #[test]
    fn quartiles_unsorted_input() {
        let q = Quartiles::of(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(q.median, 3.0);
    }

    #[test]
    fn single_value_collapses() {
        let q = Quartiles::of(&[7.0]).unwrap();
        assert_relative_eq!(q.q1, 7.0);
        assert_relative_eq!(q.median, 7.0);
        assert_relative_eq!(q.q3, 7.0);
    }

    #[test]
    fn summary_tracks_extremes() {
        let summary = RiskSummary::of(&[0.0, 9.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(summary.min, 0.0);
        assert_relative_eq!(summary.max, 9.0);
        assert_relative_eq!(summary.mean, 4.5);
        assert_relative_eq!(summary.median, 4.5);
    }
}
