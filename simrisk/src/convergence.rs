//! Convergence detection over bounded rolling windows of per-round
//! summary statistics.

use std::collections::VecDeque;

use crate::adapt::round_half_even;

/// Number of recent rounds retained per tracked series.
pub const ROLLING_WINDOW: usize = 30;

/// Entries a window must exceed before its contents count as history.
pub const MIN_WINDOW: usize = 15;

/// Fixed-capacity window over the most recent observations of one series.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    cap: usize,
}

impl Default for RollingWindow {
    fn default() -> Self {
        RollingWindow::new(ROLLING_WINDOW)
    }
}

impl RollingWindow {
    pub fn new(cap: usize) -> Self {
        RollingWindow {
            values: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.cap {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// Declares a run stable once the tracked series' rolling mean stops
/// moving. The raw per-round values feed one window; once that window
/// holds more than [`MIN_WINDOW`] entries, each new rolling mean feeds a
/// second window. Stable when the second window also holds more than
/// [`MIN_WINDOW`] entries and every one of them rounds to the same value
/// at two decimal places (half-to-even).
#[derive(Debug, Clone, Default)]
pub struct StabilityDetector {
    values: RollingWindow,
    means: RollingWindow,
}

impl StabilityDetector {
    pub fn new() -> Self {
        StabilityDetector::default()
    }

    pub fn observe(&mut self, value: f64) {
        self.values.push(value);
        if self.values.len() > MIN_WINDOW {
            if let Some(mean) = self.values.mean() {
                self.means.push(mean);
            }
        }
    }

    /// Rolling mean over the raw-value window; `None` before the first
    /// observation.
    pub fn rolling_mean(&self) -> Option<f64> {
        self.values.mean()
    }

    /// Most recent rolling mean, available only once the raw window has
    /// accumulated enough history to start the second window.
    pub fn latest_rolling(&self) -> Option<f64> {
        self.means.latest()
    }

    pub fn is_stable(&self) -> bool {
        if self.means.len() <= MIN_WINDOW {
            return false;
        }
        let mut rounded = self.means.iter().map(round_centi);
        match rounded.next() {
            Some(first) => rounded.all(|value| value == first),
            None => false,
        }
    }
}

fn round_centi(value: f64) -> i64 {
    round_half_even(value * 100.0)
}

/// Convergence check for populations of adapting risk attitudes.
/// Records per-risk-level population totals on every adjustment round;
/// settled once at least `max(adjust_every, 50)` rounds have elapsed and
/// either no agent changed level on the last adjustment, or the summed
/// absolute change in totals between the two most recent adjustment
/// rounds is within a small fraction of the population.
#[derive(Debug, Clone)]
pub struct AttitudeShiftDetector {
    min_rounds: usize,
    population: usize,
    previous_totals: Option<Vec<usize>>,
    latest_totals: Option<Vec<usize>>,
    agents_changed: Option<usize>,
}

/// Fraction of the population's worth of level movement that still
/// counts as settled.
const SHIFT_TOLERANCE: f64 = 0.07;

impl AttitudeShiftDetector {
    pub fn new(adjust_every: usize, population: usize) -> Self {
        AttitudeShiftDetector {
            min_rounds: adjust_every.max(50),
            population,
            previous_totals: None,
            latest_totals: None,
            agents_changed: None,
        }
    }

    pub fn min_rounds(&self) -> usize {
        self.min_rounds
    }

    /// Record one adjustment round: the population total at each risk
    /// level and how many agents changed level.
    pub fn record_adjustment(&mut self, totals: Vec<usize>, agents_changed: usize) {
        self.previous_totals = self.latest_totals.take();
        self.latest_totals = Some(totals);
        self.agents_changed = Some(agents_changed);
    }

    /// Agents that changed level on the last adjustment round; `None`
    /// before the first one.
    pub fn agents_changed(&self) -> Option<usize> {
        self.agents_changed
    }

    /// Summed absolute change in per-level totals between the two most
    /// recent adjustment rounds; `None` until two rounds of history exist.
    pub fn level_change(&self) -> Option<usize> {
        let previous = self.previous_totals.as_ref()?;
        let latest = self.latest_totals.as_ref()?;
        Some(
            previous
                .iter()
                .zip(latest)
                .map(|(&a, &b)| a.abs_diff(b))
                .sum(),
        )
    }

    pub fn is_settled(&self, round: usize) -> bool {
        if round < self.min_rounds {
            return false;
        }
        match self.agents_changed {
            Some(0) => true,
            Some(_) => match self.level_change() {
                Some(change) => change as f64 <= SHIFT_TOLERANCE * self.population as f64,
                None => false,
            },
            None => false,
        }
    }
}
