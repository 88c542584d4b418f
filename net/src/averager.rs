//! Continuous exponentially-weighted moving average.
//!
//! Samples arrive at wall-clock instants; older samples lose half their
//! weight every half-life. Reading decays the running value to the
//! reader's clock, so a peer that stops producing samples fades instead of
//! holding its last estimate forever.

use std::time::{Duration, Instant};

/// EWMA over timestamped samples with a configured half-life.
#[derive(Debug, Clone)]
pub struct Averager {
    halflife: Duration,
    weighted_sum: f64,
    normalizer: f64,
    last_updated: Instant,
}

impl Averager {
    /// Start the average from an initial sample observed at `now`.
    pub fn new(initial: f64, halflife: Duration, now: Instant) -> Self {
        Self {
            halflife,
            weighted_sum: initial,
            normalizer: 1.0,
            last_updated: now,
        }
    }

    /// Fold a sample observed at `now` into the average.
    pub fn observe(&mut self, value: f64, now: Instant) {
        let weight = self.decay_since_update(now);
        self.weighted_sum = value + weight * self.weighted_sum;
        self.normalizer = 1.0 + weight * self.normalizer;
        self.last_updated = now;
    }

    /// The current average, decayed to the reader's clock.
    pub fn read(&self, now: Instant) -> f64 {
        self.decay_since_update(now) * self.weighted_sum / self.normalizer
    }

    fn decay_since_update(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_updated);
        0.5_f64.powf(elapsed.as_secs_f64() / self.halflife.as_secs_f64())
    }
}
