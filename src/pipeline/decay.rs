//! Exponentially time-decaying counter
//!
//! A single scalar that decays toward zero with a fixed half-life and can be
//! bumped by a weight. `value * exp(-λ·dt)` with `λ = ln 2 / halflife`, so a
//! unit of weight added at `t0` reads exactly `0.5` at `t0 + halflife`.
//!
//! Decay is only advanced by [`DecayCounter::update`] and
//! [`DecayCounter::increment`]; [`DecayCounter::value`] is a pure read.

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct DecayCounter {
    halflife: f64,
    decay_rate: f64,
    value: f64,
    last_update: Option<f64>,
}

impl DecayCounter {
    /// Create a counter with the given half-life in seconds
    ///
    /// Non-positive, NaN or infinite half-lives are rejected.
    pub fn new(halflife: f64) -> Result<Self, ConfigError> {
        if !halflife.is_finite() || halflife <= 0.0 {
            return Err(ConfigError::InvalidHalfLife(halflife));
        }

        Ok(Self {
            halflife,
            decay_rate: std::f64::consts::LN_2 / halflife,
            value: 0.0,
            last_update: None,
        })
    }

    pub fn halflife(&self) -> f64 {
        self.halflife
    }

    /// Current stored value, without advancing decay
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    /// Decay the stored value forward to `now` and return it
    pub fn update(&mut self, now: f64) -> f64 {
        self.decay_to(now);
        self.value
    }

    /// Decay to `now`, then add `weight`
    pub fn increment(&mut self, weight: f64, now: f64) {
        self.decay_to(now);
        self.value += weight;
    }

    fn decay_to(&mut self, now: f64) {
        let last = match self.last_update {
            Some(last) => last,
            None => {
                self.last_update = Some(now);
                return;
            }
        };

        // Clock skew: a stale timestamp neither amplifies nor rewinds.
        let dt = now - last;
        if dt <= 0.0 {
            return;
        }

        self.value *= (-self.decay_rate * dt).exp();
        self.last_update = Some(now);
    }
}
