//! Per-horizon aggregation and the multi-horizon window set
//!
//! Every configured half-life gets one [`KeyedAggregator`]: a positive and a
//! negative polarity counter plus one frequency counter per pattern id seen.
//! [`WindowSet`] owns the aggregators and fans each event out to all of them.

use super::decay::DecayCounter;
use super::ranking::{heavy_hitters, RankedKey};
use super::types::{MatchEvent, PatternId, Polarity};
use crate::error::ConfigError;
use std::collections::HashMap;

/// Decayed polarity totals of one horizon at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolaritySnapshot {
    pub positive: f64,
    pub negative: f64,
}

impl PolaritySnapshot {
    /// Share of positive evidence as a percentage, `None` when both are zero
    pub fn score(&self) -> Option<f64> {
        let total = self.positive + self.negative;
        if total > 0.0 {
            Some(self.positive / total * 100.0)
        } else {
            None
        }
    }
}

/// Decaying sentiment and frequency state for a single horizon
#[derive(Debug, Clone)]
pub struct KeyedAggregator {
    positive: DecayCounter,
    negative: DecayCounter,
    frequencies: HashMap<PatternId, DecayCounter>,
    /// Fresh counter cloned for every newly seen key
    template: DecayCounter,
}

impl KeyedAggregator {
    pub fn new(halflife: f64) -> Result<Self, ConfigError> {
        let template = DecayCounter::new(halflife)?;
        Ok(Self {
            positive: template.clone(),
            negative: template.clone(),
            frequencies: HashMap::new(),
            template,
        })
    }

    pub fn halflife(&self) -> f64 {
        self.template.halflife()
    }

    /// Apply one event: bump its key and its polarity, decay the other polarity
    pub fn observe(&mut self, event: &MatchEvent) {
        let now = event.timestamp;

        match event.polarity {
            Polarity::Positive => {
                self.positive.increment(event.weight, now);
                self.negative.update(now);
            }
            Polarity::Negative => {
                self.negative.increment(event.weight, now);
                self.positive.update(now);
            }
        }

        self.frequencies
            .entry(event.key)
            .or_insert_with(|| self.template.clone())
            .increment(event.weight, now);
    }

    /// Decay both polarity counters to `now` and return their values
    ///
    /// Frequency counters are left untouched; they only move during ranking.
    pub fn snapshot(&mut self, now: f64) -> PolaritySnapshot {
        PolaritySnapshot {
            positive: self.positive.update(now),
            negative: self.negative.update(now),
        }
    }

    /// Top `k` keys by decayed frequency at `now`
    ///
    /// Decays every tracked key forward to `now` as a side effect.
    pub fn heavy_hitters(&mut self, now: f64, k: usize) -> Vec<RankedKey> {
        heavy_hitters(&mut self.frequencies, now, k)
    }

    pub fn positive(&self) -> &DecayCounter {
        &self.positive
    }

    pub fn negative(&self) -> &DecayCounter {
        &self.negative
    }

    pub fn frequency(&self, key: PatternId) -> Option<&DecayCounter> {
        self.frequencies.get(&key)
    }

    pub fn distinct_keys(&self) -> usize {
        self.frequencies.len()
    }
}

/// The configured horizons, in configuration order
#[derive(Debug, Clone)]
pub struct WindowSet {
    aggregators: Vec<KeyedAggregator>,
}

impl WindowSet {
    pub fn new(horizons: &[f64]) -> Result<Self, ConfigError> {
        if horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }

        let aggregators = horizons
            .iter()
            .map(|&halflife| KeyedAggregator::new(halflife))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { aggregators })
    }

    pub fn horizons(&self) -> Vec<f64> {
        self.aggregators.iter().map(|a| a.halflife()).collect()
    }

    /// Fan an event out to every horizon
    pub fn observe(&mut self, event: &MatchEvent) {
        for aggregator in &mut self.aggregators {
            aggregator.observe(event);
        }
    }

    /// Polarity snapshot of the horizon with the given half-life
    pub fn snapshot(&mut self, halflife: f64, now: f64) -> Option<PolaritySnapshot> {
        self.get_mut(halflife).map(|a| a.snapshot(now))
    }

    pub fn get(&self, halflife: f64) -> Option<&KeyedAggregator> {
        self.aggregators.iter().find(|a| a.halflife() == halflife)
    }

    pub fn get_mut(&mut self, halflife: f64) -> Option<&mut KeyedAggregator> {
        self.aggregators.iter_mut().find(|a| a.halflife() == halflife)
    }

    pub fn aggregators(&self) -> &[KeyedAggregator] {
        &self.aggregators
    }

    pub fn aggregators_mut(&mut self) -> &mut [KeyedAggregator] {
        &mut self.aggregators
    }
}
