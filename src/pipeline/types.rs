//! Core pipeline types: pattern ids, polarity, match events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed pattern identifier as assigned by the catalog
///
/// Negative ids belong to the negative lexicon, positive ids to the positive
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(pub i64);

impl PatternId {
    pub fn polarity(self) -> Polarity {
        if self.0 < 0 {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// One classified match, ready to be fanned out to every horizon
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEvent {
    pub key: PatternId,
    pub polarity: Polarity,
    /// Non-negative evidence weight
    pub weight: f64,
    /// Unix seconds
    pub timestamp: f64,
}

impl MatchEvent {
    /// Build an event whose polarity follows the sign of the key
    pub fn new(key: PatternId, weight: f64, timestamp: f64) -> Self {
        Self {
            key,
            polarity: key.polarity(),
            weight,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_follows_sign() {
        assert_eq!(PatternId(-1).polarity(), Polarity::Negative);
        assert_eq!(PatternId(-4000).polarity(), Polarity::Negative);
        assert_eq!(PatternId(1).polarity(), Polarity::Positive);
        assert_eq!(PatternId(0).polarity(), Polarity::Positive);
    }

    #[test]
    fn test_event_new_classifies() {
        let event = MatchEvent::new(PatternId(-7), 2.0, 10.0);
        assert_eq!(event.polarity, Polarity::Negative);
        assert_eq!(event.weight, 2.0);
    }
}
