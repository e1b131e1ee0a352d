//! Heavy-hitter extraction over decayed per-key frequencies

use super::decay::DecayCounter;
use super::types::PatternId;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One ranked key with its decayed frequency at ranking time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedKey {
    pub key: PatternId,
    pub value: f64,
}

/// Descending by value, ties broken by the higher key first
fn rank_order(a: &RankedKey, b: &RankedKey) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| b.key.cmp(&a.key))
}

/// Decay every counter to `now`, then return the top `k` keys
///
/// The decay pass touches every tracked key, so after this call all counters
/// in `frequencies` have `last_update == now` (unless `now` lies in their
/// past). Only the top `k` are fully sorted.
pub fn heavy_hitters(
    frequencies: &mut HashMap<PatternId, DecayCounter>,
    now: f64,
    k: usize,
) -> Vec<RankedKey> {
    if k == 0 || frequencies.is_empty() {
        // Every tracked key is decayed to `now`, whatever k is.
        for counter in frequencies.values_mut() {
            counter.update(now);
        }
        return Vec::new();
    }

    let mut ranked: Vec<RankedKey> = frequencies
        .iter_mut()
        .map(|(&key, counter)| RankedKey {
            key,
            value: counter.update(now),
        })
        .collect();

    if ranked.len() > k {
        ranked.select_nth_unstable_by(k - 1, rank_order);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(rank_order);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(i64, f64, f64)]) -> HashMap<PatternId, DecayCounter> {
        entries
            .iter()
            .map(|&(id, weight, at)| {
                let mut counter = DecayCounter::new(60.0).unwrap();
                counter.increment(weight, at);
                (PatternId(id), counter)
            })
            .collect()
    }

    fn keys(ranked: &[RankedKey]) -> Vec<i64> {
        ranked.iter().map(|r| r.key.0).collect()
    }

    #[test]
    fn test_orders_by_decayed_value() {
        // Key 1 was heavier but is older; after one half-life it reads 2.0
        let mut frequencies = table(&[(1, 4.0, 0.0), (2, 3.0, 60.0), (-3, 1.0, 60.0)]);
        let ranked = heavy_hitters(&mut frequencies, 60.0, 5);

        assert_eq!(keys(&ranked), vec![2, 1, -3]);
        assert!((ranked[1].value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_prefer_higher_id() {
        let mut frequencies = table(&[(-5, 1.0, 0.0), (7, 1.0, 0.0), (3, 1.0, 0.0), (12, 1.0, 0.0)]);
        let ranked = heavy_hitters(&mut frequencies, 0.0, 5);
        assert_eq!(keys(&ranked), vec![12, 7, 3, -5]);
    }

    #[test]
    fn test_truncates_to_k() {
        let entries: Vec<(i64, f64, f64)> = (1..=20).map(|i| (i, i as f64, 0.0)).collect();
        let mut frequencies = table(&entries);

        let ranked = heavy_hitters(&mut frequencies, 0.0, 5);
        assert_eq!(keys(&ranked), vec![20, 19, 18, 17, 16]);
    }

    #[test]
    fn test_repeated_ranking_is_stable() {
        let mut frequencies = table(&[(1, 2.0, 0.0), (2, 2.0, 0.0), (3, 1.0, 0.0), (4, 2.0, 0.0)]);

        let first = heavy_hitters(&mut frequencies, 30.0, 3);
        let second = heavy_hitters(&mut frequencies, 30.0, 3);
        assert_eq!(first, second);
        assert_eq!(keys(&first), vec![4, 2, 1]);
    }

    #[test]
    fn test_ranking_decays_every_key() {
        let mut frequencies = table(&[(1, 1.0, 0.0), (2, 5.0, 0.0), (3, 9.0, 0.0)]);
        heavy_hitters(&mut frequencies, 120.0, 1);

        for counter in frequencies.values() {
            assert_eq!(counter.last_update(), Some(120.0));
        }
        assert!((frequencies[&PatternId(1)].value() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table() {
        let mut frequencies = HashMap::new();
        assert!(heavy_hitters(&mut frequencies, 0.0, 5).is_empty());
    }
}
