use super::{SimilarityStrategy, Verdict};
use crate::crawler::crawler_config::NearDuplicateConfig;
use std::collections::{HashMap, VecDeque};
use xxhash_rust::xxh3::xxh3_64;

/// 64-bit simhash of a token sequence, each distinct token weighted by its
/// number of occurrences.
pub fn simhash(tokens: &[String]) -> u64 {
    let mut weights: HashMap<&str, i64> = HashMap::new();
    for token in tokens {
        *weights.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut vector = [0i64; 64];
    for (token, weight) in weights {
        let hash = xxh3_64(token.as_bytes());
        for (bit, slot) in vector.iter_mut().enumerate() {
            if hash >> bit & 1 == 1 {
                *slot += weight;
            } else {
                *slot -= weight;
            }
        }
    }

    vector
        .iter()
        .enumerate()
        .filter(|(_, slot)| **slot > 0)
        .fold(0u64, |acc, (bit, _)| acc | 1 << bit)
}

pub fn hamming_distance(lhs: u64, rhs: u64) -> u32 {
    (lhs ^ rhs).count_ones()
}

/// Near-duplicate detection by Hamming distance between simhashes, against a
/// bounded first-in first-out history.
#[derive(Debug, Clone)]
pub struct SimHashStrategy {
    min_tokens: usize,
    max_distance: u32,
    history_size: usize,
    history: VecDeque<u64>,
}

impl SimHashStrategy {
    pub fn new(config: &NearDuplicateConfig) -> Self {
        Self {
            min_tokens: config.min_tokens,
            max_distance: config.max_hamming_distance,
            history_size: config.history_size.max(1),
            history: VecDeque::new(),
        }
    }
}

impl SimilarityStrategy for SimHashStrategy {
    fn name(&self) -> &'static str {
        "simhash"
    }

    fn check_and_register(&mut self, tokens: &[String]) -> Verdict {
        if tokens.len() < self.min_tokens {
            return Verdict::Unfingerprinted;
        }
        let hash = simhash(tokens);

        let closest = self
            .history
            .iter()
            .map(|seen| hamming_distance(hash, *seen))
            .find(|distance| *distance <= self.max_distance);
        if let Some(distance) = closest {
            return Verdict::NearDuplicate {
                similarity: 1.0 - f64::from(distance) / 64.0,
            };
        }

        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(hash);
        Verdict::Novel
    }

    fn fingerprint_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(prefix: &str, len: usize) -> Vec<String> {
        (0..len).map(|i| format!("{prefix}{i}")).collect()
    }

    fn strategy(history_size: usize) -> SimHashStrategy {
        SimHashStrategy::new(&NearDuplicateConfig {
            history_size,
            ..Default::default()
        })
    }

    #[test]
    fn simhash_is_deterministic() {
        let tokens = page("algorithm", 50);
        assert_eq!(simhash(&tokens), simhash(&tokens));
        assert_eq!(hamming_distance(simhash(&tokens), simhash(&tokens)), 0);
    }

    #[test]
    fn hamming_distance_counts_differing_bits() {
        assert_eq!(hamming_distance(0b1010, 0b0110), 2);
        assert_eq!(hamming_distance(0, u64::MAX), 64);
    }

    #[test]
    fn identical_pages_are_near_duplicates() {
        let mut strategy = strategy(10);
        let tokens = page("research", 120);

        assert_eq!(strategy.check_and_register(&tokens), Verdict::Novel);
        assert_eq!(
            strategy.check_and_register(&tokens),
            Verdict::NearDuplicate { similarity: 1.0 }
        );
        assert_eq!(strategy.fingerprint_count(), 1);
    }

    #[test]
    fn unrelated_pages_are_novel() {
        let mut strategy = strategy(10);
        assert_eq!(strategy.check_and_register(&page("biology", 200)), Verdict::Novel);
        assert_eq!(strategy.check_and_register(&page("compilers", 200)), Verdict::Novel);
    }

    #[test]
    fn history_is_bounded() {
        let mut strategy = strategy(2);
        let first = page("first", 200);

        assert_eq!(strategy.check_and_register(&first), Verdict::Novel);
        assert_eq!(strategy.check_and_register(&page("second", 200)), Verdict::Novel);
        assert_eq!(strategy.check_and_register(&page("third", 200)), Verdict::Novel);
        assert_eq!(strategy.fingerprint_count(), 2);
        assert_eq!(strategy.check_and_register(&first), Verdict::Novel);
    }

    #[test]
    fn short_pages_are_not_fingerprinted() {
        let mut strategy = strategy(10);
        assert_eq!(strategy.check_and_register(&page("x", 9)), Verdict::Unfingerprinted);
        assert_eq!(strategy.fingerprint_count(), 0);
    }
}
