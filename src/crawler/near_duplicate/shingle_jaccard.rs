use super::{SimilarityStrategy, Verdict};
use crate::crawler::crawler_config::NearDuplicateConfig;
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

/// Sampled hashes of every contiguous `shingle_size`-token window. Only
/// hashes divisible by `sample_modulus` are kept, which bounds the size of
/// the fingerprint at roughly `1 / sample_modulus` of the shingles.
pub fn shingle_fingerprint(tokens: &[String], shingle_size: usize, sample_modulus: u64) -> HashSet<u64> {
    if shingle_size == 0 || sample_modulus == 0 {
        return HashSet::new();
    }
    tokens
        .windows(shingle_size)
        .map(|shingle| xxh3_64(shingle.join(" ").as_bytes()))
        .filter(|hash| hash % sample_modulus == 0)
        .collect()
}

/// Intersection over union; two empty sets have similarity zero.
pub fn jaccard_similarity(lhs: &HashSet<u64>, rhs: &HashSet<u64>) -> f64 {
    let intersection = lhs.intersection(rhs).count();
    let union = lhs.len() + rhs.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Near-duplicate detection by Jaccard similarity of sampled shingle sets.
///
/// Every new fingerprint is compared with every registered one, so the cost
/// of a check grows linearly with the number of admitted pages.
#[derive(Debug, Clone)]
pub struct ShingleJaccard {
    shingle_size: usize,
    min_tokens: usize,
    sample_modulus: u64,
    threshold: f64,
    fingerprints: Vec<HashSet<u64>>,
}

impl ShingleJaccard {
    pub fn new(config: &NearDuplicateConfig) -> Self {
        Self {
            shingle_size: config.shingle_size,
            min_tokens: config.min_tokens,
            sample_modulus: config.sample_modulus,
            threshold: config.similarity_threshold,
            fingerprints: Vec::new(),
        }
    }
}

impl SimilarityStrategy for ShingleJaccard {
    fn name(&self) -> &'static str {
        "shingle_jaccard"
    }

    fn check_and_register(&mut self, tokens: &[String]) -> Verdict {
        if tokens.len() < self.min_tokens {
            return Verdict::Unfingerprinted;
        }
        let fingerprint = shingle_fingerprint(tokens, self.shingle_size, self.sample_modulus);
        if fingerprint.is_empty() {
            return Verdict::Unfingerprinted;
        }

        let duplicate_of = self
            .fingerprints
            .iter()
            .map(|seen| jaccard_similarity(&fingerprint, seen))
            .find(|similarity| *similarity >= self.threshold);
        match duplicate_of {
            Some(similarity) => Verdict::NearDuplicate { similarity },
            None => {
                self.fingerprints.push(fingerprint);
                Verdict::Novel
            }
        }
    }

    fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }
}
