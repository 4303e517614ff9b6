mod shingle_jaccard;
mod simhash;

pub use shingle_jaccard::{ShingleJaccard, jaccard_similarity, shingle_fingerprint};
pub use simhash::{SimHashStrategy, hamming_distance, simhash};

use crate::crawler::crawler_config::{NearDuplicateConfig, SimilarityStrategyKind};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Too few tokens (or no sampled shingles) to say anything; nothing registered
    Unfingerprinted,
    /// Fingerprint registered
    Novel,
    /// Matches an earlier page with the given similarity; nothing registered
    NearDuplicate { similarity: f64 },
}

impl Verdict {
    pub fn is_near_duplicate(&self) -> bool {
        matches!(self, Verdict::NearDuplicate { .. })
    }
}

/// A way of fingerprinting token sequences and comparing them with everything
/// registered so far.
pub trait SimilarityStrategy: Send {
    fn name(&self) -> &'static str;

    /// Compares `tokens` with the registered fingerprints and registers the
    /// new fingerprint when the page is novel.
    fn check_and_register(&mut self, tokens: &[String]) -> Verdict;

    fn fingerprint_count(&self) -> usize;
}

pub fn strategy_from_config(config: &NearDuplicateConfig) -> Box<dyn SimilarityStrategy> {
    match config.strategy {
        SimilarityStrategyKind::ShingleJaccard => Box::new(ShingleJaccard::new(config)),
        SimilarityStrategyKind::SimHash => Box::new(SimHashStrategy::new(config)),
    }
}

/// Shared front for a [`SimilarityStrategy`]. The check and the registration
/// of a page happen under one lock, so two concurrent copies of the same page
/// cannot both come out novel.
pub struct NearDuplicateDetector {
    strategy: Mutex<Box<dyn SimilarityStrategy>>,
}

impl NearDuplicateDetector {
    pub fn new(config: &NearDuplicateConfig) -> Self {
        Self::with_strategy(strategy_from_config(config))
    }

    pub fn with_strategy(strategy: Box<dyn SimilarityStrategy>) -> Self {
        Self {
            strategy: Mutex::new(strategy),
        }
    }

    pub fn check(&self, tokens: &[String]) -> Verdict {
        self.strategy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check_and_register(tokens)
    }

    pub fn is_near_duplicate(&self, tokens: &[String]) -> bool {
        self.check(tokens).is_near_duplicate()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.strategy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fingerprint_count()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.lock().unwrap_or_else(PoisonError::into_inner).name()
    }
}

impl std::fmt::Debug for NearDuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearDuplicateDetector")
            .field("strategy", &self.strategy_name())
            .field("fingerprints", &self.fingerprint_count())
            .finish()
    }
}
