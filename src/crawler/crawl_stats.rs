use crate::crawler::crawl_report::{CrawlReport, LongestPage};
use crate::crawler::url_normalizer::NormalizedUrl;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy)]
struct WordCount {
    count: u64,
    /// Position of the word's first sighting, used to order ties
    first_seen: usize,
}

#[derive(Debug, Default)]
struct StatsState {
    unique_pages: HashSet<String>,
    word_frequency: HashMap<String, WordCount>,
    longest_page: Option<LongestPage>,
    subdomain_pages: BTreeMap<String, HashSet<String>>,
}

/// Crawl-wide counters. All four structures sit behind one lock so a report
/// always sees them at the same point in time.
#[derive(Debug)]
pub struct CrawlStats {
    scope_suffix: String,
    state: Mutex<StatsState>,
}

impl CrawlStats {
    /// `scope_suffix` limits which hosts `record_link` counts, e.g. `.uci.edu`.
    pub fn new(scope_suffix: &str) -> Self {
        Self {
            scope_suffix: scope_suffix.to_lowercase(),
            state: Mutex::new(StatsState::default()),
        }
    }

    /// Counts an admitted, non-duplicate page.
    pub fn record(&self, url: &NormalizedUrl, tokens: &[String]) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.unique_pages.insert(url.as_str().to_string());

        for token in tokens {
            let next_order = state.word_frequency.len();
            state
                .word_frequency
                .entry(token.clone())
                .or_insert(WordCount {
                    count: 0,
                    first_seen: next_order,
                })
                .count += 1;
        }

        let longest_so_far = state.longest_page.as_ref().map_or(0, |page| page.word_count);
        if tokens.len() > longest_so_far {
            state.longest_page = Some(LongestPage {
                url: url.as_str().to_string(),
                word_count: tokens.len(),
            });
        }
    }

    /// Adds an outbound link to its subdomain's page set. Returns false when
    /// the host is outside the statistics scope.
    pub fn record_link(&self, url: &NormalizedUrl) -> bool {
        let host = url.host().to_lowercase();
        if !host.ends_with(self.scope_suffix.as_str()) {
            return false;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .subdomain_pages
            .entry(host)
            .or_default()
            .insert(url.as_str().to_string());
        true
    }

    pub fn unique_page_count(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).unique_pages.len()
    }

    pub fn longest_page(&self) -> Option<LongestPage> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .longest_page
            .clone()
    }

    pub fn contains_page(&self, url: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unique_pages
            .contains(url)
    }

    /// Point-in-time snapshot with the `top_words` most frequent words, ties
    /// in first-seen order, and subdomains sorted by host.
    pub fn report(&self, top_words: usize) -> CrawlReport {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut words: Vec<(&String, &WordCount)> = state.word_frequency.iter().collect();
        words.sort_by(|(_, lhs), (_, rhs)| {
            rhs.count.cmp(&lhs.count).then(lhs.first_seen.cmp(&rhs.first_seen))
        });

        CrawlReport {
            unique_pages: state.unique_pages.len(),
            longest_page: state.longest_page.clone(),
            top_words: words
                .into_iter()
                .take(top_words)
                .map(|(word, entry)| (word.clone(), entry.count))
                .collect(),
            subdomains: state
                .subdomain_pages
                .iter()
                .map(|(host, pages)| (host.clone(), pages.len()))
                .collect(),
        }
    }
}
