use crate::crawler::admission_gate::{Admission, AdmissionGate, Rejection};
use crate::crawler::crawl_error::{CrawlError, MalformedUrl};
use crate::crawler::crawl_report::CrawlReport;
use crate::crawler::crawl_response::CrawlResponse;
use crate::crawler::crawl_stats::CrawlStats;
use crate::crawler::crawler_config::CrawlerConfig;
use crate::crawler::link_extractor::LinkExtractor;
use crate::crawler::near_duplicate::{NearDuplicateDetector, Verdict};
use crate::crawler::trap_filter::{Eligibility, TrapFilter};
use crate::crawler::url_normalizer::{NormalizedUrl, normalize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// What happened to one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    MalformedUrl(MalformedUrl),
    Rejected(Rejection),
    NearDuplicate { similarity: f64 },
    /// The page was counted; `links` are the eligible outbound URLs
    Processed { links: Vec<NormalizedUrl> },
}

impl PageOutcome {
    pub fn links(&self) -> &[NormalizedUrl] {
        match self {
            PageOutcome::Processed { links } => links,
            _ => &[],
        }
    }

    pub fn into_links(self) -> Vec<NormalizedUrl> {
        match self {
            PageOutcome::Processed { links } => links,
            _ => Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageOutcome::MalformedUrl(_) => "malformed url",
            PageOutcome::Rejected(Rejection::UnsupportedResponse(_)) => "unsupported response",
            PageOutcome::Rejected(Rejection::ExactDuplicate) => "exact duplicate",
            PageOutcome::Rejected(Rejection::ParseFailure) => "parse failure",
            PageOutcome::Rejected(Rejection::TooFewWords { .. }) => "too few words",
            PageOutcome::Rejected(Rejection::SparseOversized { .. }) => "sparse oversized",
            PageOutcome::NearDuplicate { .. } => "near duplicate",
            PageOutcome::Processed { .. } => "processed",
        }
    }
}

/// Totals per outcome, for operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounts {
    pub processed: usize,
    pub malformed_urls: usize,
    pub unsupported_responses: usize,
    pub exact_duplicates: usize,
    pub parse_failures: usize,
    pub too_few_words: usize,
    pub sparse_oversized: usize,
    pub near_duplicates: usize,
    pub links_returned: usize,
    pub links_filtered: usize,
}

#[derive(Debug, Default)]
struct PageCounters {
    processed: AtomicUsize,
    malformed_urls: AtomicUsize,
    unsupported_responses: AtomicUsize,
    exact_duplicates: AtomicUsize,
    parse_failures: AtomicUsize,
    too_few_words: AtomicUsize,
    sparse_oversized: AtomicUsize,
    near_duplicates: AtomicUsize,
    links_returned: AtomicUsize,
    links_filtered: AtomicUsize,
}

impl PageCounters {
    fn count(&self, outcome: &PageOutcome) {
        let counter = match outcome {
            PageOutcome::MalformedUrl(_) => &self.malformed_urls,
            PageOutcome::Rejected(Rejection::UnsupportedResponse(_)) => &self.unsupported_responses,
            PageOutcome::Rejected(Rejection::ExactDuplicate) => &self.exact_duplicates,
            PageOutcome::Rejected(Rejection::ParseFailure) => &self.parse_failures,
            PageOutcome::Rejected(Rejection::TooFewWords { .. }) => &self.too_few_words,
            PageOutcome::Rejected(Rejection::SparseOversized { .. }) => &self.sparse_oversized,
            PageOutcome::NearDuplicate { .. } => &self.near_duplicates,
            PageOutcome::Processed { links } => {
                self.links_returned.fetch_add(links.len(), Ordering::Relaxed);
                &self.processed
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PageCounts {
        PageCounts {
            processed: self.processed.load(Ordering::Relaxed),
            malformed_urls: self.malformed_urls.load(Ordering::Relaxed),
            unsupported_responses: self.unsupported_responses.load(Ordering::Relaxed),
            exact_duplicates: self.exact_duplicates.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            too_few_words: self.too_few_words.load(Ordering::Relaxed),
            sparse_oversized: self.sparse_oversized.load(Ordering::Relaxed),
            near_duplicates: self.near_duplicates.load(Ordering::Relaxed),
            links_returned: self.links_returned.load(Ordering::Relaxed),
            links_filtered: self.links_filtered.load(Ordering::Relaxed),
        }
    }
}

/// Owns all deduplication and statistics state of one crawl and runs the
/// per-page pipeline: admission, near-duplicate check, statistics, link
/// extraction and trap filtering. Shared between crawlers behind an `Arc`.
#[derive(Debug)]
pub struct PageProcessor {
    admission_gate: AdmissionGate,
    near_duplicates: NearDuplicateDetector,
    link_extractor: LinkExtractor,
    trap_filter: TrapFilter,
    stats: CrawlStats,
    counters: PageCounters,
    top_words: usize,
}

impl PageProcessor {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        Self::with_detector(config, NearDuplicateDetector::new(&config.near_duplicate))
    }

    /// Uses `near_duplicates` instead of the strategy named in the config.
    pub fn with_detector(config: &CrawlerConfig, near_duplicates: NearDuplicateDetector) -> Result<Self, CrawlError> {
        config.validate()?;
        Ok(Self {
            admission_gate: AdmissionGate::new(&config.admission)?,
            near_duplicates,
            link_extractor: LinkExtractor::new()?,
            trap_filter: TrapFilter::new(config)?,
            stats: CrawlStats::new(&config.scope.stats_suffix),
            counters: PageCounters::default(),
            top_words: config.report.top_words,
        })
    }

    pub fn trap_filter(&self) -> &TrapFilter {
        &self.trap_filter
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn counts(&self) -> PageCounts {
        self.counters.snapshot()
    }

    pub fn report(&self) -> CrawlReport {
        self.stats.report(self.top_words)
    }

    /// Runs one fetched page through the pipeline. A page that fails any gate
    /// contributes nothing and yields no links.
    pub fn process(&self, requested_url: &str, response: Option<&CrawlResponse>) -> PageOutcome {
        let outcome = self.run(requested_url, response);
        self.counters.count(&outcome);
        match &outcome {
            PageOutcome::Processed { links } => {
                info!(url = requested_url, links = links.len(), "page processed")
            }
            other => debug!(url = requested_url, outcome = other.label(), "page skipped: {other:?}"),
        }
        outcome
    }

    fn run(&self, requested_url: &str, response: Option<&CrawlResponse>) -> PageOutcome {
        let effective_url = response
            .map(|response| response.effective_url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(requested_url);
        // Links resolve against the raw string that parsed, keeping its trailing slash
        let (page_url, base_url) = match normalize(effective_url, None) {
            Ok(page_url) => (page_url, effective_url),
            Err(_) => match normalize(requested_url, None) {
                Ok(page_url) => (page_url, requested_url),
                Err(e) => return PageOutcome::MalformedUrl(e),
            },
        };

        let page = match self.admission_gate.admit(response) {
            Admission::Admitted(page) => page,
            Admission::Rejected(rejection) => return PageOutcome::Rejected(rejection),
        };

        if let Verdict::NearDuplicate { similarity } = self.near_duplicates.check(&page.tokens) {
            return PageOutcome::NearDuplicate { similarity };
        }

        self.stats.record(&page_url, &page.tokens);

        let mut links = self.link_extractor.extract(&page.document, base_url);
        links.retain(|link| match self.trap_filter.check(link.as_str()) {
            Eligibility::Eligible => true,
            rejected => {
                debug!(link = link.as_str(), "link filtered: {rejected:?}");
                self.counters.links_filtered.fetch_add(1, Ordering::Relaxed);
                false
            }
        });
        for link in &links {
            self.stats.record_link(link);
        }

        PageOutcome::Processed { links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::admission_gate::UnsupportedResponse;
    use crate::crawler::near_duplicate::SimHashStrategy;

    const VOCABULARY: &[&str] = &[
        "algorithm", "compiler", "database", "network", "graphics", "security", "robotics",
        "language", "systems", "theory", "learning", "vision", "software", "hardware",
        "quantum", "biology", "statistics", "informatics", "privacy", "interface",
    ];

    fn config() -> CrawlerConfig {
        let mut config = CrawlerConfig::default();
        config.admission.min_words = 20;
        config.admission.sparse_words = 30;
        config
    }

    /// `count` filtered words drawn from a vocabulary offset by `seed`.
    fn words(count: usize, seed: usize) -> String {
        (0..count)
            .map(|i| format!("{}{}", VOCABULARY[(i + seed) % VOCABULARY.len()], letters(i + seed * 1000)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn letters(mut n: usize) -> String {
        let mut out = String::new();
        loop {
            out.push(char::from(b'a' + (n % 26) as u8));
            n /= 26;
            if n == 0 {
                break out;
            }
        }
    }

    fn html(body_words: &str, links: &[&str]) -> String {
        let anchors: String = links.iter().map(|href| format!("<a href=\"{href}\">x</a>")).collect();
        format!("<html><body><p>{body_words}</p>{anchors}</body></html>")
    }

    #[test]
    fn admitted_page_returns_eligible_links_and_updates_stats() {
        let processor = PageProcessor::new(&config()).unwrap();
        let response = CrawlResponse::html(
            "https://www.ics.uci.edu/dept/",
            html(
                &words(40, 0),
                &[
                    "people",
                    "/2024/01/15",
                    "https://www.google.com/",
                    "https://vision.ics.uci.edu/#top",
                    "mailto:chair@uci.edu",
                    "slides.pdf",
                ],
            ),
        );

        let outcome = processor.process("https://www.ics.uci.edu/dept", Some(&response));
        let links: Vec<&str> = outcome.links().iter().map(NormalizedUrl::as_str).collect();
        assert_eq!(links, vec!["https://vision.ics.uci.edu/", "https://www.ics.uci.edu/dept/people"]);

        let report = processor.report();
        assert_eq!(report.unique_pages, 1);
        assert_eq!(report.longest_page.map(|p| p.word_count), Some(40));
        assert_eq!(
            report.subdomains,
            vec![("vision.ics.uci.edu".to_string(), 1), ("www.ics.uci.edu".to_string(), 1)]
        );

        let counts = processor.counts();
        assert_eq!(counts.processed, 1);
        assert_eq!(counts.links_returned, 2);
        assert_eq!(counts.links_filtered, 3);
    }

    #[test]
    fn redirected_page_is_counted_under_its_effective_url() {
        let processor = PageProcessor::new(&config()).unwrap();
        let response = CrawlResponse::html("https://www.ics.uci.edu/new/home.html", html(&words(25, 1), &["next"]));

        let outcome = processor.process("https://www.ics.uci.edu/old", Some(&response));
        assert_eq!(outcome.links()[0].as_str(), "https://www.ics.uci.edu/new/next");
        assert!(processor.stats().contains_page("https://www.ics.uci.edu/new/home.html"));
    }

    #[test]
    fn near_duplicate_pages_contribute_nothing() {
        let processor = PageProcessor::new(&config()).unwrap();
        let text = words(300, 2);
        let first = CrawlResponse::html("https://www.ics.uci.edu/a", html(&text, &["/x"]));
        let second = CrawlResponse::html("https://www.ics.uci.edu/b", html(&text, &["/y"]));

        assert!(matches!(processor.process("https://www.ics.uci.edu/a", Some(&first)), PageOutcome::Processed { .. }));
        let outcome = processor.process("https://www.ics.uci.edu/b", Some(&second));
        assert!(matches!(outcome, PageOutcome::NearDuplicate { .. }));
        assert!(outcome.links().is_empty());
        assert_eq!(processor.report().unique_pages, 1);
        assert_eq!(processor.counts().near_duplicates, 1);
    }

    #[test]
    fn alternate_strategy_can_be_injected() {
        let config = config();
        let detector = NearDuplicateDetector::with_strategy(Box::new(SimHashStrategy::new(&config.near_duplicate)));
        let processor = PageProcessor::with_detector(&config, detector).unwrap();
        let text = words(100, 3);

        let first = CrawlResponse::html("https://www.ics.uci.edu/a", html(&text, &[]));
        let second = CrawlResponse::html("https://www.ics.uci.edu/b", html(&text, &["/extra"]));
        assert!(matches!(processor.process("https://www.ics.uci.edu/a", Some(&first)), PageOutcome::Processed { .. }));
        assert!(matches!(
            processor.process("https://www.ics.uci.edu/b", Some(&second)),
            PageOutcome::NearDuplicate { .. }
        ));
    }

    #[test]
    fn unresolvable_page_url_is_malformed() {
        let processor = PageProcessor::new(&config()).unwrap();
        let response = CrawlResponse::html("", html(&words(40, 4), &[]));
        assert!(matches!(processor.process("not a url", Some(&response)), PageOutcome::MalformedUrl(_)));
        assert_eq!(processor.counts().malformed_urls, 1);
    }

    #[test]
    fn unparseable_effective_url_falls_back_to_requested_url_for_links() {
        let processor = PageProcessor::new(&config()).unwrap();
        let response = CrawlResponse::html("http://[broken", html(&words(25, 5), &["next", "/top"]));

        let outcome = processor.process("https://www.ics.uci.edu/dept/", Some(&response));
        let links: Vec<&str> = outcome.links().iter().map(NormalizedUrl::as_str).collect();
        assert_eq!(links, vec!["https://www.ics.uci.edu/dept/next", "https://www.ics.uci.edu/top"]);
        assert!(processor.stats().contains_page("https://www.ics.uci.edu/dept"));
    }

    #[test]
    fn outcome_labels() {
        let unsupported = PageOutcome::Rejected(Rejection::UnsupportedResponse(UnsupportedResponse::Status(500)));
        assert_eq!(unsupported.label(), "unsupported response");
        assert_eq!(PageOutcome::Processed { links: Vec::new() }.label(), "processed");
    }
}
