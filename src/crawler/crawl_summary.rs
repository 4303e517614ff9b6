use crate::crawler::page_summary::PageSummary;
use url::Url;

#[derive(Debug, Clone)]
pub struct CrawlSummary {
    seed: Url,
    page_summaries: Vec<PageSummary>,
}

impl CrawlSummary {
    pub fn new(seed: Url) -> Self {
        Self {
            seed,
            page_summaries: Vec::new(),
        }
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn page_summaries(&self) -> &[PageSummary] {
        &self.page_summaries
    }

    pub fn add_page_summary(&mut self, page_summary: PageSummary) {
        self.page_summaries.push(page_summary);
    }

    /// Pages that made it through every gate.
    pub fn num_processed(&self) -> usize {
        self.page_summaries
            .iter()
            .filter(|summary| summary.outcome == "processed")
            .count()
    }
}
