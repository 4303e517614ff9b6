use crate::crawler::crawler_state::CrawlerState;
use tracing::{debug, info};
use url::Url;

pub trait ProgressReporter {
    fn begin(&self);
    fn progress_update(&self, num_urls_to_crawl: usize, num_urls_crawled: usize);
    fn progress_message(&self, message: &str);
    fn crawler_state_changed(&self, state: CrawlerState);
    fn end(&self);
}

/// Reports a seed crawler's progress through `tracing`.
#[derive(Clone, Debug)]
pub struct LogProgressReporter {
    index: usize,
    url: Url,
}

impl LogProgressReporter {
    pub fn new(index: usize, url: Url) -> Self {
        Self { index, url }
    }
}

impl ProgressReporter for LogProgressReporter {
    fn begin(&self) {
        info!(crawler = self.index, seed = %self.url, "crawler started");
    }

    fn progress_update(&self, num_urls_to_crawl: usize, num_urls_crawled: usize) {
        debug!(crawler = self.index, waiting = num_urls_to_crawl, crawled = num_urls_crawled, "progress");
    }

    fn progress_message(&self, message: &str) {
        debug!(crawler = self.index, "{message}");
    }

    fn crawler_state_changed(&self, state: CrawlerState) {
        debug!(crawler = self.index, %state, "state changed");
    }

    fn end(&self) {
        info!(crawler = self.index, seed = %self.url, "crawler finished");
    }
}
