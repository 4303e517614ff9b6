use crate::crawler::url_normalizer::NormalizedUrl;
use std::collections::{HashSet, VecDeque};

/// Per-seed frontier: URLs waiting to be fetched, in discovery order, and
/// every URL ever queued so none is fetched twice.
#[derive(Clone, Debug, Default)]
pub struct CrawlContext {
    urls_to_crawl: VecDeque<NormalizedUrl>,
    urls_already_seen: HashSet<NormalizedUrl>,
    num_urls_crawled: usize,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_url_to_crawl(&mut self, url: &NormalizedUrl) {
        if self.urls_already_seen.insert(url.clone()) {
            self.urls_to_crawl.push_back(url.clone());
        }
    }

    pub fn add_urls_to_crawl(&mut self, urls: &[NormalizedUrl]) {
        for url in urls {
            self.add_url_to_crawl(url);
        }
    }

    /// Takes the oldest queued URL and counts it as crawled.
    pub fn pop_url_to_crawl(&mut self) -> Option<NormalizedUrl> {
        let url = self.urls_to_crawl.pop_front()?;
        self.num_urls_crawled += 1;
        Some(url)
    }

    pub fn is_crawling_complete(&self) -> bool {
        self.urls_to_crawl.is_empty()
    }

    /// (waiting, crawled)
    pub fn progress(&self) -> (usize, usize) {
        (self.urls_to_crawl.len(), self.num_urls_crawled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::url_normalizer::normalize;

    fn url(input: &str) -> NormalizedUrl {
        normalize(input, None).unwrap()
    }

    #[test]
    fn urls_are_crawled_once_in_discovery_order() {
        let mut context = CrawlContext::new();
        context.add_urls_to_crawl(&[url("https://www.ics.uci.edu/a"), url("https://www.ics.uci.edu/b")]);
        assert_eq!(context.pop_url_to_crawl(), Some(url("https://www.ics.uci.edu/a")));

        context.add_url_to_crawl(&url("https://www.ics.uci.edu/a"));
        context.add_url_to_crawl(&url("https://www.ics.uci.edu/b"));
        context.add_url_to_crawl(&url("https://www.ics.uci.edu/c"));
        assert_eq!(context.progress(), (2, 1));

        assert_eq!(context.pop_url_to_crawl(), Some(url("https://www.ics.uci.edu/b")));
        assert_eq!(context.pop_url_to_crawl(), Some(url("https://www.ics.uci.edu/c")));
        assert!(context.is_crawling_complete());
        assert_eq!(context.pop_url_to_crawl(), None);
        assert_eq!(context.progress(), (0, 3));
    }
}
