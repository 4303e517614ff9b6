use crate::crawler::page_processor::PageOutcome;
use crate::crawler::url_normalizer::NormalizedUrl;

/// One line of a seed crawler's log of fetched pages.
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub url: NormalizedUrl,
    pub status_code: Option<u16>,
    pub outcome: &'static str,
    pub num_links: usize,
}

impl PageSummary {
    pub fn new(url: NormalizedUrl, status_code: Option<u16>, outcome: &PageOutcome) -> Self {
        Self {
            url,
            status_code,
            outcome: outcome.label(),
            num_links: outcome.links().len(),
        }
    }

    pub fn denied_by_robots_txt(url: NormalizedUrl) -> Self {
        Self {
            url,
            status_code: None,
            outcome: "denied by robots.txt",
            num_links: 0,
        }
    }
}
