use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerState {
    Crawling,
    Paused,
}

impl fmt::Display for CrawlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerState::Crawling => f.write_str("Crawling"),
            CrawlerState::Paused => f.write_str("Paused"),
        }
    }
}
