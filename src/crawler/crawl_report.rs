use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPage {
    pub url: String,
    pub word_count: usize,
}

/// Immutable snapshot of the crawl statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub unique_pages: usize,
    pub longest_page: Option<LongestPage>,
    /// Most frequent words, highest count first
    pub top_words: Vec<(String, u64)>,
    /// Distinct pages per subdomain, sorted by host
    pub subdomains: Vec<(String, usize)>,
}

impl CrawlReport {
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())
    }
}

/// Renders the plain text report file.
impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unique pages: {}", self.unique_pages)?;
        match &self.longest_page {
            Some(page) => {
                writeln!(f, "Longest word count url: {}", page.url)?;
                writeln!(f, "Longest word count: {}", page.word_count)?;
            }
            None => {
                writeln!(f, "Longest word count url: None")?;
                writeln!(f, "Longest word count: 0")?;
            }
        }
        for (word, count) in &self.top_words {
            writeln!(f, "{word}: {count}")?;
        }
        writeln!(f, "Total subdomains: {}", self.subdomains.len())?;
        for (host, count) in &self.subdomains {
            writeln!(f, "{host}: {count}")?;
        }
        Ok(())
    }
}
