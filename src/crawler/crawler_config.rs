use crate::crawler::crawl_error::CrawlError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every tunable of a crawl. Each section falls back to its defaults, so a
/// TOML file only has to name the values it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub crawl: CrawlSettings,
    pub scope: ScopeConfig,
    pub traps: TrapConfig,
    pub query: QueryConfig,
    pub admission: AdmissionConfig,
    pub near_duplicate: NearDuplicateConfig,
    pub report: ReportConfig,
}

impl CrawlerConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CrawlError> {
        let config: CrawlerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Collects every problem so a bad file can be fixed in one pass.
    pub fn validate(&self) -> Result<(), CrawlError> {
        let mut errors: Vec<String> = Vec::new();

        if self.scope.allowed_suffixes.is_empty() {
            errors.push("scope.allowed_suffixes must not be empty".to_string());
        }
        if let Some(rate) = self.crawl.requests_per_second {
            if !(rate > 0.0) {
                errors.push(format!("crawl.requests_per_second must be positive, got {rate}"));
            }
        }
        for pattern in self.traps.path_patterns.iter().chain(&self.traps.query_patterns) {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(format!("trap pattern `{pattern}` does not compile: {e}"));
            }
        }

        let near_duplicate = &self.near_duplicate;
        if near_duplicate.shingle_size == 0 {
            errors.push("near_duplicate.shingle_size must be at least 1".to_string());
        }
        if near_duplicate.sample_modulus == 0 {
            errors.push("near_duplicate.sample_modulus must be at least 1".to_string());
        }
        if !(near_duplicate.similarity_threshold > 0.0 && near_duplicate.similarity_threshold <= 1.0) {
            errors.push(format!(
                "near_duplicate.similarity_threshold must be in (0, 1], got {}",
                near_duplicate.similarity_threshold
            ));
        }
        if near_duplicate.max_hamming_distance > 64 {
            errors.push("near_duplicate.max_hamming_distance cannot exceed 64".to_string());
        }
        if near_duplicate.history_size == 0 {
            errors.push("near_duplicate.history_size must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CrawlError::InvalidConfig(errors))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Pages fetched per seed before its crawler stops
    pub max_pages: usize,
    pub requests_per_second: Option<f64>,
    pub user_agent: String,
    pub seeds: Vec<String>,
}

impl CrawlSettings {
    pub fn crawl_delay(&self) -> Option<std::time::Duration> {
        self.requests_per_second
            .map(|rate| std::time::Duration::from_millis((1000.0 / rate) as u64))
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            requests_per_second: Some(2.0),
            user_agent: "campus-spider".to_string(),
            seeds: strings(&[
                "https://www.ics.uci.edu",
                "https://www.cs.uci.edu",
                "https://www.informatics.uci.edu",
                "https://www.stat.uci.edu",
            ]),
        }
    }
}

/// Which hosts belong to the crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub allowed_suffixes: Vec<String>,
    pub denied_hosts: Vec<String>,
    /// Outbound links under this suffix are counted per subdomain
    pub stats_suffix: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            allowed_suffixes: strings(&[
                ".ics.uci.edu",
                ".cs.uci.edu",
                ".informatics.uci.edu",
                ".stat.uci.edu",
            ]),
            denied_hosts: strings(&["gitlab.ics.uci.edu"]),
            stats_suffix: ".uci.edu".to_string(),
        }
    }
}

/// Crawler trap rule table. Patterns are regular expressions, markers are
/// plain substrings; both are matched against the lower-cased component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapConfig {
    pub path_patterns: Vec<String>,
    pub path_markers: Vec<String>,
    pub query_patterns: Vec<String>,
    pub query_markers: Vec<String>,
    pub denied_extensions: Vec<String>,
    pub max_path_slashes: usize,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            path_patterns: strings(&[
                r"/\d{4}/\d{2}/\d{2}",
                r"/day/\d{4}-\d{2}-\d{2}",
                r"/\d{4}-\d{2}(-\d{2})?/?$",
            ]),
            path_markers: strings(&[
                "timeline",
                "/calendar",
                "/events/",
                "/event/",
                "/login",
                "wp-login",
                "/auth/",
                "/dataset",
            ]),
            query_patterns: strings(&[r"date=\d{4}-\d{2}-\d{2}"]),
            query_markers: strings(&["tribe-bar-date", "eventdisplay=", "outlook-ical"]),
            denied_extensions: strings(&[
                "css", "js", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff", "mid",
                "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg",
                "ogv", "pdf", "ps", "eps", "tex", "ppt", "pptx", "doc", "docx", "xls", "xlsx",
                "names", "data", "dat", "exe", "bz2", "tar", "msi", "bin", "7z", "psd", "dmg",
                "iso", "epub", "dll", "cnf", "tgz", "sha1", "thmx", "mso", "arff", "rtf", "jar",
                "csv", "war", "java", "bam", "svg", "ppsx", "pps", "rm", "smil", "wmv", "swf",
                "wma", "zip", "rar", "gz",
            ]),
            max_path_slashes: 10,
        }
    }
}

/// Query-string rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Wiki media viewer keys that select binary content under a page path
    pub media_params: Vec<String>,
    /// Sort keys, revision selectors, share links, calendar exports, reply anchors
    pub volatile_params: Vec<String>,
    pub max_params: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            media_params: strings(&["do", "tab_files", "tab_details", "image", "ns"]),
            volatile_params: strings(&[
                "do", "media", "ical", "idx", "sid", "rev", "rev2", "action", "version",
                "tab_files", "tab_details", "a", "h", "hb", "sf", "share", "replytocom",
                "outlook-ical", "c", "o",
            ]),
            max_params: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Pages with fewer filtered words are boilerplate
    pub min_words: usize,
    /// Pages below this word count are rejected when larger than `max_body_bytes`
    pub sparse_words: usize,
    pub max_body_bytes: usize,
    pub stop_words: Vec<String>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_words: 100,
            sparse_words: 300,
            max_body_bytes: 1_000_000,
            stop_words: strings(STOP_WORDS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityStrategyKind {
    #[serde(rename = "shingle_jaccard")]
    ShingleJaccard,
    #[serde(rename = "simhash")]
    SimHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NearDuplicateConfig {
    pub strategy: SimilarityStrategyKind,
    pub shingle_size: usize,
    /// Token sequences shorter than this are never fingerprinted
    pub min_tokens: usize,
    /// A shingle hash is kept when `hash % sample_modulus == 0`
    pub sample_modulus: u64,
    pub similarity_threshold: f64,
    pub max_hamming_distance: u32,
    /// Number of simhashes remembered by the simhash strategy
    pub history_size: usize,
}

impl Default for NearDuplicateConfig {
    fn default() -> Self {
        Self {
            strategy: SimilarityStrategyKind::ShingleJaccard,
            shingle_size: 3,
            min_tokens: 10,
            sample_modulus: 4,
            similarity_threshold: 0.95,
            max_hamming_distance: 3,
            history_size: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub path: PathBuf,
    pub top_words: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("report.txt"),
            top_words: 50,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "aren't", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can't", "cannot", "could",
    "couldn't", "did", "didn't", "do", "does", "doesn't", "doing", "don't",
    "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's",
    "her", "here", "here's", "hers", "herself", "him", "himself", "his", "how",
    "how's", "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is",
    "isn't", "it", "it's", "its", "itself", "let's", "me", "more", "most",
    "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on", "once",
    "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over",
    "own", "same", "shan't", "she", "she'd", "she'll", "she's", "should",
    "shouldn't", "so", "some", "such", "than", "that", "that's", "the", "their",
    "theirs", "them", "themselves", "then", "there", "there's", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd",
    "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when",
    "when's", "where", "where's", "which", "while", "who", "who's", "whom",
    "why", "why's", "with", "won't", "would", "wouldn't", "you", "you'd",
    "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];
