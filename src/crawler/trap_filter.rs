use crate::crawler::crawl_error::{CrawlError, MalformedUrl};
use crate::crawler::crawler_config::CrawlerConfig;
use crate::crawler::query_validator::{QueryRejection, QueryValidator};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Outcome of running a URL through the [`TrapFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(TrapReason),
    Malformed(MalformedUrl),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapReason {
    UnsupportedScheme(String),
    Fragment,
    HostOutOfScope(String),
    DeniedHost(String),
    /// The trap rule that matched
    PathTrap(String),
    QueryTrap(String),
    DeniedExtension(String),
    Query(QueryRejection),
}

/// One entry of the trap rule table.
#[derive(Debug, Clone)]
enum TrapRule {
    Pattern(Regex),
    Marker(String),
}

impl TrapRule {
    fn compile_all(patterns: &[String], markers: &[String]) -> Result<Vec<TrapRule>, CrawlError> {
        let mut rules = Vec::with_capacity(patterns.len() + markers.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|source| CrawlError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            rules.push(TrapRule::Pattern(regex));
        }
        rules.extend(markers.iter().map(|marker| TrapRule::Marker(marker.to_lowercase())));
        Ok(rules)
    }

    fn matches(&self, haystack: &str) -> bool {
        match self {
            TrapRule::Pattern(regex) => regex.is_match(haystack),
            TrapRule::Marker(marker) => haystack.contains(marker.as_str()),
        }
    }

    fn describe(&self) -> String {
        match self {
            TrapRule::Pattern(regex) => regex.as_str().to_string(),
            TrapRule::Marker(marker) => marker.clone(),
        }
    }
}

/// Pure crawl-eligibility predicate over normalized URLs. Holds no mutable
/// state, so a single instance can be shared freely between crawlers.
#[derive(Debug, Clone)]
pub struct TrapFilter {
    allowed_suffixes: Vec<String>,
    denied_hosts: HashSet<String>,
    path_rules: Vec<TrapRule>,
    query_rules: Vec<TrapRule>,
    denied_extensions: HashSet<String>,
    query_validator: QueryValidator,
}

impl TrapFilter {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let traps = &config.traps;
        Ok(Self {
            allowed_suffixes: lowered(&config.scope.allowed_suffixes),
            denied_hosts: lowered(&config.scope.denied_hosts),
            path_rules: TrapRule::compile_all(&traps.path_patterns, &traps.path_markers)?,
            query_rules: TrapRule::compile_all(&traps.query_patterns, &traps.query_markers)?,
            denied_extensions: traps
                .denied_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            query_validator: QueryValidator::new(&config.query, traps.max_path_slashes),
        })
    }

    pub fn is_eligible(&self, url: &str) -> bool {
        self.check(url).is_eligible()
    }

    /// Never panics or errors: unparseable input becomes `Eligibility::Malformed`.
    pub fn check(&self, url: &str) -> Eligibility {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return Eligibility::Malformed(MalformedUrl::Parse(e)),
        };
        match self.rejection(&parsed) {
            Some(reason) => Eligibility::Rejected(reason),
            None => Eligibility::Eligible,
        }
    }

    fn rejection(&self, url: &Url) -> Option<TrapReason> {
        if !matches!(url.scheme(), "http" | "https") {
            return Some(TrapReason::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.fragment().is_some() {
            return Some(TrapReason::Fragment);
        }

        let host = url.host_str().unwrap_or_default().to_lowercase();
        if !self.allowed_suffixes.iter().any(|suffix| host.ends_with(suffix.as_str())) {
            return Some(TrapReason::HostOutOfScope(host));
        }
        if self.denied_hosts.contains(&host) {
            return Some(TrapReason::DeniedHost(host));
        }

        let path = url.path().to_lowercase();
        if let Some(rule) = self.path_rules.iter().find(|rule| rule.matches(&path)) {
            return Some(TrapReason::PathTrap(rule.describe()));
        }
        let query = url.query().unwrap_or_default().to_lowercase();
        if let Some(rule) = self.query_rules.iter().find(|rule| rule.matches(&query)) {
            return Some(TrapReason::QueryTrap(rule.describe()));
        }

        if let Some((_, extension)) = path.rsplit_once('.') {
            if self.denied_extensions.contains(extension) {
                return Some(TrapReason::DeniedExtension(extension.to_string()));
            }
        }

        self.query_validator.check(url).err().map(TrapReason::Query)
    }
}

fn lowered<C: FromIterator<String>>(values: &[String]) -> C {
    values.iter().map(|value| value.to_lowercase()).collect()
}
