use crate::crawler::crawl_error::CrawlError;
use crate::crawler::url_normalizer::{NormalizedUrl, normalize};
use anyhow::anyhow;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:"];

/// Pulls outbound anchors out of an admitted page.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    link_selector: Selector,
}

impl LinkExtractor {
    pub fn new() -> Result<Self, CrawlError> {
        let link_selector =
            Selector::parse("a[href]").map_err(|e| anyhow!("invalid link selector: {e}"))?;
        Ok(Self { link_selector })
    }

    /// Resolves every anchor against `effective_url` (the URL the page was
    /// actually served from) and normalizes it. References that cannot be
    /// resolved are skipped; the result holds each URL once.
    pub fn extract(&self, document: &Html, effective_url: &str) -> Vec<NormalizedUrl> {
        let Ok(base) = Url::parse(effective_url) else {
            return Vec::new();
        };

        let mut discovered_urls: BTreeSet<NormalizedUrl> = BTreeSet::new();
        for element in document.select(&self.link_selector) {
            let Some(link) = element.value().attr("href") else {
                continue;
            };
            let link = link.trim();
            if link.is_empty() || link.starts_with('#') {
                continue; // Same page
            }
            let lowered = link.to_ascii_lowercase();
            if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
                continue;
            }
            if let Ok(url) = normalize(link, Some(&base)) {
                discovered_urls.insert(url);
            }
        }
        discovered_urls.into_iter().collect()
    }

    pub fn extract_from_str(&self, html: &str, effective_url: &str) -> Vec<NormalizedUrl> {
        self.extract(&Html::parse_document(html), effective_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(html: &str, base: &str) -> Vec<String> {
        LinkExtractor::new()
            .unwrap()
            .extract_from_str(html, base)
            .into_iter()
            .map(NormalizedUrl::into_string)
            .collect()
    }

    #[test]
    fn resolves_relative_links_against_effective_url() {
        let html = r#"
            <a href="/about/">About</a>
            <a href="people.html#faculty">People</a>
            <a href="../up">Up</a>
            <a href="https://www.stat.uci.edu/">Stats</a>
        "#;
        assert_eq!(
            links(html, "https://www.ics.uci.edu/dept/index.html"),
            vec![
                "https://www.ics.uci.edu/about",
                "https://www.ics.uci.edu/dept/people.html",
                "https://www.ics.uci.edu/up",
                "https://www.stat.uci.edu/",
            ]
        );
    }

    #[test]
    fn skips_non_navigational_targets() {
        let html = r##"
            <a href="mailto:chair@ics.uci.edu">Mail</a>
            <a href="JavaScript:void(0)">Menu</a>
            <a href="tel:+19495551234">Call</a>
            <a href="#top">Top</a>
            <a href="">Empty</a>
            <a>No href</a>
            <a href="ftp://ftp.ics.uci.edu/pub">FTP</a>
            <a href="http://[::1">Broken</a>
            <a href="/kept">Kept</a>
        "##;
        assert_eq!(
            links(html, "https://www.ics.uci.edu/"),
            vec!["https://www.ics.uci.edu/kept"]
        );
    }

    #[test]
    fn duplicates_collapse_after_normalization() {
        let html = r#"
            <a href="/research">A</a>
            <a href="/research/">B</a>
            <a href="/research#labs">C</a>
            <a href="HTTPS://WWW.ICS.UCI.EDU:443/research">D</a>
        "#;
        assert_eq!(
            links(html, "https://www.ics.uci.edu/"),
            vec!["https://www.ics.uci.edu/research"]
        );
    }

    #[test]
    fn unparseable_base_yields_nothing() {
        assert!(links(r#"<a href="/x">x</a>"#, "not a url").is_empty());
    }
}
