use crate::crawler::crawl_error::MalformedUrl;
use std::fmt;
use url::Url;

/// An absolute `http`/`https` URL with no fragment, a lower-cased host, no
/// default port, no dot segments and no trailing slash outside the root.
///
/// Two pages are the same crawl identity exactly when their normalized
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        self.0.into()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Normalizes `input`, resolving it against `base` first when one is given.
///
/// Parsing already lower-cases the host, drops default ports and resolves
/// `.`/`..` segments; on top of that the fragment, an empty query and any
/// trailing slashes of a non-root path are removed. Normalizing the string
/// of a `NormalizedUrl` yields the same value.
pub fn normalize(input: &str, base: Option<&Url>) -> Result<NormalizedUrl, MalformedUrl> {
    let input = input.trim();
    let mut url = match base {
        Some(base) => base.join(input)?,
        None => Url::parse(input)?,
    };

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(MalformedUrl::UnsupportedScheme(other.to_string())),
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        url.set_path(&trimmed);
    }

    Ok(NormalizedUrl(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(input: &str) -> String {
        normalize(input, None).unwrap().into_string()
    }

    #[test]
    fn strips_fragment() {
        assert_eq!(norm("https://www.ics.uci.edu/page#section"), "https://www.ics.uci.edu/page");
        assert_eq!(norm("https://www.ics.uci.edu/page?x=1#top"), "https://www.ics.uci.edu/page?x=1");
    }

    #[test]
    fn canonicalizes_host_port_and_segments() {
        assert_eq!(norm("HTTPS://WWW.ICS.UCI.EDU:443/a/./b/../c"), "https://www.ics.uci.edu/a/c");
        assert_eq!(norm("http://www.cs.uci.edu:80/"), "http://www.cs.uci.edu/");
        assert_eq!(norm("http://www.cs.uci.edu:8080/x"), "http://www.cs.uci.edu:8080/x");
    }

    #[test]
    fn trailing_slash_rules() {
        assert_eq!(norm("https://www.ics.uci.edu"), "https://www.ics.uci.edu/");
        assert_eq!(norm("https://www.ics.uci.edu/"), "https://www.ics.uci.edu/");
        assert_eq!(norm("https://www.ics.uci.edu/about/"), "https://www.ics.uci.edu/about");
        assert_eq!(norm("https://www.ics.uci.edu/about///"), "https://www.ics.uci.edu/about");
        assert_eq!(norm("https://www.ics.uci.edu//"), "https://www.ics.uci.edu/");
        assert_eq!(
            norm("https://www.ics.uci.edu/about/?q=a/b/"),
            "https://www.ics.uci.edu/about?q=a/b/"
        );
    }

    #[test]
    fn drops_empty_query() {
        assert_eq!(norm("https://www.ics.uci.edu/page?"), "https://www.ics.uci.edu/page");
    }

    #[test]
    fn resolves_against_base() {
        let base = Url::parse("https://www.ics.uci.edu/dept/index.html").unwrap();
        let resolved = normalize("../people/#faculty", Some(&base)).unwrap();
        assert_eq!(resolved.as_str(), "https://www.ics.uci.edu/people");

        let absolute = normalize("https://www.stat.uci.edu/x", Some(&base)).unwrap();
        assert_eq!(absolute.as_str(), "https://www.stat.uci.edu/x");
    }

    #[test]
    fn rejects_non_web_schemes() {
        assert_eq!(
            normalize("ftp://ftp.ics.uci.edu/pub", None),
            Err(MalformedUrl::UnsupportedScheme("ftp".to_string()))
        );
        let base = Url::parse("https://www.ics.uci.edu/").unwrap();
        assert!(matches!(
            normalize("mailto:someone@uci.edu", Some(&base)),
            Err(MalformedUrl::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(matches!(normalize("not a url", None), Err(MalformedUrl::Parse(_))));
        assert!(matches!(normalize("http://", None), Err(MalformedUrl::Parse(_))));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "https://www.ics.uci.edu",
            "HTTP://Vision.ICS.UCI.EDU:80/a/b/../c/?x=1&y=2#frag",
            "https://www.informatics.uci.edu/research//",
            "https://www.stat.uci.edu/%7Efaculty/page.html",
            "https://www.cs.uci.edu/a%20b/c?",
            "https://wiki.ics.uci.edu/doku.php/start?id=a:b",
        ];
        for input in inputs {
            let once = normalize(input, None).unwrap();
            let twice = normalize(once.as_str(), None).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }
}
