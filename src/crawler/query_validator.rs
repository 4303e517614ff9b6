use crate::crawler::crawler_config::QueryConfig;
use std::collections::HashSet;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRejection {
    MediaParameter(String),
    VolatileParameter(String),
    TooManyParameters(usize),
    PathTooDeep(usize),
}

/// Decides whether a URL's query string (and path depth) is worth crawling.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    media_params: HashSet<String>,
    volatile_params: HashSet<String>,
    max_params: usize,
    max_path_slashes: usize,
}

impl QueryValidator {
    pub fn new(config: &QueryConfig, max_path_slashes: usize) -> Self {
        let lowered = |keys: &[String]| keys.iter().map(|key| key.to_lowercase()).collect();
        Self {
            media_params: lowered(&config.media_params),
            volatile_params: lowered(&config.volatile_params),
            max_params: config.max_params,
            max_path_slashes,
        }
    }

    pub fn is_acceptable_query(&self, url: &Url) -> bool {
        self.check(url).is_ok()
    }

    /// Keys are compared case-insensitively after percent-decoding.
    pub fn check(&self, url: &Url) -> Result<(), QueryRejection> {
        let keys: HashSet<String> = url
            .query_pairs()
            .map(|(key, _)| key.to_lowercase())
            .collect();

        if let Some(key) = keys.iter().find(|key| self.media_params.contains(*key)) {
            return Err(QueryRejection::MediaParameter(key.clone()));
        }
        if keys.len() > self.max_params {
            return Err(QueryRejection::TooManyParameters(keys.len()));
        }
        let slashes = url.path().matches('/').count();
        if slashes > self.max_path_slashes {
            return Err(QueryRejection::PathTooDeep(slashes));
        }
        if let Some(key) = keys.iter().find(|key| self.volatile_params.contains(*key)) {
            return Err(QueryRejection::VolatileParameter(key.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QueryValidator {
        QueryValidator::new(&QueryConfig::default(), 10)
    }

    fn check(url: &str) -> Result<(), QueryRejection> {
        validator().check(&Url::parse(url).unwrap())
    }

    #[test]
    fn plain_queries_pass() {
        assert_eq!(check("https://www.ics.uci.edu/page"), Ok(()));
        assert_eq!(check("https://www.ics.uci.edu/search?q=compilers&page=2"), Ok(()));
        assert!(validator().is_acceptable_query(&Url::parse("https://wiki.ics.uci.edu/doku.php?id=start").unwrap()));
    }

    #[test]
    fn wiki_media_keys_are_rejected() {
        assert_eq!(
            check("https://wiki.ics.uci.edu/doku.php?id=x&tab_files=files"),
            Err(QueryRejection::MediaParameter("tab_files".to_string()))
        );
        assert_eq!(
            check("https://wiki.ics.uci.edu/doku.php?image=a.png"),
            Err(QueryRejection::MediaParameter("image".to_string()))
        );
    }

    #[test]
    fn volatile_keys_are_rejected() {
        assert_eq!(
            check("https://wiki.ics.uci.edu/doku.php?id=x&rev=1600000000"),
            Err(QueryRejection::VolatileParameter("rev".to_string()))
        );
        assert_eq!(
            check("https://www.ics.uci.edu/news?share=twitter"),
            Err(QueryRejection::VolatileParameter("share".to_string()))
        );
        assert_eq!(
            check("https://www.ics.uci.edu/files/?C=N;O=D"),
            Err(QueryRejection::VolatileParameter("c".to_string()))
        );
    }

    #[test]
    fn too_many_parameters() {
        assert_eq!(
            check("https://www.ics.uci.edu/p?k1=1&k2=2&k3=3&k4=4&k5=5&k6=6"),
            Err(QueryRejection::TooManyParameters(6))
        );
        assert_eq!(check("https://www.ics.uci.edu/p?k1=1&k2=2&k3=3&k4=4&k5=5"), Ok(()));
    }

    #[test]
    fn repeated_key_counts_once() {
        assert_eq!(check("https://www.ics.uci.edu/p?k=1&k=2&k=3&k=4&k=5&k=6"), Ok(()));
    }

    #[test]
    fn deep_paths_are_rejected() {
        assert_eq!(
            check("https://www.ics.uci.edu/a/b/c/d/e/f/g/h/i/j/k"),
            Err(QueryRejection::PathTooDeep(11))
        );
        assert_eq!(check("https://www.ics.uci.edu/a/b/c/d/e/f/g/h/i/j"), Ok(()));
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = QueryConfig {
            media_params: Vec::new(),
            volatile_params: vec!["Session".to_string()],
            max_params: 1,
        };
        let validator = QueryValidator::new(&config, 10);
        let url = Url::parse("https://www.ics.uci.edu/p?session=1").unwrap();
        assert_eq!(
            validator.check(&url),
            Err(QueryRejection::VolatileParameter("session".to_string()))
        );
        let url = Url::parse("https://www.ics.uci.edu/p?x=1&y=2").unwrap();
        assert_eq!(validator.check(&url), Err(QueryRejection::TooManyParameters(2)));
    }
}
