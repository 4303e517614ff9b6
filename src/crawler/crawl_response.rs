use std::collections::HashMap;

/// What the fetcher hands over for one page: the status, the URL the response
/// was served from after redirects, the headers and the raw body.
#[derive(Debug, Clone, Default)]
pub struct CrawlResponse {
    pub status_code: u16,
    pub effective_url: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CrawlResponse {
    pub fn new(status_code: u16, effective_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            effective_url: effective_url.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// An HTML page served with status 200.
    pub fn html(effective_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, effective_url, body).with_header("Content-Type", "text/html; charset=utf-8")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
