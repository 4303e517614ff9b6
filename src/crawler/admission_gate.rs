use crate::crawler::crawl_error::CrawlError;
use crate::crawler::crawl_response::CrawlResponse;
use crate::crawler::crawler_config::AdmissionConfig;
use crate::crawler::tokenizer::{Tokenizer, document_text};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use regex::bytes::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use xxhash_rust::xxh3::xxh3_64;

const META_CHARSET_PATTERN: &str = r#"(?i-u)<meta[^>]*charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#;

/// How far into the body a `<meta charset>` declaration or binary data is looked for.
const SNIFF_LENGTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedResponse {
    MissingResponse,
    Status(u16),
    MissingBody,
    ContentType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedResponse(UnsupportedResponse),
    ExactDuplicate,
    /// The body is binary data rather than markup
    ParseFailure,
    TooFewWords { count: usize, minimum: usize },
    SparseOversized { count: usize, bytes: usize },
}

#[derive(Debug)]
pub struct AdmittedPage {
    /// Filtered words in document order
    pub tokens: Vec<String>,
    pub html: String,
    pub document: Html,
}

#[derive(Debug)]
pub enum Admission {
    Rejected(Rejection),
    Admitted(AdmittedPage),
}

impl Admission {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Admission::Rejected(rejection) => Some(rejection),
            Admission::Admitted(_) => None,
        }
    }
}

/// Decides whether a response is worth parsing and counting. Checks run
/// cheapest first; the whole-body hash is taken before any parsing so an
/// exact duplicate never pays the parse cost.
#[derive(Debug)]
pub struct AdmissionGate {
    config: AdmissionConfig,
    tokenizer: Tokenizer,
    meta_charset: Regex,
    seen_exact_hashes: Mutex<HashSet<u64>>,
}

impl AdmissionGate {
    pub fn new(config: &AdmissionConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            config: config.clone(),
            tokenizer: Tokenizer::new(&config.stop_words)?,
            meta_charset: Regex::new(META_CHARSET_PATTERN).map_err(|source| CrawlError::InvalidPattern {
                pattern: META_CHARSET_PATTERN.to_string(),
                source,
            })?,
            seen_exact_hashes: Mutex::new(HashSet::new()),
        })
    }

    pub fn admit(&self, response: Option<&CrawlResponse>) -> Admission {
        match self.check(response) {
            Ok(page) => Admission::Admitted(page),
            Err(rejection) => Admission::Rejected(rejection),
        }
    }

    pub fn seen_exact_count(&self) -> usize {
        self.seen_exact_hashes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn check(&self, response: Option<&CrawlResponse>) -> Result<AdmittedPage, Rejection> {
        let response = response.ok_or(Rejection::UnsupportedResponse(UnsupportedResponse::MissingResponse))?;
        if response.status_code != 200 {
            return Err(Rejection::UnsupportedResponse(UnsupportedResponse::Status(response.status_code)));
        }
        if response.body.is_empty() {
            return Err(Rejection::UnsupportedResponse(UnsupportedResponse::MissingBody));
        }

        let content_type_str = response.header("content-type").unwrap_or_default();
        let content_type = html_content_type(content_type_str).ok_or_else(|| {
            Rejection::UnsupportedResponse(UnsupportedResponse::ContentType(content_type_str.to_string()))
        })?;

        let body_hash = xxh3_64(&response.body);
        let first_sighting = self
            .seen_exact_hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(body_hash);
        if !first_sighting {
            return Err(Rejection::ExactDuplicate);
        }

        let html = self
            .decode_body(&response.body, content_type.charset.as_deref())
            .ok_or(Rejection::ParseFailure)?;
        let document = Html::parse_document(&html);
        let tokens = self.tokenizer.filtered_tokens(&document_text(&document));

        let count = tokens.len();
        if count < self.config.min_words {
            return Err(Rejection::TooFewWords {
                count,
                minimum: self.config.min_words,
            });
        }
        let bytes = response.body.len();
        if count < self.config.sparse_words && bytes > self.config.max_body_bytes {
            return Err(Rejection::SparseOversized { count, bytes });
        }

        Ok(AdmittedPage {
            tokens,
            html,
            document,
        })
    }

    /// Decodes the body with, in order of preference, its byte order mark,
    /// the Content-Type charset, a `<meta charset>` declaration, UTF-8 when the
    /// bytes are valid UTF-8, and windows-1252 otherwise. Malformed sequences
    /// become U+FFFD. Returns `None` only for binary data.
    fn decode_body(&self, body: &[u8], declared_charset: Option<&str>) -> Option<String> {
        let (encoding, bom_length) = Encoding::for_bom(body).unwrap_or_else(|| {
            let encoding = declared_charset
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                .or_else(|| self.sniff_meta_charset(body))
                .unwrap_or_else(|| fallback_encoding(body));
            (encoding, 0)
        });
        let body = &body[bom_length..];

        let wide = encoding == UTF_16LE || encoding == UTF_16BE;
        if !wide && body.iter().take(SNIFF_LENGTH).any(|&byte| byte == 0) {
            return None;
        }

        let (text, _had_errors) = encoding.decode_without_bom_handling(body);
        Some(text.into_owned())
    }

    fn sniff_meta_charset(&self, body: &[u8]) -> Option<&'static Encoding> {
        let head = &body[..body.len().min(SNIFF_LENGTH)];
        let label = self.meta_charset.captures(head)?.get(1)?;
        Encoding::for_label(label.as_bytes())
    }
}

fn fallback_encoding(body: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(body).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HtmlContentType {
    charset: Option<String>,
}

/// Accepts `text/html` and `application/xhtml+xml`. Headers `mime` cannot
/// parse are judged by the type before the first `;` or `,`.
fn html_content_type(content_type: &str) -> Option<HtmlContentType> {
    match content_type.trim().parse::<mime::Mime>() {
        Ok(parsed) => {
            let html_like = match (parsed.type_(), parsed.subtype()) {
                (mime::TEXT, mime::HTML) => true,
                (mime::APPLICATION, subtype) => subtype.as_str() == "xhtml" && parsed.suffix() == Some(mime::XML),
                _ => false,
            };
            html_like.then(|| HtmlContentType {
                charset: parsed.get_param(mime::CHARSET).map(|charset| charset.as_str().to_string()),
            })
        }
        Err(_) => {
            let essence = content_type
                .split([';', ','])
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            matches!(essence.as_str(), "text/html" | "application/xhtml+xml")
                .then_some(HtmlContentType { charset: None })
        }
    }
}
