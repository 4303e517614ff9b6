/// Why a URL string could not become a `NormalizedUrl`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedUrl {
    #[error("cannot parse URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("invalid trap rule pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    MalformedUrl(#[from] MalformedUrl),

    #[error(transparent)]
    AnyError(#[from] anyhow::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}
