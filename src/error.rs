use thiserror::Error;

/// Problems with the authority table or runtime settings. Raised before any
/// fetch happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unexpected authority: {0}")]
    UnknownAuthority(String),
    #[error("authority '{key}' is misconfigured: {reason}")]
    InvalidAuthority { key: String, reason: String },
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Errors that abort the run for one authority.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("can't find <{0}> element")]
    MissingDataSet(&'static str),
    #[error("result block {index} has no <{element}> element")]
    MissingElement { index: usize, element: &'static str },
    #[error("result block {index} does not match the expected layout: {detail}")]
    UnexpectedLayout { index: usize, detail: String },
    #[error("invalid selector '{0}'")]
    Selector(&'static str),
    #[error("malformed XML feed: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error {status}: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("failed to decode response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("agreement page at {0} has no form to submit")]
    AgreementForm(String),
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("storage lock poisoned")]
    StorageLock,
}

/// Why one application node produced no record. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("No address found for {reference}")]
    NoAddress { reference: String },
    #[error("Lack of description for {reference}")]
    NoDescription { reference: String },
    #[error("Application without <{0}> element")]
    MissingIdentifier(&'static str),
}
