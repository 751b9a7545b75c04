use std::collections::BTreeSet;
use thiserror::Error;

/// Failure to obtain a page from a [`PageFetcher`](crate::fetchers::PageFetcher)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("could not open a session: {0}")]
    Connect(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },

    #[error("HTTP request for {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("no page available for {0}")]
    NotFound(String),
}

/// Coarse classification used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Extraction,
    Parse,
    Coercion,
}

/// Everything that can go wrong while scraping, with the URL and row it happened at
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no elements matching `{selector}` on {url}")]
    MissingElement { url: String, selector: String },

    #[error("no rows could be extracted from {url}")]
    NoRows { url: String },

    #[error("row {row} on {url} has {fields} fields, expected one of {expected:?}")]
    Parse {
        url: String,
        row: usize,
        fields: usize,
        expected: BTreeSet<usize>,
    },

    #[error("rating `{value}` in row {row} on {url} is not numeric")]
    Coercion {
        url: String,
        row: usize,
        value: String,
    },
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Fetch(_) => ErrorKind::Fetch,
            ScrapeError::MissingElement { .. } | ScrapeError::NoRows { .. } => {
                ErrorKind::Extraction
            }
            ScrapeError::Parse { .. } => ErrorKind::Parse,
            ScrapeError::Coercion { .. } => ErrorKind::Coercion,
        }
    }

    /// URL of the page the error belongs to, if known
    pub fn url(&self) -> Option<&str> {
        match self {
            ScrapeError::Fetch(FetchError::Navigation { url, .. })
            | ScrapeError::Fetch(FetchError::Timeout { url, .. })
            | ScrapeError::Fetch(FetchError::Http { url, .. })
            | ScrapeError::Fetch(FetchError::NotFound(url)) => Some(url.as_str()),
            ScrapeError::Fetch(FetchError::Connect(_)) => None,
            ScrapeError::MissingElement { url, .. }
            | ScrapeError::NoRows { url }
            | ScrapeError::Parse { url, .. }
            | ScrapeError::Coercion { url, .. } => Some(url.as_str()),
        }
    }
}

/// Invalid configuration, detected before any page is fetched
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid CSS selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("unsupported field count {0}; rows must have 3 or 4 fields")]
    FieldCount(usize),

    #[error("at least one expected field count is required")]
    NoFieldCounts,

    #[error("link_rows needs a link_pattern to choose the links")]
    LinkRowsWithoutPattern,

    #[error("invalid listing URL `{url}`: {reason}")]
    Url { url: String, reason: String },
}

/// Failure writing a result table
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let fetch = ScrapeError::from(FetchError::NotFound("https://a.test/".to_string()));
        assert_eq!(fetch.kind(), ErrorKind::Fetch);
        assert_eq!(fetch.url(), Some("https://a.test/"));

        let missing = ScrapeError::MissingElement {
            url: "https://a.test/x".to_string(),
            selector: "tr".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::Extraction);

        let empty = ScrapeError::NoRows {
            url: "https://a.test/x".to_string(),
        };
        assert_eq!(empty.kind(), ErrorKind::Extraction);
    }

    #[test]
    fn test_parse_error_message_has_context() {
        let err = ScrapeError::Parse {
            url: "https://a.test/x".to_string(),
            row: 7,
            fields: 5,
            expected: BTreeSet::from([3, 4]),
        };
        let message = err.to_string();
        assert!(message.contains("row 7"));
        assert!(message.contains("https://a.test/x"));
        assert!(message.contains("5 fields"));
    }
}
