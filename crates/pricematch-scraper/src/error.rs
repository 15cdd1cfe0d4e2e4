use pricematch_core::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("malformed price text: {text:?}")]
    MalformedPrice { text: String },

    #[error("{field} not found with selector {selector:?}")]
    ExtractionFieldMissing {
        field: &'static str,
        selector: String,
    },

    #[error("platform {platform} unavailable: {reason}")]
    PlatformUnavailable { platform: String, reason: String },

    #[error("no scraper registered for platform {platform}")]
    UnknownScraperReference { platform: String },

    #[error("failed to persist scraped listings: {0}")]
    PersistenceFailure(#[source] RepositoryError),

    #[error("browser session error: {reason}")]
    Browser { reason: String },

    #[error("{what} timed out after {after_ms}ms")]
    Timeout { what: String, after_ms: u128 },
}

impl ScraperError {
    pub(crate) fn browser(err: impl std::fmt::Display) -> Self {
        Self::Browser {
            reason: err.to_string(),
        }
    }

    pub(crate) fn timeout(what: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after_ms: after.as_millis(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query must contain at least one word")]
    EmptyQuery,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
