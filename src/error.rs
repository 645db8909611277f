// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Failure taxonomy for the whole engine.
///
/// Network-shaped variants are retryable at the caller's granularity;
/// parse-shaped variants are recovered by skipping the current unit;
/// `Integrity` means reconciliation counts did not add up and the current
/// unit is abandoned.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited (HTTP {status}): {url}")]
    RateLimited { status: u16, url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("malformed page: {0}")]
    Malformed(String),

    #[error("missing element: {context}")]
    ElementNotFound { context: &'static str },

    #[error("unparseable date text: {0:?}")]
    DateParse(String),

    #[error("unknown team name: {0:?}")]
    UnknownTeam(String),

    #[error("data integrity: {0}")]
    Integrity(String),
}

impl ScrapeError {
    /// True for failures worth a backoff-and-retry at some outer level.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Network(_) | ScrapeError::RateLimited { .. } | ScrapeError::Status { .. }
        )
    }
}
