//! Failure modes of the enrichment call.
//!
//! None of these ever reach a submitter: [`Enricher`](super::Enricher)
//! logs them and prints the receipt without an enrichment block.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// Non-2xx HTTP response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// HTTP succeeded but the envelope status was not 200.
    #[error("service rejected request (status {status}): {msg}")]
    Rejected { status: u16, msg: String },

    /// Status 200 with a missing or empty `Content` field.
    #[error("response carried no content")]
    EmptyContent,

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Transport failure or an undecodable body.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl EnrichError {
    /// Timeout after `limit`, saturating at `u64::MAX` milliseconds.
    pub fn timeout(limit: Duration) -> Self {
        EnrichError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = EnrichError::ApiError {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "API error (status 502): bad gateway");
    }

    #[test]
    fn rejected_display() {
        let err = EnrichError::Rejected {
            status: 429,
            msg: "slow down".into(),
        };
        assert_eq!(
            err.to_string(),
            "service rejected request (status 429): slow down"
        );
    }

    #[test]
    fn timeout_display() {
        assert_eq!(
            EnrichError::Timeout(10000).to_string(),
            "request timed out after 10000ms"
        );
    }

    #[test]
    fn timeout_millis_saturate() {
        assert!(matches!(
            EnrichError::timeout(Duration::from_secs(10)),
            EnrichError::Timeout(10_000)
        ));
        assert!(matches!(
            EnrichError::timeout(Duration::MAX),
            EnrichError::Timeout(u64::MAX)
        ));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnrichError>();
    }
}
