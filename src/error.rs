//! shotterms error types

/// shotterms error types
#[derive(Debug, thiserror::Error)]
pub enum ShotTermsError {
    // Routing outcomes surfaced to the caller
    /// The daily remote-call budget is spent. Not retried.
    #[error("daily remote quota exhausted ({remaining} of {limit} remaining)")]
    QuotaExhausted { remaining: u32, limit: u32 },

    /// The local or remote inference call failed (network, non-2xx, timeout).
    #[error("inference service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered, but not with a usable structured object.
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),

    // Storage errors, absorbed by the cache/quota/monitor components
    #[error("storage degraded: {0}")]
    StorageDegraded(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ShotTermsError {
    /// Whether this error is an inference call failure.
    ///
    /// `MalformedResponse` is handled exactly like `ServiceUnavailable`:
    /// a local failure falls back to remote, a remote failure is terminal.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::MalformedResponse(_)
        )
    }

    /// Whether this error is a quota refusal.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
}

impl From<reqwest::Error> for ShotTermsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ShotTermsError::MalformedResponse(err.to_string())
        } else {
            ShotTermsError::ServiceUnavailable(err.to_string())
        }
    }
}

/// Result type alias for shotterms operations
pub type Result<T> = std::result::Result<T, ShotTermsError>;
