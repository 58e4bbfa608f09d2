//! Error types for Scholi.

use std::time::Duration;

/// Top-level error type for the assistant core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl Error {
    /// Whether the turn can simply be resubmitted once the service cools off.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Retrieval(e) if e.is_transient())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Question catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Question ordinal {ordinal} out of range (catalog has {count} questions)")]
    OutOfRange { ordinal: u32, count: u32 },
}

/// Errors from the retrieve-and-generate capability.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The service is rate-limiting requests. Retryable.
    #[error("Knowledge base throttled the request, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Retrieve-and-generate request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid response from knowledge base: {reason}")]
    InvalidResponse { reason: String },
}

impl RetrievalError {
    /// Whether the failure is a transient overload worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limiting_is_transient() {
        let throttled = RetrievalError::RateLimited { retry_after: None };
        assert!(throttled.is_transient());

        let failed = RetrievalError::RequestFailed {
            reason: "400 ValidationException".to_string(),
        };
        assert!(!failed.is_transient());

        let invalid = RetrievalError::InvalidResponse {
            reason: "missing output.text".to_string(),
        };
        assert!(!invalid.is_transient());
    }

    #[test]
    fn transience_propagates_through_top_level_error() {
        let err = Error::from(RetrievalError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        });
        assert!(err.is_transient());

        let err = Error::from(ConfigError::MissingEnvVar("KNOWLEDGE_BASE_ID".to_string()));
        assert!(!err.is_transient());
    }
}
