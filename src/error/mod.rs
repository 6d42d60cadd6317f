//! Error types for the checker and the registry client

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckerError>;

/// Failures at the orchestration boundary. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),
    /// Identifier sheet could not be read
    #[error("Input error: {0}")]
    Input(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
    /// A registry call the run cannot do without
    #[error("Registry error: {0}")]
    Registry(#[from] QueryError),
}

impl From<url::ParseError> for CheckerError {
    fn from(err: url::ParseError) -> Self {
        CheckerError::Config(format!("invalid URL: {}", err))
    }
}

impl From<dotenvy::Error> for CheckerError {
    fn from(err: dotenvy::Error) -> Self {
        CheckerError::Config(format!("failed to load env file: {}", err))
    }
}

/// Outcome of a failed registry call.
///
/// These are reported through the logger and never abort a fetch on their
/// own; a batch that ends in one of these is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Unknown service name or no token held
    #[error("service '{service}' is unavailable")]
    ServiceUnavailable { service: String },
    /// 401 and the token refresh also failed
    #[error("unauthorized for service '{service}' and token refresh failed")]
    Unauthorized { service: String },
    /// Non-2xx response other than 401
    #[error("service error (status {status}): {body}")]
    Service { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("all {attempts} attempts failed for service '{service}'")]
    RetriesExhausted { service: String, attempts: u32 },
}

impl QueryError {
    /// Whether a retry loop should try again after this outcome.
    ///
    /// Every per-attempt outcome is retried; only the terminal
    /// `RetriesExhausted` is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, QueryError::RetriesExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_exhausted_is_terminal() {
        let exhausted = QueryError::RetriesExhausted {
            service: "padron".to_string(),
            attempts: 3,
        };
        assert!(!exhausted.is_retryable());
        assert!(QueryError::Transport("reset".to_string()).is_retryable());
        assert!(
            QueryError::Service {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn messages_name_the_service() {
        let err = QueryError::ServiceUnavailable {
            service: "padron".to_string(),
        };
        assert_eq!(err.to_string(), "service 'padron' is unavailable");

        let err = CheckerError::Config("AFIP_CHUNK_SIZE is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: AFIP_CHUNK_SIZE is not set"
        );
    }
}
