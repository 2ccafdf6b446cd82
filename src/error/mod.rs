//! Error types for support-desk.

use thiserror::Error;

/// Primary error type for all support-desk operations.
#[derive(Error, Debug)]
pub enum SupportError {
    #[error("Session not found: {app_name}/{user_id}/{session_id}")]
    SessionNotFound {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("Session already exists: {app_name}/{user_id}/{session_id}")]
    SessionAlreadyExists {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("Session service error: {0}")]
    SessionService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Agent error: {agent}: {message}")]
    Agent { agent: String, message: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SupportError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not-found error for the given session coordinates.
    pub fn session_not_found(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self::SessionNotFound {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Whether this error means the requested session does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound { .. })
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SupportError>;
