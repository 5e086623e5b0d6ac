//! Transport error types

use thiserror::Error;

/// Errors that can occur talking to the external services
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Session expired or invalid; sign in again")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Message suitable for showing the user: the server's own text when it
    /// sent one, otherwise the transport description
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::Rejected(message) if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}
