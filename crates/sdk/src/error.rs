//! Error types for the Meeting BaaS SDK.

use serde::Deserialize;

/// Result type for SDK operations.
pub type BaasResult<T> = Result<T, BaasError>;

/// Error types that can occur when calling the Meeting BaaS API.
#[derive(Debug, thiserror::Error)]
pub enum BaasError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The API key was missing or rejected.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The API answered with success but reported the operation as not done.
    #[error("Request not completed: {0}")]
    NotCompleted(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response body could not be decoded.
    #[error("Malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BaasError {
    /// HTTP status carried by the error, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Authentication { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Create an error from a non-success status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            401 | 403 => Self::Authentication { status, message },
            404 => Self::NotFound(message),
            _ => Self::Api { status, message },
        }
    }
}

/// Error body shapes returned by the Meeting BaaS API.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
    detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .or_else(|| {
                self.detail.map(|detail| match detail {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                })
            })
            .filter(|message| !message.is_empty())
    }
}
