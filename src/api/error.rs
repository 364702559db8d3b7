use thiserror::Error;

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL cannot carry API paths
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never reached the server or the connection dropped
    #[error("Connection failed to '{url}': {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout
    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Server answered with a non-success status
    #[error("Server error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Short message suitable for showing to the driver.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidBaseUrl { .. } | ApiError::Client(_) => {
                "The app is misconfigured".to_string()
            }
            ApiError::Connection { .. } => "No connection to the server".to_string(),
            ApiError::Timeout { .. } => "The server did not respond in time".to_string(),
            ApiError::Status { status: 401, .. } | ApiError::Status { status: 403, .. } => {
                "Invalid publishable key".to_string()
            }
            ApiError::Status { status, .. } => format!("Server error ({})", status),
            ApiError::Decode(_) => "Unexpected server response".to_string(),
        }
    }
}
