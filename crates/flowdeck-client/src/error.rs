//! Error types for the backend client.

use thiserror::Error;

use flowdeck_console::BackendError;

/// Errors that can occur when using the backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to build the client or reach the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<ClientError> for BackendError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Connection(msg) => BackendError::Unavailable(msg),
            ClientError::Http(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ClientError::Http(e) => BackendError::Unavailable(e.to_string()),
            ClientError::Status {
                status, message, ..
            } => BackendError::Rejected { status, message },
            ClientError::Serialization(msg) => BackendError::Decode(msg),
        }
    }
}
