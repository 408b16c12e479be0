//! Error types for the console.

use thiserror::Error;

/// Failure reported by a backend collaborator.
///
/// Cloneable so the dispatcher can keep the last failure around for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with a non-success status.
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Backend response could not be decoded.
    #[error("malformed backend response: {0}")]
    Decode(String),
}

/// Reasons a bulk submission is refused locally, before any backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BulkRejection {
    /// No executions are selected.
    #[error("no executions selected")]
    EmptySelection,

    /// No bulk operation has been chosen.
    #[error("no bulk operation chosen")]
    NoOperation,

    /// A bulk job is still awaiting acknowledgement.
    #[error("a bulk job is already in flight")]
    Busy,
}
