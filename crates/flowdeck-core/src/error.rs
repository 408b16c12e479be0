//! Core domain errors.

use thiserror::Error;

/// Core domain errors for flowdeck.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Status name outside the known workflow status set.
    #[error("Unknown workflow status: {0}")]
    UnknownStatus(String),

    /// Bulk operation name outside the supported set.
    #[error("Unknown bulk operation: {0}")]
    UnknownOperation(String),
}
