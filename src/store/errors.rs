//! # Content Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Content store unreachable: {0}")]
    Unavailable(String),

    #[error("Content store rejected upload: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected content store reply: {0}")]
    InvalidReply(String),
}
