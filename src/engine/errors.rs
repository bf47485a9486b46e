//! # Engine Errors

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Workflow engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Cannot connect to engine at {url}: {reason}")]
    Connection { url: String, reason: String },

    /// Engine refused the workflow; carries the engine's message
    #[error("{0}")]
    Submission(String),

    #[error("Malformed engine message: {0}")]
    Protocol(String),

    #[error("engine connection closed")]
    Closed,
}

impl EngineError {
    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        500
    }
}
