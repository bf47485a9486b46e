//! # Function Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function errors
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Schema extraction failed for {function}: {reason}")]
    SchemaExtraction { function: String, reason: String },

    #[error("Function already registered: {0}")]
    DuplicateName(String),

    #[error("Function not found: {0}")]
    NotFound(String),

    #[error("Invalid declarations in {path}: {reason}")]
    Declaration { path: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FunctionError {
    pub(crate) fn extraction(function: &str, reason: impl Into<String>) -> Self {
        FunctionError::SchemaExtraction {
            function: function.to_string(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            FunctionError::NotFound(_) => 404,
            FunctionError::SchemaExtraction { .. } => 400,
            FunctionError::DuplicateName(_)
            | FunctionError::Declaration { .. }
            | FunctionError::Io { .. }
            | FunctionError::Store(_) => 500,
        }
    }

    /// True for errors that must abort startup rather than drop one function
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FunctionError::SchemaExtraction { .. })
    }
}
