//! # Validation Errors

use serde::Serialize;
use thiserror::Error;

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// One violated constraint, as reported by the schema validator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// JSON pointer to the offending value
    pub instance_path: String,

    /// JSON pointer to the violated keyword
    pub schema_path: String,

    pub message: String,
}

/// Validation errors
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Request failed validation: {}", summary(.0))]
    Invalid(Vec<ValidationIssue>),

    #[error("Batch must contain at least one task")]
    EmptyBatch,

    #[error("Invalid schema: {0}")]
    Schema(String),
}

fn summary(issues: &[ValidationIssue]) -> String {
    match issues.first() {
        Some(first) if issues.len() == 1 => format_issue(first),
        Some(first) => format!("{} (and {} more)", format_issue(first), issues.len() - 1),
        None => "no details".to_string(),
    }
}

fn format_issue(issue: &ValidationIssue) -> String {
    if issue.instance_path.is_empty() {
        issue.message.clone()
    } else {
        format!("{}: {}", issue.instance_path, issue.message)
    }
}

impl ValidationError {
    /// Structured issue list, empty for non-instance errors
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationError::Invalid(issues) => issues,
            _ => &[],
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::Invalid(_) | ValidationError::EmptyBatch => 400,
            ValidationError::Schema(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(path: &str, message: &str) -> ValidationIssue {
        ValidationIssue {
            instance_path: path.into(),
            schema_path: String::new(),
            message: message.into(),
        }
    }

    #[test]
    fn test_display_summarises_first_issue() {
        let err = ValidationError::Invalid(vec![
            issue("/a", "\"x\" is not of type \"number\""),
            issue("/b", "missing"),
        ]);
        let text = err.to_string();
        assert!(text.contains("/a"));
        assert!(text.contains("and 1 more"));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ValidationError::EmptyBatch.status_code(), 400);
        assert_eq!(ValidationError::Schema("bad".into()).status_code(), 500);
    }
}
