//! Compiled JSON-Schema validator.
//!
//! All schemas produced by the gateway use draft-07 keywords (tuple `items`,
//! `additionalItems`, `definitions`), so compilation pins that draft.

use std::fmt;

use jsonschema::{Draft, Validator};
use serde_json::Value;

use super::errors::{ValidationError, ValidationIssue, ValidationResult};

/// A schema compiled once and applied to many instances
pub struct SchemaValidator {
    schema: Value,
    validator: Validator,
}

impl SchemaValidator {
    /// Compile a draft-07 schema
    pub fn compile(schema: Value) -> ValidationResult<Self> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .map_err(|e| ValidationError::Schema(e.to_string()))?;

        Ok(Self { schema, validator })
    }

    /// The schema this validator was compiled from
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check an instance, collecting every violated constraint
    pub fn validate(&self, instance: &Value) -> ValidationResult<()> {
        let issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(instance)
            .map(|error| ValidationIssue {
                instance_path: error.instance_path.to_string(),
                schema_path: error.schema_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(issues))
        }
    }

    /// True when the instance satisfies the schema
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
