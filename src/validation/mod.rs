//! # Request Validation
//!
//! Schemas are derived from the registry once it is complete. Because the
//! registry never changes afterwards, each derived schema is compiled a
//! single time and shared by every request.

pub mod compiler;
pub mod errors;
pub mod validator;

pub use compiler::{
    all_tasks_zero_args, batch_schema, request_schema, CONTENT_TYPE_PROPERTY,
    DEFAULT_CONTENT_TYPE, TEMPLATE_PATTERN,
};
pub use errors::{ValidationError, ValidationIssue, ValidationResult};
pub use validator::SchemaValidator;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::functions::FunctionRegistry;

/// Compiled request and batch schemas of a registry
#[derive(Debug)]
pub struct CompiledSchemas {
    requests: HashMap<String, Arc<SchemaValidator>>,
    batch: SchemaValidator,
}

impl CompiledSchemas {
    /// Compile every schema derivable from `registry`
    pub fn build(registry: &FunctionRegistry) -> ValidationResult<Self> {
        let mut requests = HashMap::with_capacity(registry.len());
        for entry in registry.iter() {
            let validator = SchemaValidator::compile(request_schema(entry))?;
            requests.insert(entry.name.clone(), Arc::new(validator));
        }

        Ok(Self {
            requests,
            batch: SchemaValidator::compile(batch_schema(registry))?,
        })
    }

    /// Request schema validator of one function
    pub fn request(&self, name: &str) -> Option<Arc<SchemaValidator>> {
        self.requests.get(name).cloned()
    }

    /// Batch schema validator
    pub fn batch(&self) -> &SchemaValidator {
        &self.batch
    }

    /// Validate a `{ tasks: [...] }` body.
    ///
    /// An empty task list is rejected. A batch in which every task passes no
    /// arguments is accepted without consulting the schema.
    pub fn validate_batch(&self, body: &Value) -> ValidationResult<()> {
        if body
            .get("tasks")
            .and_then(Value::as_array)
            .is_some_and(|tasks| tasks.is_empty())
        {
            return Err(ValidationError::EmptyBatch);
        }

        if all_tasks_zero_args(body) {
            return Ok(());
        }

        self.batch.validate(body)
    }
}
