//! Per-request function context.
//!
//! Resolved once from the route's `:name` and passed explicitly to the
//! handler body; nothing is stored on the request.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::ApiResult;
use super::state::GatewayState;
use crate::functions::{FunctionEntry, FunctionError};
use crate::validation::{SchemaValidator, CONTENT_TYPE_PROPERTY};
use crate::workflow::{build_workflow, InvocationOptions, Workflow};

/// The addressed function and its compiled request schema
pub struct FunctionContext<'a> {
    pub entry: &'a FunctionEntry,
    pub schema: Arc<SchemaValidator>,
}

impl<'a> FunctionContext<'a> {
    /// Resolve `name`, failing with 404 when it is not registered
    pub fn resolve(state: &'a GatewayState, name: &str) -> ApiResult<Self> {
        let entry = state.registry.lookup(name)?;
        let schema = state
            .schemas
            .request(name)
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))?;
        Ok(Self { entry, schema })
    }

    /// Validate request input against the request schema
    pub fn validate(&self, input: &Map<String, Value>) -> ApiResult<()> {
        self.schema.validate(&Value::Object(input.clone()))?;
        Ok(())
    }

    /// Arguments in declared parameter order; missing ones are `None`
    pub fn arguments(&self, input: &Map<String, Value>) -> Vec<Option<Value>> {
        self.entry
            .arg_names
            .iter()
            .map(|name| input.get(name).cloned())
            .collect()
    }

    /// Explicit response content type, if the request carried one
    pub fn content_type_override(input: &Map<String, Value>) -> Option<String> {
        input
            .get(CONTENT_TYPE_PROPERTY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Single-task workflow for validated input
    pub fn workflow(&self, input: &Map<String, Value>, options: &InvocationOptions) -> Workflow {
        build_workflow(
            &self.entry.arg_names,
            self.arguments(input),
            &self.entry.content_id,
            &self.entry.name,
            options,
        )
    }
}
