//! Shared state of the gateway routes.

use std::sync::Arc;

use crate::batch::BatchRunner;
use crate::engine::Engine;
use crate::functions::FunctionRegistry;
use crate::validation::{CompiledSchemas, ValidationResult};
use crate::workflow::InvocationOptions;

/// Name given to batch workflows unless configured otherwise
pub const DEFAULT_BATCH_WORKFLOW: &str = "test";

/// Read-only state shared by every request
pub struct GatewayState {
    pub registry: FunctionRegistry,
    pub schemas: CompiledSchemas,
    pub options: InvocationOptions,
    pub runner: BatchRunner,
    /// Name of workflows built from batch submissions
    pub batch_workflow_name: String,
}

impl GatewayState {
    /// Compile the registry's schemas once
    pub fn new(
        registry: FunctionRegistry,
        engine: Arc<dyn Engine>,
        options: InvocationOptions,
    ) -> ValidationResult<Self> {
        let schemas = CompiledSchemas::build(&registry)?;
        Ok(Self {
            registry,
            schemas,
            options,
            runner: BatchRunner::new(engine),
            batch_workflow_name: DEFAULT_BATCH_WORKFLOW.to_string(),
        })
    }

    pub fn with_batch_workflow_name(mut self, name: impl Into<String>) -> Self {
        self.batch_workflow_name = name.into();
        self
    }
}
