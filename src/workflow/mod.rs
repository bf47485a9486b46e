//! # Workflow Records
//!
//! Invocation and workflow records submitted to the engine, and the builder
//! assembling them from validated arguments.

pub mod builder;
pub mod records;

pub use builder::{build_batch, build_invocation, build_workflow, random_nonce, InvocationOptions};
pub use records::{
    BatchRequest, Invocation, Meta, Task, TaskInput, Tasks, TemplateInvocation, TemplateTask,
    Workflow, WASM_RUN,
};
