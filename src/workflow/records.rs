//! Engine-facing wire records.
//!
//! Field names are the engine's; do not rename them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation tag of every invocation
pub const WASM_RUN: &str = "wasm/run";

/// Function call carried by a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub func: String,

    #[serde(default)]
    pub args: Vec<Value>,
}

/// What to run and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,

    pub op: String,

    /// Content-addressed resource URI of the module
    pub rsc: String,

    /// Nonce; empty allows the engine to replay a memoized receipt
    pub nnc: String,

    pub input: TaskInput,
}

/// Resource budget of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Memory budget in bytes
    pub memory: u64,

    /// Time budget in milliseconds
    pub time: u64,
}

/// A single task submitted to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub run: Task,

    pub meta: Meta,

    #[serde(default)]
    pub prf: Vec<String>,
}

/// Ordered task list of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tasks {
    pub tasks: Vec<Invocation>,
}

/// One workflow per request that triggers execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,

    pub workflow: Tasks,
}

impl Workflow {
    pub fn new(name: impl Into<String>, tasks: Vec<Invocation>) -> Self {
        Self {
            name: name.into(),
            workflow: Tasks { tasks },
        }
    }

    /// Number of tasks, and so of receipts to expect
    pub fn len(&self) -> usize {
        self.workflow.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflow.tasks.is_empty()
    }
}

/// Task as submitted by a batch client
///
/// Only `name` and `input` are kept; operation, resource, nonce, budget and
/// proofs are always filled in by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateTask {
    pub name: String,

    pub input: TaskInput,
}

/// Invocation as submitted by a batch client
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInvocation {
    pub run: TemplateTask,
}

/// Body of batch requests
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub tasks: Vec<TemplateInvocation>,
}
