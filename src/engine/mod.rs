//! # Workflow Engine
//!
//! The engine runs submitted workflows and reports each finished task
//! with a receipt. Submission resolves once the engine has accepted the
//! workflow; receipts arrive later, in any order, through the
//! [`ReceiptSink`] registered with the submission.
//!
//! Dropping every reference to a sink is how an engine signals that no
//! more receipts will come.

mod errors;
mod homestar;
mod receipt;
mod stub;

pub use errors::{EngineError, EngineResult};
pub use homestar::{HomestarClient, SUBSCRIBE_RUN_WORKFLOW};
pub use receipt::{Delivery, Receipt, ReceiptSink};
pub use stub::StubEngine;

use std::sync::Arc;

use async_trait::async_trait;

use crate::workflow::Workflow;

/// A workflow execution engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Submit `workflow`, routing its receipts to `sink`
    async fn run_workflow(
        &self,
        workflow: &Workflow,
        sink: Arc<dyn ReceiptSink>,
    ) -> EngineResult<()>;

    /// Engine name for logging
    fn name(&self) -> &'static str;
}
