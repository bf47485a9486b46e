//! In-process engine for tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::errors::{EngineError, EngineResult};
use super::receipt::{Delivery, Receipt, ReceiptSink};
use super::Engine;
use crate::workflow::{Invocation, Workflow};

type ComputeFn = dyn Fn(&Invocation) -> Value + Send + Sync;

/// Engine computing each task's output with a closure
///
/// Receipts are delivered from a spawned task after submission returns,
/// one per task in submission order unless configured otherwise.
pub struct StubEngine {
    compute: Arc<ComputeFn>,
    reverse: bool,
    duplicate_last: bool,
    replayed: bool,
    failure: Option<String>,
    submitted: Mutex<Vec<Workflow>>,
}

impl StubEngine {
    pub fn new(compute: impl Fn(&Invocation) -> Value + Send + Sync + 'static) -> Self {
        Self {
            compute: Arc::new(compute),
            reverse: false,
            duplicate_last: false,
            replayed: false,
            failure: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Deliver receipts in reverse submission order
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Deliver the final receipt a second time
    pub fn with_duplicate(mut self) -> Self {
        self.duplicate_last = true;
        self
    }

    /// Mark every receipt as replayed
    pub fn replaying(mut self) -> Self {
        self.replayed = true;
        self
    }

    /// Reject every submission with `message`
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Workflows submitted so far
    pub fn submitted(&self) -> Vec<Workflow> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Engine for StubEngine {
    async fn run_workflow(
        &self,
        workflow: &Workflow,
        sink: Arc<dyn ReceiptSink>,
    ) -> EngineResult<()> {
        if let Some(message) = &self.failure {
            return Err(EngineError::Submission(message.clone()));
        }
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(workflow.clone());

        let mut receipts: Vec<Receipt> = workflow
            .workflow
            .tasks
            .iter()
            .map(|invocation| Receipt::new((self.compute)(invocation), self.replayed))
            .collect();
        if self.reverse {
            receipts.reverse();
        }
        if self.duplicate_last {
            if let Some(last) = receipts.last().cloned() {
                receipts.push(last);
            }
        }
        let force_all = self.duplicate_last;

        tokio::spawn(async move {
            for receipt in receipts {
                if sink.deliver(receipt) == Delivery::Complete && !force_all {
                    break;
                }
            }
        });

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
