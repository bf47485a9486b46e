//! Batch runner.
//!
//! `Submitted -> AwaitingReceipts -> Complete | Failed`. A rejected
//! submission fails the batch; so does an engine that lets go of the
//! barrier before the last receipt. No timeout applies while waiting.

use std::sync::Arc;
use std::time::Instant;

use super::barrier::{BatchOutcome, CollectMode, ReceiptBarrier};
use crate::engine::{Engine, EngineError, EngineResult};
use crate::observability::{log_event_with_fields, Event};
use crate::workflow::Workflow;

/// Submits workflows and waits for all of their receipts
#[derive(Clone)]
pub struct BatchRunner {
    engine: Arc<dyn Engine>,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Run `workflow` to completion
    pub async fn run(&self, workflow: &Workflow, mode: CollectMode) -> EngineResult<BatchOutcome> {
        if workflow.is_empty() {
            return Err(EngineError::Submission("workflow has no tasks".into()));
        }

        let start = Instant::now();
        let tasks = workflow.len().to_string();
        let (barrier, resolved) = ReceiptBarrier::new(workflow.len(), mode);

        // The engine must hold the only reference to the barrier, so that
        // dropping it rejects the batch.
        if let Err(e) = self.engine.run_workflow(workflow, barrier).await {
            log_event_with_fields(
                Event::WorkflowRejected,
                &[
                    ("workflow", &workflow.name),
                    ("engine", self.engine.name()),
                    ("reason", &e.to_string()),
                ],
            );
            return Err(e);
        }
        log_event_with_fields(
            Event::WorkflowSubmitted,
            &[("workflow", &workflow.name), ("tasks", &tasks)],
        );

        match resolved.await {
            Ok(outcome) => {
                log_event_with_fields(
                    Event::BatchComplete,
                    &[
                        ("workflow", &workflow.name),
                        ("tasks", &tasks),
                        ("duration_ms", &start.elapsed().as_millis().to_string()),
                    ],
                );
                Ok(outcome)
            }
            Err(_) => {
                log_event_with_fields(
                    Event::BatchFailed,
                    &[("workflow", &workflow.name), ("reason", "engine connection closed")],
                );
                Err(EngineError::Closed)
            }
        }
    }
}
