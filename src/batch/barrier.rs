//! Receipt barrier.
//!
//! Counts receipts up to the number of submitted tasks and resolves a
//! one-shot signal exactly once, on the last one. Receipts arriving after
//! that are ignored.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::engine::{Delivery, Receipt, ReceiptSink};
use crate::response::RunResult;

/// What a batch resolves with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Output of the receipt that completed the batch
    Last,
    /// Every receipt, encoded, in arrival order
    All,
}

/// Resolved batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Last(Receipt),
    All(Vec<RunResult>),
}

struct BarrierState {
    count: usize,
    results: Vec<RunResult>,
    done: Option<oneshot::Sender<BatchOutcome>>,
}

/// Counter plus one-shot completion signal
pub struct ReceiptBarrier {
    total: usize,
    mode: CollectMode,
    state: Mutex<BarrierState>,
}

impl ReceiptBarrier {
    /// Barrier expecting `total` receipts, with the receiver it resolves.
    ///
    /// `total` must be at least one.
    pub fn new(total: usize, mode: CollectMode) -> (Arc<Self>, oneshot::Receiver<BatchOutcome>) {
        let (done, resolved) = oneshot::channel();
        let barrier = Arc::new(Self {
            total,
            mode,
            state: Mutex::new(BarrierState {
                count: 0,
                results: Vec::new(),
                done: Some(done),
            }),
        });
        (barrier, resolved)
    }

    /// Receipts counted so far
    pub fn count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }
}

impl ReceiptSink for ReceiptBarrier {
    fn deliver(&self, receipt: Receipt) -> Delivery {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.done.is_none() {
            return Delivery::Complete;
        }

        state.count += 1;
        if self.mode == CollectMode::All {
            state.results.push(RunResult::new(&receipt.out, receipt.replayed));
        }
        if state.count < self.total {
            return Delivery::Pending;
        }

        let outcome = match self.mode {
            CollectMode::Last => BatchOutcome::Last(receipt),
            CollectMode::All => BatchOutcome::All(std::mem::take(&mut state.results)),
        };
        if let Some(done) = state.done.take() {
            let _ = done.send(outcome);
        }
        Delivery::Complete
    }
}
