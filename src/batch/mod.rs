//! # Batch Runner
//!
//! One workflow per request; the request waits until every task of the
//! workflow has reported a receipt.

mod barrier;
mod runner;

pub use barrier::{BatchOutcome, CollectMode, ReceiptBarrier};
pub use runner::BatchRunner;
