//! Receipts and the sinks that consume them.

use serde_json::Value;

use super::errors::{EngineError, EngineResult};
use crate::response::ReturnValue;

/// Completion notice of one task
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub out: ReturnValue,

    /// The engine served a memoized result instead of running the task
    pub replayed: bool,
}

impl Receipt {
    pub fn new(out: impl Into<ReturnValue>, replayed: bool) -> Self {
        Self {
            out: out.into(),
            replayed,
        }
    }

    /// Parse a receipt notification payload.
    ///
    /// The output sits at `receipt.out[1]`; `receipt.out[0]` is the
    /// `ok`/`error` tag.
    pub fn from_notification(result: &Value) -> EngineResult<Self> {
        let out = result
            .pointer("/receipt/out/1")
            .cloned()
            .ok_or_else(|| EngineError::Protocol("receipt without output".into()))?;
        let replayed = result
            .pointer("/metadata/replayed")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self::new(ReturnValue::from_engine_output(out), replayed))
    }
}

/// Sink state after a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// More receipts are expected
    Pending,
    /// The sink needs no further receipts
    Complete,
}

/// Consumer of the receipts of one submitted workflow
pub trait ReceiptSink: Send + Sync {
    fn deliver(&self, receipt: Receipt) -> Delivery;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_notification() {
        let payload = json!({
            "receipt": { "out": ["ok", 5], "ran": "bafyran" },
            "metadata": { "name": "add", "replayed": true }
        });

        let receipt = Receipt::from_notification(&payload).unwrap();
        assert_eq!(receipt.out, ReturnValue::from_engine_output(json!(5)));
        assert!(receipt.replayed);
    }

    #[test]
    fn test_replayed_defaults_to_false() {
        let payload = json!({ "receipt": { "out": ["ok", "x"] } });
        assert!(!Receipt::from_notification(&payload).unwrap().replayed);
    }

    #[test]
    fn test_missing_output_is_protocol_error() {
        let payload = json!({ "receipt": { "out": ["error"] } });
        assert!(matches!(
            Receipt::from_notification(&payload),
            Err(EngineError::Protocol(_))
        ));
    }
}
