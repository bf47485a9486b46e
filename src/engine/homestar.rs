//! Homestar engine client.
//!
//! Speaks JSON-RPC 2.0 over a single WebSocket connection. A workflow is
//! submitted with `subscribe_run_workflow`; the reply carries a
//! subscription id, and every receipt of that workflow then arrives as a
//! notification tagged with it.
//!
//! One writer task owns the sending half of the socket and one reader
//! task owns the receiving half. The reader is the only task that touches
//! subscriptions, so a subscription is always registered before any of its
//! notifications are read.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::errors::{EngineError, EngineResult};
use super::receipt::{Delivery, Receipt, ReceiptSink};
use super::Engine;
use crate::observability::{log_event_with_fields, Event};
use crate::workflow::Workflow;

/// JSON-RPC method submitting a workflow
pub const SUBSCRIBE_RUN_WORKFLOW: &str = "subscribe_run_workflow";

struct PendingSubmission {
    sink: Arc<dyn ReceiptSink>,
    reply: oneshot::Sender<EngineResult<()>>,
}

#[derive(Default)]
struct ClientState {
    closed: bool,
    /// Submissions awaiting their reply, by request id
    pending: HashMap<u64, PendingSubmission>,
    /// Accepted workflows, by subscription id
    subscriptions: HashMap<String, Arc<dyn ReceiptSink>>,
}

impl ClientState {
    fn close(&mut self) {
        self.closed = true;
        for (_, submission) in self.pending.drain() {
            let _ = submission.reply.send(Err(EngineError::Closed));
        }
        self.subscriptions.clear();
    }
}

fn lock(state: &Mutex<ClientState>) -> MutexGuard<'_, ClientState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client of a Homestar node
pub struct HomestarClient {
    url: String,
    outgoing: mpsc::UnboundedSender<Message>,
    state: Arc<Mutex<ClientState>>,
    next_id: AtomicU64,
}

impl HomestarClient {
    /// Open the connection and start the reader and writer tasks
    pub async fn connect(url: &str) -> EngineResult<Self> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| EngineError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let (mut writer, mut reader) = stream.split();
        let (outgoing, mut queue) = mpsc::unbounded_channel::<Message>();
        let state = Arc::new(Mutex::new(ClientState::default()));

        tokio::spawn(async move {
            while let Some(message) = queue.recv().await {
                if writer.send(message).await.is_err() {
                    break;
                }
            }
            let _ = writer.close().await;
        });

        let reader_state = Arc::clone(&state);
        let reader_url = url.to_string();
        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => handle_text(&reader_state, &text),
                    Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                        Ok(text) => handle_text(&reader_state, text),
                        Err(_) => reject_message("binary frame is not UTF-8"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        reject_message(&e.to_string());
                        break;
                    }
                }
            }

            lock(&reader_state).close();
            log_event_with_fields(Event::EngineDisconnected, &[("url", &reader_url)]);
        });

        log_event_with_fields(Event::EngineConnected, &[("url", url)]);

        Ok(Self {
            url: url.to_string(),
            outgoing,
            state,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True once the connection has been lost
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

#[async_trait]
impl Engine for HomestarClient {
    async fn run_workflow(
        &self,
        workflow: &Workflow,
        sink: Arc<dyn ReceiptSink>,
    ) -> EngineResult<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": SUBSCRIBE_RUN_WORKFLOW,
            "params": workflow,
        });

        let (reply, response) = oneshot::channel();
        {
            let mut state = lock(&self.state);
            if state.closed {
                return Err(EngineError::Closed);
            }
            state.pending.insert(id, PendingSubmission { sink, reply });
        }

        if self.outgoing.send(Message::Text(request.to_string())).is_err() {
            lock(&self.state).pending.remove(&id);
            return Err(EngineError::Closed);
        }

        response.await.unwrap_or(Err(EngineError::Closed))
    }

    fn name(&self) -> &'static str {
        "homestar"
    }
}

fn reject_message(reason: &str) {
    log_event_with_fields(Event::EngineMessageRejected, &[("reason", reason)]);
}

/// Subscription ids may be strings or numbers
fn subscription_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn handle_text(state: &Mutex<ClientState>, text: &str) {
    let message: Value = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => return reject_message(&e.to_string()),
    };

    if let Some(id) = message.get("id").and_then(Value::as_u64) {
        handle_reply(state, id, &message);
    } else if let Some(params) = message.get("params") {
        handle_notification(state, params);
    } else {
        reject_message("neither reply nor notification");
    }
}

fn handle_reply(state: &Mutex<ClientState>, id: u64, message: &Value) {
    let mut state = lock(state);
    let Some(submission) = state.pending.remove(&id) else {
        return;
    };

    if let Some(error) = message.get("error") {
        let reason = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("workflow rejected");
        let _ = submission
            .reply
            .send(Err(EngineError::Submission(reason.to_string())));
        return;
    }

    match message.get("result").and_then(subscription_key) {
        Some(key) => {
            state.subscriptions.insert(key, submission.sink);
            let _ = submission.reply.send(Ok(()));
        }
        None => {
            let _ = submission.reply.send(Err(EngineError::Protocol(
                "reply carries no subscription id".into(),
            )));
        }
    }
}

fn handle_notification(state: &Mutex<ClientState>, params: &Value) {
    let Some(key) = params.get("subscription").and_then(subscription_key) else {
        return reject_message("notification without subscription");
    };
    let Some(sink) = lock(state).subscriptions.get(&key).cloned() else {
        return;
    };

    let receipt = match params
        .get("result")
        .ok_or_else(|| EngineError::Protocol("notification without result".into()))
        .and_then(Receipt::from_notification)
    {
        Ok(receipt) => receipt,
        Err(e) => return reject_message(&e.to_string()),
    };

    log_event_with_fields(
        Event::ReceiptReceived,
        &[("subscription", &key), ("replayed", &receipt.replayed.to_string())],
    );

    if sink.deliver(receipt) == Delivery::Complete {
        lock(state).subscriptions.remove(&key);
    }
}
