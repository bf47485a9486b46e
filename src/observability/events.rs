//! Observability events for wasmgate
//!
//! Every observable lifecycle step of the gateway has a typed event here.
//! Events are explicit and typed; free-form event names are only used by
//! `ObservationScope`.

use std::fmt;

use super::logger::Severity;

/// Observable events in wasmgate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Gateway startup begins
    BootStart,
    /// Gateway startup complete, ready to serve
    BootComplete,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Function registry
    /// Module bytes handed to the content store
    ModuleStored,
    /// Function registered under its name
    FunctionRegistered,
    /// Function dropped because its signature is not representable
    FunctionSkipped,
    /// Registry complete
    RegistryBuilt,

    // Engine
    /// Engine connection established
    EngineConnected,
    /// Engine connection lost
    EngineDisconnected,
    /// Workflow accepted by the engine
    WorkflowSubmitted,
    /// Workflow rejected by the engine
    WorkflowRejected,
    /// Engine message that could not be understood
    EngineMessageRejected,
    /// Receipt delivered for a task
    ReceiptReceived,
    /// All receipts of a batch arrived
    BatchComplete,
    /// Batch failed before completion
    BatchFailed,

    // Server
    /// Server serving (ready for requests)
    Serving,
    /// HTTP request handled
    RequestHandled,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "WASMGATE_STARTUP_BEGIN",
            Event::BootComplete => "WASMGATE_STARTUP_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ModuleStored => "MODULE_STORED",
            Event::FunctionRegistered => "FUNCTION_REGISTERED",
            Event::FunctionSkipped => "FUNCTION_SKIPPED",
            Event::RegistryBuilt => "REGISTRY_BUILT",

            Event::EngineConnected => "ENGINE_CONNECTED",
            Event::EngineDisconnected => "ENGINE_DISCONNECTED",
            Event::WorkflowSubmitted => "WORKFLOW_SUBMITTED",
            Event::WorkflowRejected => "WORKFLOW_REJECTED",
            Event::EngineMessageRejected => "ENGINE_MESSAGE_REJECTED",
            Event::ReceiptReceived => "RECEIPT_RECEIVED",
            Event::BatchComplete => "BATCH_COMPLETE",
            Event::BatchFailed => "BATCH_FAILED",

            Event::Serving => "WASMGATE_SERVING",
            Event::RequestHandled => "REQUEST_HANDLED",
        }
    }

    /// Severity this event is logged with
    pub fn severity(&self) -> Severity {
        match self {
            Event::FunctionSkipped | Event::EngineDisconnected | Event::EngineMessageRejected => {
                Severity::Warn
            }
            Event::WorkflowRejected | Event::BatchFailed => Severity::Error,
            Event::ReceiptReceived | Event::RequestHandled => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
