//! Observability subsystem for wasmgate
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Scope-based begin/complete logging for startup phases
//!
//! Observability never fails the caller: write errors are swallowed.
//!
//! ```ignore
//! use wasmgate::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::FunctionRegistered, &[("name", "add")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
