//! ObservationScope for start/complete logging around startup phases
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` when closed
//! - Logs `{name}_INCOMPLETE` if dropped without being closed

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs begin and end events for a named phase
///
/// ```ignore
/// let scope = ObservationScope::new("REGISTRY_LOAD");
/// // ... do work ...
/// scope.complete_with_fields(&[("functions", "3")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: bool,
    started: Instant,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope, logging `{name}_BEGIN`
    pub fn new(name: &'a str) -> Self {
        Logger::info(&format!("{}_BEGIN", name), &[]);
        Self {
            name,
            completed: false,
            started: Instant::now(),
        }
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as completed, attaching extra fields
    pub fn complete_with_fields(mut self, extra_fields: &[(&str, &str)]) {
        self.completed = true;
        let elapsed = self.elapsed_ms();
        let mut fields = vec![("duration_ms", elapsed.as_str())];
        fields.extend(extra_fields.iter().copied());
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Mark the scope as failed with a reason
    pub fn fail(mut self, reason: &str) {
        self.completed = true;
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    fn elapsed_ms(&self) -> String {
        self.started.elapsed().as_millis().to_string()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
