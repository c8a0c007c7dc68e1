//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Validation counters
//! - Typed lifecycle events
//!
//! Observability is read-only: it never changes a validation outcome.
//!
//! ```ignore
//! use dpns::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::DocumentRejected, &[("document_type", "domain")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, ValidationMetrics};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::ContractLoaded);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::DocumentRejected, &[("document_type", "domain")]);
    }
}
