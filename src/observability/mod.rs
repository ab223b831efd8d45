//! Observability for mockbase
//!
//! Structured, single-line JSON logging over the `log` facade.
//!
//! # Usage
//!
//! ```ignore
//! use mockbase::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryResolved, &[("table", "posts"), ("rows", "9")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a typed event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
