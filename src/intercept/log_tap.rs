//! Tap on the error-level logging channel.
//!
//! `LogTap` is an unfiltered layer installed beneath the layer that writes
//! log output. Error-level events whose text contains one of the configured
//! markers are forwarded to the overlay before the output layer sees them.
//! Filters on the output layer never hide events from the tap.

use std::{
    cell::Cell,
    fmt::Debug,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use {
    tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
    },
    tracing_subscriber::layer::{Context, Layer},
};

use crate::error::operational::ErrorReporter;

thread_local! {
    static IN_TAP: Cell<bool> = const { Cell::new(false) };
}

/// Layer that inspects error-level events.
pub struct LogTap {
    markers: Arc<[String]>,
    reporter: ErrorReporter,
}

impl LogTap {
    /// Creates a tap forwarding marked error events to `reporter`.
    ///
    /// # Arguments
    ///
    /// * `markers` - Substrings that promote an event to the overlay.
    /// * `reporter` - Destination of promoted events.
    pub fn new(markers: impl IntoIterator<Item = String>, reporter: ErrorReporter) -> Self {
        Self {
            markers: markers.into_iter().collect(),
            reporter,
        }
    }

    /// Forwards the event if it is error-level and contains a marker.
    fn inspect(&self, event: &Event<'_>) {
        if *event.metadata().level() != Level::ERROR || IN_TAP.with(Cell::get) {
            return;
        }

        IN_TAP.with(|flag| flag.set(true));
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let text = concatenate_fields(event);
            if contains_marker(&text, &self.markers) {
                self.reporter.report(text);
            }
        }));
        IN_TAP.with(|flag| flag.set(false));
    }
}

/// Whether `text` contains any of `markers` as a literal substring.
pub fn contains_marker(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}

/// Joins an event's fields with spaces, message first and others as `name=value`.
pub fn concatenate_fields(event: &Event<'_>) -> String {
    let mut visitor = ConcatVisitor::default();
    event.record(&mut visitor);

    let mut parts = Vec::with_capacity(visitor.fields.len() + 1);
    parts.extend(visitor.message);
    parts.extend(visitor.fields);
    parts.join(" ")
}

#[derive(Default)]
struct ConcatVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl ConcatVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

impl Visit for ConcatVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for LogTap {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.inspect(event);
    }
}
