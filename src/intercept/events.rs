//! Publish/subscribe channel for error events.
//!
//! Error events are the sideways signaling path between unrelated
//! components: a component that catches a subtree failure dispatches a
//! `SubtreeFailure` event and the nearest mounted boundary claims it, while
//! the global listener surfaces every event nobody claimed.

use std::{
    panic::{AssertUnwindSafe, Location, catch_unwind},
    sync::{Arc, Weak},
};

use {parking_lot::RwLock, tracing::warn};

use crate::error::normalize::NormalizedError;

/// Payload of the custom subtree-failure signal.
#[derive(Debug, Clone)]
pub struct SubtreeFailure {
    /// Marks the failure as raised by a component subtree.
    pub is_component_error: bool,
    /// The failure itself.
    pub error: NormalizedError,
}

/// An error event travelling through the `ErrorEventBus`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    /// Error message.
    pub message: String,
    /// Source file the error was raised from.
    pub filename: String,
    /// Line within `filename`.
    pub lineno: u32,
    /// Column within `filename`.
    pub colno: u32,
    /// Subtree-failure payload, when the event is the custom signal.
    pub detail: Option<SubtreeFailure>,
    default_prevented: bool,
}

impl ErrorEvent {
    /// Creates a plain error event.
    pub fn new(message: impl Into<String>, filename: impl Into<String>, lineno: u32, colno: u32) -> Self {
        Self {
            message: message.into(),
            filename: filename.into(),
            lineno,
            colno,
            detail: None,
            default_prevented: false,
        }
    }

    /// Creates a plain error event located at the caller.
    #[track_caller]
    pub fn here(message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(message, location.file(), location.line(), location.column())
    }

    /// Creates a subtree-failure signal located at the caller.
    #[track_caller]
    pub fn subtree_failure(error: NormalizedError) -> Self {
        let mut event = Self::here(error.message.clone());
        event.detail = Some(SubtreeFailure {
            is_component_error: true,
            error,
        });
        event
    }

    /// Stops the bus's default action and tells later listeners the event was handled.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener already handled the event.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// The subtree-failure payload, if this is a component error signal.
    #[must_use]
    pub fn component_failure(&self) -> Option<&SubtreeFailure> {
        self.detail
            .as_ref()
            .filter(|detail| detail.is_component_error)
    }
}

type Listener = Arc<dyn Fn(&mut ErrorEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Listener registry for error events.
///
/// Listeners run newest first, so the most recently mounted boundary sees a
/// subtree failure before any outer one and the listener registered at
/// startup runs last.
#[derive(Clone, Default)]
pub struct ErrorEventBus {
    listeners: Arc<RwLock<ListenerTable>>,
}

impl ErrorEventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    ///
    /// # Returns
    ///
    /// A `Subscription` that removes the listener when dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&mut ErrorEvent) + Send + Sync + 'static,
    {
        let mut table = self.listeners.write();
        table.next_id += 1;
        let id = table.next_id;
        table.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().entries.len()
    }

    /// Delivers an event to every listener.
    ///
    /// A panicking listener is skipped; the remaining listeners still run.
    /// When no listener prevents the default action the event is logged as
    /// a warning.
    ///
    /// # Returns
    ///
    /// `true` if a listener prevented the default action.
    pub fn dispatch(&self, mut event: ErrorEvent) -> bool {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .entries
            .iter()
            .rev()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&mut event))).is_err() {
                warn!("Error event listener panicked");
            }
        }

        if !event.default_prevented {
            warn!(
                filename = %event.filename,
                lineno = event.lineno,
                colno = event.colno,
                "Unclaimed error event: {}",
                event.message
            );
        }

        event.default_prevented
    }
}

/// Registration handle returned by `ErrorEventBus::subscribe`.
#[must_use = "dropping a subscription removes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RwLock<ListenerTable>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::{
        error::normalize::NormalizedError,
        intercept::events::{ErrorEvent, ErrorEventBus},
    };

    #[test]
    fn test_listeners_run_newest_first() {
        let bus = ErrorEventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _outer = bus.subscribe(move |_| first.lock().push("outer"));
        let second = Arc::clone(&order);
        let _inner = bus.subscribe(move |_| second.lock().push("inner"));

        bus.dispatch(ErrorEvent::here("boom"));
        assert_eq!(*order.lock(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_prevent_default_is_visible_to_later_listeners() {
        let bus = ErrorEventBus::new();
        let seen = Arc::new(Mutex::new(None));

        let seen_clone = Arc::clone(&seen);
        let _outer = bus.subscribe(move |event| {
            *seen_clone.lock() = Some(event.default_prevented());
        });
        let _inner = bus.subscribe(|event| event.prevent_default());

        assert!(bus.dispatch(ErrorEvent::here("handled")));
        assert_eq!(*seen.lock(), Some(true));
    }

    #[test]
    fn test_unclaimed_event_reports_not_prevented() {
        let bus = ErrorEventBus::new();
        let _listener = bus.subscribe(|_| {});
        assert!(!bus.dispatch(ErrorEvent::new("x", "main.rs", 1, 2)));
    }

    #[test]
    fn test_dropping_subscription_removes_listener() {
        let bus = ErrorEventBus::new();
        let subscription = bus.subscribe(|event| event.prevent_default());
        assert_eq!(bus.listener_count(), 1);

        drop(subscription);
        assert_eq!(bus.listener_count(), 0);
        assert!(!bus.dispatch(ErrorEvent::here("nobody")));
    }

    #[test]
    fn test_panicking_listener_does_not_stop_dispatch() {
        let bus = ErrorEventBus::new();
        let _outer = bus.subscribe(|event| event.prevent_default());
        let _inner = bus.subscribe(|_| panic!("listener failure"));

        assert!(bus.dispatch(ErrorEvent::here("still delivered")));
    }

    #[test]
    fn test_subtree_failure_signal() {
        let event = ErrorEvent::subtree_failure(NormalizedError::from_message("render failed"));
        let failure = event.component_failure().unwrap();
        assert!(failure.is_component_error);
        assert_eq!(failure.error.message, "render failed");
        assert_eq!(event.message, "render failed");
        assert!(event.filename.ends_with("events.rs"));

        assert!(ErrorEvent::here("plain").component_failure().is_none());
    }
}
