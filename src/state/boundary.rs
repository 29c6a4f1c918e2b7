//! Recoverable error boundary state machine.
//!
//! A boundary wraps one UI subtree. While `Idle` the subtree is built
//! normally; a failure while building it, a subtree-failure event, or a
//! routed runtime error moves the boundary to `Errored`, where a fallback is
//! shown instead. `retry` returns to `Idle` and the subtree is rebuilt from
//! scratch, so no state of the failed subtree survives.

use std::sync::{Arc, Weak};

use {
    anyhow::Result as AnyhowResult,
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::RwLock,
    tracing::{debug, error},
};

use crate::{
    error::normalize::{ErrorNormalizer, NormalizedError},
    intercept::{
        GlobalInterceptors, catch_subtree_panic, events::Subscription,
        runtime_hook::RuntimeHookGuard,
    },
};

/// State of a `RecoverableBoundary`.
#[derive(Debug, Clone, Default)]
pub enum BoundaryState {
    /// The subtree renders normally.
    #[default]
    Idle,
    /// The subtree failed; the fallback is shown.
    Errored(NormalizedError),
}

impl BoundaryState {
    /// Whether the boundary holds an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        matches!(self, BoundaryState::Errored(_))
    }

    /// The captured error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&NormalizedError> {
        match self {
            BoundaryState::Idle => None,
            BoundaryState::Errored(error) => Some(error),
        }
    }
}

/// Subtree-scoped catcher of failures with a retry transition.
///
/// Captures may arrive from any thread; every transition is also published
/// on the channel returned by `transitions`, which the view consumes on the
/// UI thread.
#[derive(Debug)]
pub struct RecoverableBoundary {
    state: RwLock<BoundaryState>,
    transitions_tx: Sender<BoundaryState>,
    transitions_rx: Receiver<BoundaryState>,
}

impl RecoverableBoundary {
    /// Creates an idle boundary.
    pub fn new() -> Arc<Self> {
        let (transitions_tx, transitions_rx) = unbounded();
        Arc::new(Self {
            state: RwLock::new(BoundaryState::Idle),
            transitions_tx,
            transitions_rx,
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BoundaryState {
        self.state.read().clone()
    }

    /// Moves to `Errored` with `error`, replacing an earlier error.
    pub fn capture(&self, error: NormalizedError) {
        error!("Error caught by component boundary: {}", error.message);
        *self.state.write() = BoundaryState::Errored(error.clone());
        self.publish(BoundaryState::Errored(error));
    }

    /// Moves back to `Idle`.
    ///
    /// # Returns
    ///
    /// `false` if the boundary was already idle.
    pub fn retry(&self) -> bool {
        {
            let mut state = self.state.write();
            if !state.has_error() {
                return false;
            }
            *state = BoundaryState::Idle;
        }
        debug!("Component boundary reset for retry");
        self.publish(BoundaryState::Idle);
        true
    }

    /// Receiver of state transitions, in order.
    pub fn transitions(&self) -> Receiver<BoundaryState> {
        self.transitions_rx.clone()
    }

    /// Builds the subtree with `factory` if the boundary is idle.
    ///
    /// An `Err` returned by the factory or a panic raised inside it is
    /// captured instead of propagating.
    ///
    /// # Returns
    ///
    /// The built subtree, or `None` when the boundary is (or just became)
    /// errored.
    pub fn build_guarded<W>(&self, factory: impl FnOnce() -> AnyhowResult<W>) -> Option<W> {
        if self.state.read().has_error() {
            return None;
        }

        match catch_subtree_panic(factory) {
            Ok(Ok(subtree)) => Some(subtree),
            Ok(Err(failure)) => {
                self.capture(ErrorNormalizer::normalize(failure));
                None
            }
            Err(payload) => {
                self.capture(ErrorNormalizer::from_panic_payload(payload.as_ref()));
                None
            }
        }
    }

    /// Registers the boundary with the global interceptors.
    ///
    /// The boundary claims subtree-failure events not yet handled by an
    /// inner boundary, and becomes the runtime-error hook.
    ///
    /// # Returns
    ///
    /// A `BoundaryMount` that unregisters both when dropped.
    pub fn mount(self: &Arc<Self>, interceptors: &GlobalInterceptors) -> BoundaryMount {
        let boundary = Arc::downgrade(self);
        let subscription = interceptors.events().subscribe(move |event| {
            if event.default_prevented() {
                return;
            }
            let Some(failure) = event.component_failure() else {
                return;
            };
            if let Some(boundary) = boundary.upgrade() {
                boundary.capture(failure.error.clone());
                event.prevent_default();
            }
        });

        let boundary: Weak<Self> = Arc::downgrade(self);
        let runtime_hook = interceptors.set_runtime_error_hook(move |error| {
            if let Some(boundary) = boundary.upgrade() {
                boundary.capture(error);
            }
        });

        BoundaryMount {
            _subscription: subscription,
            _runtime_hook: runtime_hook,
        }
    }

    fn publish(&self, state: BoundaryState) {
        if self.transitions_tx.try_send(state).is_err() {
            debug!("Boundary transition channel closed");
        }
    }
}

/// Registrations held while a boundary is mounted.
#[must_use = "dropping the mount unregisters the boundary"]
pub struct BoundaryMount {
    _subscription: Subscription,
    _runtime_hook: RuntimeHookGuard,
}
