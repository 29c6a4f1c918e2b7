//! Replaceable hook for runtime errors.
//!
//! A mounted boundary installs itself here so that runtime errors raised
//! through `GlobalInterceptors::handle_runtime_error` land in its local
//! state instead of the overlay.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::normalize::NormalizedError;

type Hook = Arc<dyn Fn(NormalizedError) + Send + Sync>;

#[derive(Default)]
struct HookState {
    next_id: u64,
    current: Option<(u64, Hook)>,
}

/// Slot holding at most one runtime-error hook.
#[derive(Clone, Default)]
pub struct RuntimeHookSlot {
    state: Arc<RwLock<HookState>>,
}

impl RuntimeHookSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `hook`, replacing any previous one.
    ///
    /// # Returns
    ///
    /// A guard that clears the slot on drop, unless another hook has been
    /// installed in the meantime.
    pub fn install<F>(&self, hook: F) -> RuntimeHookGuard
    where
        F: Fn(NormalizedError) + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        state.next_id += 1;
        let id = state.next_id;
        state.current = Some((id, Arc::new(hook)));

        RuntimeHookGuard {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Whether a hook is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.state.read().current.is_some()
    }

    /// Passes `error` to the installed hook.
    ///
    /// # Returns
    ///
    /// The error back when no hook is installed, so the caller can route it
    /// elsewhere.
    pub fn handle(&self, error: NormalizedError) -> Result<(), NormalizedError> {
        let hook = self.state.read().current.as_ref().map(|(_, hook)| Arc::clone(hook));
        match hook {
            Some(hook) => {
                hook(error);
                Ok(())
            }
            None => Err(error),
        }
    }
}

/// Registration handle returned by `RuntimeHookSlot::install`.
#[must_use = "dropping the guard uninstalls the hook"]
pub struct RuntimeHookGuard {
    id: u64,
    state: Weak<RwLock<HookState>>,
}

impl Drop for RuntimeHookGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.write();
            if state.current.as_ref().is_some_and(|(id, _)| *id == self.id) {
                state.current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::{error::normalize::NormalizedError, intercept::runtime_hook::RuntimeHookSlot};

    #[test]
    fn test_empty_slot_returns_error() {
        let slot = RuntimeHookSlot::new();
        let returned = slot
            .handle(NormalizedError::from_message("unrouted"))
            .unwrap_err();
        assert_eq!(returned.message, "unrouted");
    }

    #[test]
    fn test_installed_hook_receives_errors() {
        let slot = RuntimeHookSlot::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let _guard = slot.install(move |error| sink.lock().push(error.message));
        assert!(slot.handle(NormalizedError::from_message("caught")).is_ok());
        assert_eq!(*received.lock(), vec!["caught".to_string()]);
    }

    #[test]
    fn test_stale_guard_does_not_remove_newer_hook() {
        let slot = RuntimeHookSlot::new();
        let first = slot.install(|_| {});
        let second = slot.install(|_| {});

        drop(first);
        assert!(slot.is_installed());

        drop(second);
        assert!(!slot.is_installed());
    }
}
