//! Process-wide interception of failures that normal control flow never sees.
//!
//! `GlobalInterceptors` is the interceptor registry. It is installed once at
//! startup and from then on every interception point (the logging tap, the
//! panic hook, the async-failure supervisor, and the error-event listener)
//! forwards into the same overlay feed.

pub mod events;
pub mod log_tap;
pub mod panic_hook;
pub mod rejection;
pub mod runtime_hook;

use std::{fmt::Display, future::Future, sync::OnceLock};

use {
    libadwaita::glib::JoinHandle as GlibJoinHandle,
    tokio::{runtime::Handle, task::JoinHandle},
    tracing::{debug, info},
};

use crate::{
    config::CaptureSettings,
    error::{normalize::NormalizedError, operational::ErrorReporter},
    intercept::{
        events::{ErrorEvent, ErrorEventBus, Subscription},
        panic_hook::format_uncaught,
        runtime_hook::{RuntimeHookGuard, RuntimeHookSlot},
    },
    tracing_setup::init_tracing,
};

pub use {
    events::SubtreeFailure,
    panic_hook::catch_subtree_panic,
    rejection::unhandled_rejection,
};

static INSTALLED: OnceLock<GlobalInterceptors> = OnceLock::new();

/// Registry of the process-wide interception points.
pub struct GlobalInterceptors {
    /// Destination of every intercepted failure.
    reporter: ErrorReporter,
    /// Error-event channel shared with boundaries.
    events: ErrorEventBus,
    /// Runtime-error hook claimed by the most recently mounted boundary.
    runtime_hook: RuntimeHookSlot,
    /// Listener surfacing unclaimed error events; lives as long as the registry.
    _global_listener: Subscription,
}

impl GlobalInterceptors {
    /// Creates a registry forwarding to `reporter`.
    ///
    /// Only the error-event listener is registered here; the process-level
    /// hooks are installed by `install`.
    pub fn new(reporter: ErrorReporter) -> Self {
        let events = ErrorEventBus::new();

        let listener_reporter = reporter.clone();
        let global_listener = events.subscribe(move |event: &mut ErrorEvent| {
            if event.default_prevented() {
                return;
            }
            listener_reporter.report(format_uncaught(
                &event.message,
                &event.filename,
                event.lineno,
                event.colno,
            ));
            event.prevent_default();
        });

        Self {
            reporter,
            events,
            runtime_hook: RuntimeHookSlot::new(),
            _global_listener: global_listener,
        }
    }

    /// Installs the process-wide interceptors.
    ///
    /// The first call wraps the panic hook and installs the tracing
    /// subscriber with the logging tap. Later calls return the same registry
    /// without wrapping anything a second time.
    ///
    /// Reports land in the bounded `overlay_feed()`, which the caller must
    /// pass to `OverlayController::attach_feed` once the window exists.
    ///
    /// # Arguments
    ///
    /// * `settings` - Capture settings (log markers and filter).
    ///
    /// # Returns
    ///
    /// The process-wide registry.
    pub fn install(settings: &CaptureSettings) -> &'static GlobalInterceptors {
        let mut installed_now = false;
        let interceptors = INSTALLED.get_or_init(|| {
            installed_now = true;
            GlobalInterceptors::new(ErrorReporter::global())
        });

        if installed_now {
            panic_hook::install(interceptors.reporter.clone());
            let subscriber_installed = init_tracing(settings, interceptors.reporter.clone());
            info!(subscriber_installed, "Global error interceptors installed");
        } else {
            debug!("Global error interceptors already installed");
        }

        interceptors
    }

    /// The installed registry, if `install` has run.
    pub fn get() -> Option<&'static GlobalInterceptors> {
        INSTALLED.get()
    }

    /// Reporter forwarding to this registry's overlay feed.
    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Error-event channel shared with boundaries.
    pub fn events(&self) -> &ErrorEventBus {
        &self.events
    }

    /// Dispatches an error event.
    ///
    /// # Returns
    ///
    /// `true` if a listener handled the event (which is always the case while
    /// the global listener is registered).
    pub fn dispatch_error(&self, event: ErrorEvent) -> bool {
        self.events.dispatch(event)
    }

    /// Installs a runtime-error hook, replacing the current one.
    pub fn set_runtime_error_hook<F>(&self, hook: F) -> RuntimeHookGuard
    where
        F: Fn(NormalizedError) + Send + Sync + 'static,
    {
        self.runtime_hook.install(hook)
    }

    /// Whether a runtime-error hook is installed.
    #[must_use]
    pub fn has_runtime_error_hook(&self) -> bool {
        self.runtime_hook.is_installed()
    }

    /// Routes a runtime error to the installed hook, or to the overlay.
    pub fn handle_runtime_error(&self, error: NormalizedError) {
        if let Err(error) = self.runtime_hook.handle(error) {
            self.reporter.report_error(&error);
        }
    }

    /// Spawns supervised work on the tokio runtime.
    pub fn spawn_watched<F, E>(&self, handle: &Handle, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        rejection::spawn_watched(handle, self.reporter.clone(), future)
    }

    /// Spawns supervised work on the GLib main context.
    pub fn spawn_local_watched<F, E>(&self, future: F) -> GlibJoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Display + 'static,
    {
        rejection::spawn_local_watched(self.reporter.clone(), future)
    }
}
