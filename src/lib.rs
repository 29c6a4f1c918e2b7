//! Faultveil - layered error capture for Libadwaita applications
//!
//! Every failure a desktop application can hit ends up somewhere visible:
//! uncaught failures and caller-signaled errors in a single blocking
//! overlay, subtree failures in a recoverable boundary with retry, and
//! transport failures in an inline panel next to the action that caused
//! them. A small post lookup form demonstrates all three paths.

pub mod config;
pub mod error;
pub mod intercept;
pub mod posts;
pub mod state;
pub mod tracing_setup;
pub mod ui;

// Re-export key types for convenience
pub use {
    config::{CaptureSettings, SettingsManager},
    error::{
        ErrorNormalizer, ErrorReporter, LookupError, NormalizedError, TransportError, UiError,
        overlay_feed, report_global_error,
    },
    intercept::{GlobalInterceptors, SubtreeFailure, events::ErrorEvent},
    posts::{HttpPostSource, LookupOutcome, Post, PostLookup, PostSource},
    state::{BoundaryState, InlinePanelState, OverlayController, OverlaySurface, RecoverableBoundary},
    ui::FaultveilApplication,
};
