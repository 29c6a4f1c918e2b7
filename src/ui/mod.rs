//! Libadwaita user interface for the error surfaces and the demo form.
//!
//! This module renders the state machines from `state`: the blocking
//! overlay, recoverable boundaries and inline error panels.

pub mod application;
pub mod components;
pub mod reload;

pub use {
    application::FaultveilApplication,
    components::{BoundaryView, ErrorOverlaySurface, InlineErrorPanel, OverlayRoot, PostLookupForm},
    reload::relaunch_application,
};
