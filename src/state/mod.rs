//! UI-facing error state: the singleton overlay, recoverable boundaries,
//! and inline error panels.
//!
//! These types hold the state machines and stay free of widget code so they
//! can be driven and tested without a display; the `ui` module renders them.

pub mod boundary;
pub mod inline_panel;
pub mod overlay;

pub use {
    boundary::{BoundaryMount, BoundaryState, RecoverableBoundary},
    inline_panel::InlinePanelState,
    overlay::{DisplayRoot, OverlayController, OverlaySurface, SurfaceActions, SurfaceContent, SurfaceHandle},
};
