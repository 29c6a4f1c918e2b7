//! Reusable UI components following GNOME HIG guidelines.
//!
//! This module provides the widgets that render error state: the overlay
//! surface, the boundary view and the inline panel, plus the demo form.


pub mod boundary_view;
pub mod error_overlay;
pub mod inline_error_panel;
pub mod post_lookup_form;

pub use {
    boundary_view::{BoundaryView, SubtreeFactory},
    error_overlay::{ErrorOverlaySurface, OverlayRoot},
    inline_error_panel::InlineErrorPanel,
    post_lookup_form::PostLookupForm,
};
