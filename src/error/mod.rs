//! Error handling built on `thiserror` and `anyhow`, plus the normalization
//! and reporting layer that every failure source funnels through.
//!
//! Domain-specific enums give precise handling at call sites, the normalizer
//! turns any failure into a display-ready record, and the operational module
//! carries messages to the blocking overlay.

pub mod domain;
pub mod normalize;
pub mod operational;

pub use {
    domain::{LookupError, TransportError, UiError},
    normalize::{ErrorNormalizer, NormalizedError, RawFailure},
    operational::{ErrorReporter, ResultExt, overlay_feed, report_global_error},
};
