//! Post lookup used by the demo form.
//!
//! A thin consumer of the error layer: caller-signaled validation failures
//! go to the overlay, transport failures are normalized for the inline panel.

pub mod client;
pub mod lookup;
pub mod models;

pub use {
    client::{HttpPostSource, PostSource},
    lookup::{LookupOutcome, PostLookup, trigger_syntax_error, validate_post_id},
    models::Post,
};
