//! Shared test fixtures and utilities for pincer crates.
//!
//! Provides a recording implementation of the collaborator traits and
//! checks for rigid transforms.

pub mod mocks;
pub mod rigid;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use mocks::{RecordingSink, SinkEvent};
pub use rigid::{is_rigid, rotation_block};
