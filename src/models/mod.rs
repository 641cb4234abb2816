//! Data models for the roster application.
//!
//! Field names match the persisted JSON document exactly.

mod document;
mod form;
mod member;

pub use document::*;
pub use form::*;
pub use member::*;
