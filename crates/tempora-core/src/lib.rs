//! # Tempora Core
//!
//! Core traits, types, and errors for the Tempora event store.
//!
//! This crate holds the vocabulary shared between the store implementation
//! and anything that drives it, so callers can be written against the
//! traits rather than a concrete index.
//!
//! ## Key Traits
//!
//! - [`EventStore`]: Insert, bulk removal by type, and range queries
//! - [`EventCursor`]: Forward-only, single-pass handle over a query result
//!
//! ## Key Types
//!
//! - [`Event`]: An immutable record of a type label and a timestamp
//! - [`EventKey`]: The composite key addressing an event inside its type
//! - [`CursorError`] / [`StoreError`]: Contract violations and rejected input

pub mod error;
pub mod event;
pub mod traits;

// Re-export main types
pub use error::*;
pub use event::*;
pub use traits::*;
