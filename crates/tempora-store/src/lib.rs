//! # Tempora Store
//!
//! Concurrent in-memory storage of timestamped, typed events.
//!
//! ## Features
//!
//! - **EventIndex**: Two-level `DashMap` index (type, then event key) with
//!   per-shard locking and atomic creation of per-type maps
//! - **ResultCursor**: Forward-only cursor over a detached query snapshot
//! - **StoreConfig**: Shard layout and cursor removal semantics
//!
//! ## Example
//!
//! ```rust
//! use tempora_store::{Event, EventCursor, EventIndex, EventStore};
//!
//! let store = EventIndex::new();
//! store.insert(Event::new("login", 1)).unwrap();
//! store.insert(Event::new("login", 2)).unwrap();
//! store.insert(Event::new("login", 3)).unwrap();
//!
//! // Start inclusive, end exclusive
//! let mut cursor = store.query("login", 1, 3).expect("type is known");
//! let mut count = 0;
//! while cursor.move_next() {
//!     let event = cursor.current().unwrap();
//!     assert!(event.timestamp() < 3);
//!     count += 1;
//! }
//! assert_eq!(count, 2);
//!
//! // Unknown types yield no cursor at all
//! assert!(store.query("logout", 0, 10).is_none());
//! ```

pub mod config;
pub mod cursor;
pub mod index;

// Re-exports
pub use config::{RemovalMode, StoreConfig, StoreConfigBuilder};
pub use cursor::ResultCursor;
pub use index::EventIndex;

// Re-export core types and traits for convenience
pub use tempora_core::{CursorError, Event, EventCursor, EventKey, EventStore, StoreError};
