//! Core traits for Tempora
//!
//! These traits separate the operations callers rely on from the indexing
//! strategy behind them.

use crate::error::{CursorError, StoreError};
use crate::event::Event;

/// Storage of timestamped, typed events
///
/// Implementations must be safe to share between threads: `insert`,
/// `remove_all` and `query` may all be called concurrently.
pub trait EventStore: Send + Sync {
    /// Cursor type returned by [`EventStore::query`]
    type Cursor: EventCursor;

    /// Store an event, overwriting any event with the same type and timestamp
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyEventType`] if the event has an empty type.
    fn insert(&self, event: Event) -> Result<(), StoreError>;

    /// Remove every event of the given type
    ///
    /// Unknown types are ignored. Cursors produced by earlier queries keep
    /// their results.
    fn remove_all(&self, event_type: &str);

    /// Query events of a type whose timestamp lies in `[start_time, end_time)`
    ///
    /// Returns `None` when no event of this type is stored (or the type is
    /// empty). A known type with no matching events yields an empty cursor.
    fn query(&self, event_type: &str, start_time: i64, end_time: i64) -> Option<Self::Cursor>;
}

/// Forward-only, single-pass handle over a query result
///
/// A cursor starts unpositioned. Each successful [`move_next`] positions it
/// on the next event; once `move_next` returns `false`, or after [`close`],
/// it stays terminal.
///
/// [`move_next`]: EventCursor::move_next
/// [`close`]: EventCursor::close
pub trait EventCursor {
    /// Advance to the next event
    ///
    /// Returns `false` when no event remains.
    fn move_next(&mut self) -> bool;

    /// The event the cursor is positioned on
    fn current(&self) -> Result<&Event, CursorError>;

    /// Remove the event the cursor is positioned on from the result set
    ///
    /// Does not advance the cursor.
    fn remove(&mut self) -> Result<(), CursorError>;

    /// Release the cursor; always safe and idempotent
    fn close(&mut self);
}
