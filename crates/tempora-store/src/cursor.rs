//! Result cursors over query snapshots
//!
//! A [`ResultCursor`] owns a detached copy of the events a query matched.
//! Later inserts or removals on the index are not observed, and removal
//! through the cursor only touches the live index in
//! [`RemovalMode::WriteThrough`](crate::RemovalMode::WriteThrough).

use std::collections::HashMap;
use std::sync::Arc;

use tempora_core::{CursorError, Event, EventCursor, EventKey};
use tracing::trace;

use crate::index::TypeMap;

/// Where a cursor stands in its snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// No `move_next` yet
    Fresh,
    /// Positioned on a key of the snapshot
    At(EventKey),
    /// `move_next` ran out of keys
    Exhausted,
    /// Released through `close`
    Closed,
}

/// Forward-only, single-pass cursor over a query result
///
/// Iteration order is unspecified. The cursor is meant for a single
/// consumer; all mutating methods take `&mut self`.
#[derive(Debug)]
pub struct ResultCursor {
    /// Events matched by the query, keyed as in the index
    snapshot: HashMap<EventKey, Event>,
    /// Keys not yet visited
    order: std::vec::IntoIter<EventKey>,
    position: Position,
    /// Live per-type map, kept only for write-through removal
    source: Option<Arc<TypeMap>>,
}

impl ResultCursor {
    pub(crate) fn new(snapshot: HashMap<EventKey, Event>, source: Option<Arc<TypeMap>>) -> Self {
        let order: Vec<EventKey> = snapshot.keys().cloned().collect();
        Self {
            snapshot,
            order: order.into_iter(),
            position: Position::Fresh,
            source,
        }
    }

    /// Create a detached cursor over the given events
    ///
    /// Events sharing a type and timestamp collapse to the last one given.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let snapshot = events
            .into_iter()
            .map(|event| (event.key(), event))
            .collect();
        Self::new(snapshot, None)
    }

    /// Number of events left in the result set
    ///
    /// Includes events already visited; excludes events removed through
    /// the cursor.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Check if the result set is empty
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Whether the cursor is positioned on a key
    pub fn is_positioned(&self) -> bool {
        matches!(self.position, Position::At(_))
    }
}

impl EventCursor for ResultCursor {
    fn move_next(&mut self) -> bool {
        if matches!(self.position, Position::Exhausted | Position::Closed) {
            return false;
        }

        match self.order.next() {
            Some(key) => {
                self.position = Position::At(key);
                true
            }
            None => {
                self.position = Position::Exhausted;
                false
            }
        }
    }

    fn current(&self) -> Result<&Event, CursorError> {
        match &self.position {
            Position::At(key) => self.snapshot.get(key).ok_or(CursorError::Removed),
            _ => Err(CursorError::NotPositioned),
        }
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        let Position::At(key) = &self.position else {
            return Err(CursorError::NotPositioned);
        };

        self.snapshot.remove(key).ok_or(CursorError::Removed)?;
        trace!(key = %key, "Removed event from cursor snapshot");

        if let Some(source) = &self.source
            && source.remove(key).is_some()
        {
            trace!(key = %key, "Removed event from live index");
        }

        Ok(())
    }

    fn close(&mut self) {
        self.position = Position::Closed;
        self.source = None;
    }
}

impl Iterator for ResultCursor {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.move_next() {
            return None;
        }
        self.current().ok().cloned()
    }
}
