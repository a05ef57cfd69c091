//! Two-level concurrent event index
//!
//! The outer map goes from event type to that type's events, and each
//! per-type map goes from [`EventKey`] to the event. Removing a type drops
//! one outer entry, and a query only scans the events of its type.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tempora_core::{Event, EventKey, EventStore, StoreError};
use tracing::{debug, trace};

use crate::config::{RemovalMode, StoreConfig};
use crate::cursor::ResultCursor;

/// Events of a single type, keyed by timestamp and type
pub(crate) type TypeMap = DashMap<EventKey, Event>;

/// In-memory implementation of EventStore
///
/// Uses `DashMap` at both levels, so operations lock a single shard rather
/// than the whole index. Per-type maps are created atomically on the first
/// insert of their type.
#[derive(Debug)]
pub struct EventIndex {
    /// Map from event type to its events
    types: DashMap<String, Arc<TypeMap>>,
    config: StoreConfig,
}

impl Default for EventIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl EventIndex {
    /// Create a new index with the default configuration
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
            config: StoreConfig::default(),
        }
    }

    /// Create an index with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let types = match config.shard_amount {
            Some(shards) => DashMap::with_shard_amount(shards),
            None => DashMap::new(),
        };

        Ok(Self { types, config })
    }

    /// Get the configuration in use
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Total number of stored events across all types
    ///
    /// Walks the type map, so the result is only a point-in-time estimate
    /// while other threads write.
    pub fn len(&self) -> usize {
        self.types.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if no events are stored
    pub fn is_empty(&self) -> bool {
        self.types.iter().all(|entry| entry.value().is_empty())
    }

    /// Number of types with a per-type map
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Whether any event of this type has been stored since its last removal
    pub fn contains_type(&self, event_type: &str) -> bool {
        self.types.contains_key(event_type)
    }

    /// Number of stored events of one type
    pub fn count_of(&self, event_type: &str) -> usize {
        self.types
            .get(event_type)
            .map(|events| events.len())
            .unwrap_or(0)
    }

    /// Types currently present, in unspecified order
    pub fn event_types(&self) -> Vec<String> {
        self.types.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Drop every event of every type
    pub fn clear(&self) {
        self.types.clear();
        debug!("Cleared all event types from index");
    }

    fn new_type_map(&self) -> TypeMap {
        match self.config.shard_amount {
            Some(shards) => {
                DashMap::with_capacity_and_shard_amount(self.config.type_capacity, shards)
            }
            None => DashMap::with_capacity(self.config.type_capacity),
        }
    }
}

impl EventStore for EventIndex {
    type Cursor = ResultCursor;

    fn insert(&self, event: Event) -> Result<(), StoreError> {
        if event.event_type().is_empty() {
            return Err(StoreError::EmptyEventType);
        }

        let key = event.key();
        trace!(key = %key, "Inserting event");

        // The outer read guard is held across the inner insert so that a
        // concurrent remove_all of this type cannot detach the map mid-write.
        match self.types.get(event.event_type()) {
            Some(events) => {
                events.insert(key, event);
            }
            None => {
                let events = self
                    .types
                    .entry(event.event_type().to_owned())
                    .or_insert_with(|| {
                        debug!(event_type = %event.event_type(), "Creating type map");
                        Arc::new(self.new_type_map())
                    })
                    .downgrade();
                events.insert(key, event);
            }
        }

        Ok(())
    }

    fn remove_all(&self, event_type: &str) {
        trace!(event_type = %event_type, "Removing all events of type");

        if let Some((_, events)) = self.types.remove(event_type) {
            debug!(event_type = %event_type, count = events.len(), "Removed type map");
        }
    }

    fn query(&self, event_type: &str, start_time: i64, end_time: i64) -> Option<ResultCursor> {
        if event_type.is_empty() {
            return None;
        }

        // Clone the Arc so the outer shard is released before the scan
        let events = self.types.get(event_type).map(|e| Arc::clone(e.value()))?;

        let snapshot: HashMap<EventKey, Event> = events
            .iter()
            .filter(|entry| entry.value().in_range(start_time, end_time))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        trace!(
            event_type = %event_type,
            start_time,
            end_time,
            scanned = events.len(),
            matched = snapshot.len(),
            "Queried events"
        );

        let source = match self.config.removal_mode {
            RemovalMode::SnapshotOnly => None,
            RemovalMode::WriteThrough => Some(events),
        };

        Some(ResultCursor::new(snapshot, source))
    }
}
