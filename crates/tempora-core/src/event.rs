//! Event records and their composite keys

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A timestamped, typed event
///
/// Events have no identity beyond their fields: two events with the same
/// type and timestamp are indistinguishable to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Type label used to partition the store
    #[serde(rename = "type")]
    event_type: String,
    /// Timestamp, compared as a plain integer
    timestamp: i64,
}

impl Event {
    /// Create a new event
    pub fn new(event_type: impl Into<String>, timestamp: i64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
        }
    }

    /// The event's type label
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The event's timestamp
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Derive the key this event is stored under
    pub fn key(&self) -> EventKey {
        EventKey::from(self)
    }

    /// Whether the timestamp lies in `[start, end)`
    pub fn in_range(&self, start: i64, end: i64) -> bool {
        start <= self.timestamp && self.timestamp < end
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event{{type: {}, timestamp: {}}}",
            self.event_type, self.timestamp
        )
    }
}

/// Composite key of an event inside its type's mapping
///
/// Two events of the same type and timestamp produce equal keys, so a later
/// insert overwrites an earlier one.
///
/// `Display` renders the legacy `"{timestamp}{type}"` concatenation. That
/// string is not injective across types (`1` + `2t` and `12` + `t` both
/// render as `12t`), while the key itself compares both fields. Within one
/// type's mapping the suffix is fixed and the two schemes address the same
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    /// Timestamp of the keyed event
    pub timestamp: i64,
    /// Type of the keyed event
    pub event_type: String,
}

impl EventKey {
    /// Create a new key
    pub fn new(timestamp: i64, event_type: impl Into<String>) -> Self {
        Self {
            timestamp,
            event_type: event_type.into(),
        }
    }
}

impl From<&Event> for EventKey {
    fn from(event: &Event) -> Self {
        Self::new(event.timestamp, event.event_type.as_str())
    }
}

impl Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.timestamp, self.event_type)
    }
}
