//! Error types for Tempora

use thiserror::Error;

/// Misuse of a result cursor
///
/// These are contract violations scoped to the cursor instance that was
/// misused; the store itself is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CursorError {
    /// `current`/`remove` called before a successful `move_next`, after
    /// exhaustion, or after `close`
    #[error("Cursor is not positioned on an event")]
    NotPositioned,

    /// The event under the cursor was already removed through this cursor
    #[error("Event under the cursor was removed")]
    Removed,
}

/// Errors raised by store operations and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Inserted event carries an empty type label
    #[error("Event type must not be empty")]
    EmptyEventType,

    /// Store configuration rejected by validation
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
