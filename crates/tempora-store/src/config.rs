//! Store configuration
//!
//! This module controls how the index allocates its maps and how removal
//! through a result cursor propagates.

use serde::{Deserialize, Serialize};
use tempora_core::StoreError;

/// What `remove` on a result cursor deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Remove from the cursor's own snapshot only (default)
    ///
    /// A later query against the store still returns the event.
    #[default]
    SnapshotOnly,
    /// Remove from the snapshot and from the live per-type map it was
    /// queried from
    WriteThrough,
}

/// Configuration for an [`EventIndex`](crate::EventIndex)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How cursor removal propagates
    pub removal_mode: RemovalMode,
    /// Shard count for the type map and each per-type map
    ///
    /// `None` lets DashMap pick from the available parallelism. When set it
    /// must be a power of two greater than 1.
    pub shard_amount: Option<usize>,
    /// Initial capacity of each per-type map
    pub type_capacity: usize,
}

impl StoreConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the removal mode
    pub fn with_removal_mode(mut self, mode: RemovalMode) -> Self {
        self.removal_mode = mode;
        self
    }

    /// Check the configuration before it is used to build maps
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `shard_amount` is not a
    /// power of two greater than 1.
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(shards) = self.shard_amount
            && (shards <= 1 || !shards.is_power_of_two())
        {
            return Err(StoreError::invalid_config(format!(
                "shard_amount must be a power of two greater than 1, got {shards}"
            )));
        }
        Ok(())
    }
}

/// Builder for StoreConfig
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    removal_mode: Option<RemovalMode>,
    shard_amount: Option<usize>,
    type_capacity: Option<usize>,
}

impl StoreConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the removal mode
    pub fn removal_mode(mut self, mode: RemovalMode) -> Self {
        self.removal_mode = Some(mode);
        self
    }

    /// Set the shard count
    pub fn shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Set the initial capacity of each per-type map
    pub fn type_capacity(mut self, capacity: usize) -> Self {
        self.type_capacity = Some(capacity);
        self
    }

    /// Build and validate the StoreConfig
    pub fn build(self) -> Result<StoreConfig, StoreError> {
        let mut config = StoreConfig::default();

        if let Some(mode) = self.removal_mode {
            config.removal_mode = mode;
        }
        if let Some(shards) = self.shard_amount {
            config.shard_amount = Some(shards);
        }
        if let Some(capacity) = self.type_capacity {
            config.type_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }
}
