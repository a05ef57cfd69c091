//! # Tempora Simulation
//!
//! Concurrent workloads for exercising the Tempora event store.
//!
//! ## Overview
//!
//! - **Scenario**: producers insert `0..=max` timestamps of a type at a fixed
//!   interval; once every producer has finished, consumers query
//!   `[0, max_consume + 1)` of their type and walk the cursor at their own
//!   interval. Two producers may share a type, in which case their events
//!   overwrite each other key for key. Consumers may remove what they read;
//!   the removal reaches the store only under `RemovalMode::WriteThrough`.
//! - **Stress**: many tasks insert events of distinct types in parallel, then
//!   every type is queried back to check that no insert was lost.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tempora_simulation::{Scenario, run_scenario};
//!
//! let report = run_scenario(&Scenario::default().with_interval_ms(0)).await?;
//! assert_eq!(report.stored, 19);
//! ```

pub mod workload;

pub use workload::{
    ConsumerSpec, ProducerSpec, Scenario, ScenarioReport, StressReport, run_scenario, run_stress,
};
