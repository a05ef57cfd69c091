//! Producer/consumer scenarios and insert stress runs

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tempora_store::{Event, EventCursor, EventIndex, EventStore, StoreConfig, StoreError};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A task inserting consecutive timestamps of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerSpec {
    /// Name used in log output
    pub name: String,
    pub event_type: String,
    /// Inserts timestamps `0..=max_timestamp`
    pub max_timestamp: i64,
    /// Pause after each insert
    pub interval_ms: u64,
}

impl ProducerSpec {
    pub fn new(name: &str, event_type: &str, max_timestamp: i64, interval_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            event_type: event_type.to_string(),
            max_timestamp,
            interval_ms,
        }
    }
}

/// A task walking one query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerSpec {
    /// Name used in log output
    pub name: String,
    pub event_type: String,
    /// Queries `[0, max_consume + 1)`
    pub max_consume: i64,
    /// Pause after each consumed event
    pub interval_ms: u64,
    /// Remove each event through the cursor after reading it
    #[serde(default)]
    pub remove: bool,
}

impl ConsumerSpec {
    pub fn new(name: &str, event_type: &str, max_consume: i64, interval_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            event_type: event_type.to_string(),
            max_consume,
            interval_ms,
            remove: false,
        }
    }

    pub fn with_remove(mut self, remove: bool) -> Self {
        self.remove = remove;
        self
    }
}

/// Producers and consumers run against a single store
///
/// Fields missing from a scenario file are empty, not the default scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub producers: Vec<ProducerSpec>,
    #[serde(default)]
    pub consumers: Vec<ConsumerSpec>,
}

impl Default for Scenario {
    /// Two producers sharing `type1`, one on `type2`, and a consumer per type
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            producers: vec![
                ProducerSpec::new("TP1", "type1", 10, 200),
                ProducerSpec::new("TP2-1", "type1", 10, 200),
                ProducerSpec::new("TP3", "type2", 7, 200),
            ],
            consumers: vec![
                ConsumerSpec::new("TC1", "type1", 8, 100),
                ConsumerSpec::new("TC2", "type2", 3, 200),
            ],
        }
    }
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Use the same pause for every producer and consumer
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        for producer in &mut self.producers {
            producer.interval_ms = interval_ms;
        }
        for consumer in &mut self.consumers {
            consumer.interval_ms = interval_ms;
        }
        self
    }

    pub fn with_store_config(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Make every consumer remove what it reads
    pub fn with_consumer_removal(mut self, remove: bool) -> Self {
        for consumer in &mut self.consumers {
            consumer.remove = remove;
        }
        self
    }
}

/// Outcome of a scenario run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Insert calls made by all producers
    pub inserted: usize,
    /// Events held by the store once producers finished
    pub stored: usize,
    /// Events seen per consumer name
    pub consumed: BTreeMap<String, usize>,
    /// Events still held by the store once consumers finished
    pub remaining: usize,
}

/// Run every producer to completion, then every consumer
pub async fn run_scenario(scenario: &Scenario) -> anyhow::Result<ScenarioReport> {
    let store = Arc::new(EventIndex::with_config(scenario.store.clone())?);
    let mut report = ScenarioReport::default();

    let mut producers = JoinSet::new();
    for spec in scenario.producers.iter().cloned() {
        producers.spawn(produce(Arc::clone(&store), spec));
    }
    while let Some(result) = producers.join_next().await {
        report.inserted += result.context("producer task failed")??;
    }

    report.stored = store.len();
    info!(
        inserted = report.inserted,
        stored = report.stored,
        removal_mode = ?store.config().removal_mode,
        "Producers finished"
    );

    let mut consumers = JoinSet::new();
    for spec in scenario.consumers.iter().cloned() {
        consumers.spawn(consume(Arc::clone(&store), spec));
    }
    while let Some(result) = consumers.join_next().await {
        let (name, count) = result.context("consumer task failed")?;
        report.consumed.insert(name, count);
    }

    report.remaining = store.len();
    info!(remaining = report.remaining, "Consumers finished");

    Ok(report)
}

async fn produce(store: Arc<EventIndex>, spec: ProducerSpec) -> Result<usize, StoreError> {
    let interval = Duration::from_millis(spec.interval_ms);
    let mut count = 0;

    for timestamp in 0..=spec.max_timestamp {
        store.insert(Event::new(spec.event_type.as_str(), timestamp))?;
        info!(producer = %spec.name, event_type = %spec.event_type, timestamp, "Inserted event");
        count += 1;
        sleep(interval).await;
    }

    Ok(count)
}

async fn consume(store: Arc<EventIndex>, spec: ConsumerSpec) -> (String, usize) {
    // max_consume is inclusive; i64::MAX saturates to the whole non-negative range
    let end = spec.max_consume.saturating_add(1);
    let Some(mut cursor) = store.query(&spec.event_type, 0, end) else {
        warn!(consumer = %spec.name, event_type = %spec.event_type, "No events of type");
        return (spec.name, 0);
    };

    let interval = Duration::from_millis(spec.interval_ms);
    let mut count = 0;

    while cursor.move_next() {
        if let Ok(event) = cursor.current() {
            info!(consumer = %spec.name, %event, "Consumed event");
            count += 1;
            if spec.remove && cursor.remove().is_ok() {
                debug!(consumer = %spec.name, "Removed consumed event");
            }
        }
        sleep(interval).await;
    }
    cursor.close();

    (spec.name, count)
}

/// Outcome of a stress run
#[derive(Debug, Clone, PartialEq)]
pub struct StressReport {
    pub tasks: usize,
    pub events_per_task: usize,
    /// Events read back across all per-type queries
    pub retrieved: usize,
    pub elapsed: Duration,
}

impl StressReport {
    pub fn events_per_sec(&self) -> f64 {
        (self.tasks * self.events_per_task) as f64 / self.elapsed.as_secs_f64()
    }
}

/// Insert `events_per_task` events of a distinct type from each of `tasks`
/// blocking tasks, then verify all of them are retrievable
pub async fn run_stress(
    tasks: usize,
    events_per_task: usize,
    config: StoreConfig,
) -> anyhow::Result<StressReport> {
    let store = Arc::new(EventIndex::with_config(config)?);
    let start = Instant::now();

    let mut writers = JoinSet::new();
    for task in 0..tasks {
        let store = Arc::clone(&store);
        writers.spawn_blocking(move || -> Result<(), StoreError> {
            let event_type = format!("stress-{task}");
            for timestamp in 0..events_per_task as i64 {
                store.insert(Event::new(event_type.as_str(), timestamp))?;
            }
            Ok(())
        });
    }
    while let Some(result) = writers.join_next().await {
        result.context("writer task failed")??;
    }
    let elapsed = start.elapsed();

    let mut retrieved = 0;
    for task in 0..tasks {
        let event_type = format!("stress-{task}");
        let count = store
            .query(&event_type, i64::MIN, i64::MAX)
            .map(|cursor| cursor.count())
            .unwrap_or(0);
        if count != events_per_task {
            bail!("{event_type}: expected {events_per_task} events, found {count}");
        }
        retrieved += count;
    }

    let report = StressReport {
        tasks,
        events_per_task,
        retrieved,
        elapsed,
    };
    info!(
        tasks,
        retrieved,
        elapsed_ms = elapsed.as_millis() as u64,
        events_per_sec = report.events_per_sec(),
        "Stress run finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_store::RemovalMode;

    #[tokio::test]
    async fn test_default_scenario_counts() {
        let report = run_scenario(&Scenario::default().with_interval_ms(0))
            .await
            .unwrap();

        // 11 + 11 + 8 inserts; the two type1 producers overwrite each other
        assert_eq!(report.inserted, 30);
        assert_eq!(report.stored, 19);
        assert_eq!(report.consumed["TC1"], 9);
        assert_eq!(report.consumed["TC2"], 4);
        assert_eq!(report.remaining, 19);
    }

    #[tokio::test]
    async fn test_consumer_of_unknown_type_sees_nothing() {
        let scenario = Scenario {
            store: StoreConfig::default(),
            producers: vec![ProducerSpec::new("P", "known", 3, 0)],
            consumers: vec![ConsumerSpec::new("C", "unknown", 3, 0)],
        };

        let report = run_scenario(&scenario).await.unwrap();
        assert_eq!(report.consumed["C"], 0);
    }

    #[tokio::test]
    async fn test_removing_consumers_drain_write_through_store() {
        let scenario = Scenario::default()
            .with_interval_ms(0)
            .with_consumer_removal(true)
            .with_store_config(StoreConfig::new().with_removal_mode(RemovalMode::WriteThrough));

        let report = run_scenario(&scenario).await.unwrap();
        assert_eq!(report.stored, 19);
        assert_eq!(report.consumed["TC1"], 9);
        assert_eq!(report.consumed["TC2"], 4);
        // type1 keeps 9 and 10, type2 keeps 4..=7
        assert_eq!(report.remaining, 19 - 9 - 4);
    }

    #[tokio::test]
    async fn test_removing_consumers_leave_snapshot_only_store_intact() {
        let scenario = Scenario::default()
            .with_interval_ms(0)
            .with_consumer_removal(true);

        let report = run_scenario(&scenario).await.unwrap();
        assert_eq!(report.consumed["TC1"], 9);
        assert_eq!(report.remaining, 19);
    }

    #[tokio::test]
    async fn test_unbounded_consumer_reads_every_event() {
        let scenario = Scenario {
            store: StoreConfig::default(),
            producers: vec![ProducerSpec::new("P", "t", 4, 0)],
            consumers: vec![ConsumerSpec::new("C", "t", i64::MAX, 0)],
        };

        let report = run_scenario(&scenario).await.unwrap();
        assert_eq!(report.consumed["C"], 5);
        assert_eq!(report.remaining, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stress_retrieves_every_insert() {
        let report = run_stress(8, 500, StoreConfig::default()).await.unwrap();
        assert_eq!(report.retrieved, 8 * 500);
    }

    #[test]
    fn test_scenario_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(
            &path,
            r#"{
                "store": {"removal_mode": "write_through"},
                "producers": [{"name": "P", "event_type": "t", "max_timestamp": 2, "interval_ms": 5}]
            }"#,
        )
        .unwrap();

        let scenario = Scenario::from_json_file(&path).unwrap();
        assert_eq!(scenario.store.removal_mode, RemovalMode::WriteThrough);
        assert_eq!(scenario.producers, vec![ProducerSpec::new("P", "t", 2, 5)]);
        assert!(scenario.consumers.is_empty());
    }

    #[test]
    fn test_consumer_remove_flag_from_json() {
        let consumers: Vec<ConsumerSpec> = serde_json::from_str(
            r#"[
                {"name": "A", "event_type": "t", "max_consume": 1, "interval_ms": 0},
                {"name": "B", "event_type": "t", "max_consume": 1, "interval_ms": 0, "remove": true}
            ]"#,
        )
        .unwrap();
        assert!(!consumers[0].remove);
        assert_eq!(consumers[1], ConsumerSpec::new("B", "t", 1, 0).with_remove(true));
    }

    #[test]
    fn test_scenario_from_missing_file_fails() {
        let result = Scenario::from_json_file(Path::new("/nonexistent/scenario.json"));
        assert!(result.is_err());
    }
}
