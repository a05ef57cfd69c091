//! Stress tests for tempora-store
//!
//! These tests verify index behavior under concurrent inserts, racing type
//! creation, and mixed insert/query/remove workloads.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use rand::seq::SliceRandom;
use tempora_logging::init_testing;
use tempora_store::{
    Event, EventCursor, EventIndex, EventStore, RemovalMode, ResultCursor, StoreConfigBuilder,
};

fn collect(mut cursor: ResultCursor) -> Vec<Event> {
    let mut events = Vec::new();
    while cursor.move_next() {
        events.push(cursor.current().expect("positioned cursor").clone());
    }
    cursor.close();
    events
}

// ============================================================================
// Concurrent Insert Tests
// ============================================================================

/// N threads each inserting M events of their own type
///
/// Every insert must be retrievable afterwards, with no loss and no
/// duplication.
#[test]
fn test_concurrent_inserts_distinct_types() {
    init_testing();
    let index = Arc::new(EventIndex::new());
    let threads = 8;
    let events_per_thread: i64 = 2_000;

    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let event_type = format!("type{t}");
                for ts in 0..events_per_thread {
                    index
                        .insert(Event::new(event_type.clone(), ts))
                        .expect("Failed to insert event");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("insert thread panicked");
    }

    let duration = start.elapsed();
    let total = threads as usize * events_per_thread as usize;
    println!(
        "Inserted {} events from {} threads in {:?} ({:.2} events/sec)",
        total,
        threads,
        duration,
        total as f64 / duration.as_secs_f64()
    );

    let mut retrieved = 0;
    for t in 0..threads {
        let event_type = format!("type{t}");
        let events = collect(index.query(&event_type, i64::MIN, i64::MAX).unwrap());
        let unique: HashSet<i64> = events.iter().map(Event::timestamp).collect();

        assert_eq!(events.len(), events_per_thread as usize);
        assert_eq!(unique.len(), events.len());
        assert!(events.iter().all(|e| e.event_type() == event_type));
        retrieved += events.len();
    }

    assert_eq!(retrieved, total);
    assert_eq!(index.len(), total);
    assert_eq!(index.type_count(), threads as usize);
}

/// Many threads racing to create the same type's map
///
/// Exactly one per-type map must survive, holding every insert.
#[test]
fn test_racing_type_creation_loses_nothing() {
    init_testing();
    let index = Arc::new(EventIndex::new());
    let threads = 16;
    let events_per_thread: i64 = 500;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = t as i64 * events_per_thread;
                for ts in base..base + events_per_thread {
                    index.insert(Event::new("shared", ts)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(index.type_count(), 1);
    let events = collect(index.query("shared", i64::MIN, i64::MAX).unwrap());
    assert_eq!(events.len(), threads * events_per_thread as usize);
}

/// Concurrent writers of identical events overwrite rather than duplicate
#[test]
fn test_concurrent_overwrites_keep_one_event_per_key() {
    init_testing();
    let index = Arc::new(EventIndex::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for ts in 0..1_000 {
                    index.insert(Event::new("dup", ts)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(index.count_of("dup"), 1_000);
}

// ============================================================================
// Query Tests
// ============================================================================

/// Shuffled inserts, then range queries checked against a reference filter
#[test]
fn test_range_queries_match_reference() {
    init_testing();
    let index = EventIndex::new();
    let mut rng = rand::rng();

    let mut timestamps: Vec<i64> = (-500..500).collect();
    timestamps.shuffle(&mut rng);
    for &ts in &timestamps {
        index.insert(Event::new("metric", ts)).unwrap();
    }

    for (start, end) in [(-500, 500), (-10, 10), (0, 1), (499, 500), (100, 50)] {
        let mut got: Vec<i64> = collect(index.query("metric", start, end).unwrap())
            .iter()
            .map(Event::timestamp)
            .collect();
        got.sort_unstable();

        let expected: Vec<i64> = (start..end).collect();
        assert_eq!(got, expected, "range [{start}, {end})");
    }
}

/// Queries running while writers insert and remove other types
#[test]
fn test_queries_during_concurrent_writes() {
    init_testing();
    let index = Arc::new(EventIndex::new());
    for ts in 0..1_000 {
        index.insert(Event::new("stable", ts)).unwrap();
    }

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for round in 0..50 {
                for ts in 0..100 {
                    index.insert(Event::new("churn", round * 100 + ts)).unwrap();
                }
                index.remove_all("churn");
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..50 {
                    let events = collect(index.query("stable", 0, 1_000).unwrap());
                    assert_eq!(events.len(), 1_000);

                    // Either outcome is acceptable while churn races
                    if let Some(cursor) = index.query("churn", i64::MIN, i64::MAX) {
                        assert!(collect(cursor).iter().all(|e| e.event_type() == "churn"));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(index.query("churn", i64::MIN, i64::MAX).is_none());
    assert_eq!(index.count_of("stable"), 1_000);
}

/// Cursors are consumed on a different thread than the one that queried
#[test]
fn test_cursor_consumed_on_other_thread() {
    init_testing();
    let index = EventIndex::new();
    for ts in 0..10 {
        index.insert(Event::new("t", ts)).unwrap();
    }

    let cursor = index.query("t", 0, 5).unwrap();
    index.remove_all("t");

    let events = thread::spawn(move || collect(cursor)).join().unwrap();
    assert_eq!(events.len(), 5);
}

/// Write-through removal from several cursors over the same type
#[test]
fn test_write_through_removal_from_parallel_cursors() {
    init_testing();
    let config = StoreConfigBuilder::new()
        .removal_mode(RemovalMode::WriteThrough)
        .build()
        .unwrap();
    let index = Arc::new(EventIndex::with_config(config).unwrap());
    for ts in 0..400 {
        index.insert(Event::new("queue", ts)).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let start = worker * 100;
                let mut cursor = index.query("queue", start, start + 100).unwrap();
                while cursor.move_next() {
                    cursor.remove().unwrap();
                }
                assert!(cursor.is_empty());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(index.query("queue", i64::MIN, i64::MAX).unwrap().is_empty());
}
