//! Tempora - Event Store Workloads
//!
//! Runs concurrent producers and consumers against an in-memory event store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tempora_logging::{LogConfig, TemporaSubscriberBuilder};
use tempora_store::{RemovalMode, StoreConfig};
use tracing::info;

use tempora_simulation::{Scenario, run_scenario, run_stress};

#[derive(Parser)]
#[command(
    name = "tempora-simulation",
    about = "Concurrent producer/consumer workloads for the Tempora event store",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Human-readable console output instead of JSONL
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run producers, then consumers, against one store
    Run {
        /// JSON scenario file (defaults to the built-in two-type scenario)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override every producer and consumer interval
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Propagate cursor removal to the live store (see `--remove`)
        #[arg(long)]
        write_through: bool,

        /// Make consumers remove every event they read
        #[arg(long)]
        remove: bool,
    },

    /// Insert from many tasks and verify nothing was lost
    Stress {
        /// Number of writer tasks, one event type each
        #[arg(short, long, default_value = "8")]
        tasks: usize,

        /// Events inserted by each task
        #[arg(short, long, default_value = "10000")]
        events: usize,

        /// DashMap shard count (power of two)
        #[arg(long)]
        shards: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = if cli.pretty {
        LogConfig::development()
    } else {
        LogConfig::default()
    };
    let level = if cli.verbose { "debug" } else { "info" };
    let _guard = TemporaSubscriberBuilder::new()
        .with_config(base)
        .with_level(level)
        .init()?;

    match cli.command {
        Commands::Run {
            config,
            interval_ms,
            write_through,
            remove,
        } => {
            let mut scenario = match config {
                Some(path) => Scenario::from_json_file(&path)?,
                None => Scenario::default(),
            };
            if let Some(interval_ms) = interval_ms {
                scenario = scenario.with_interval_ms(interval_ms);
            }
            if write_through {
                scenario.store.removal_mode = RemovalMode::WriteThrough;
            }
            if remove {
                scenario = scenario.with_consumer_removal(true);
            }

            let report = run_scenario(&scenario).await?;
            info!(
                inserted = report.inserted,
                stored = report.stored,
                consumed = ?report.consumed,
                remaining = report.remaining,
                "Scenario finished"
            );
        }
        Commands::Stress {
            tasks,
            events,
            shards,
        } => {
            let config = StoreConfig {
                shard_amount: shards,
                ..StoreConfig::default()
            };
            let report = run_stress(tasks, events, config).await?;
            println!(
                "Inserted and retrieved {} events from {} tasks in {:?} ({:.2} events/sec)",
                report.retrieved,
                report.tasks,
                report.elapsed,
                report.events_per_sec()
            );
        }
    }

    Ok(())
}
