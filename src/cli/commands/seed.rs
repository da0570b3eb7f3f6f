//! Seed command implementation

use crate::adapters::store::RecordStore;
use crate::cli::commands::{connect_or_report, load_or_report, EXIT_FATAL, EXIT_SUCCESS};
use crate::config::{DatabaseTarget, GeneratorConfig};
use crate::core::generator;
use crate::domain::PendingRecord;
use chrono::Local;
use clap::Args;

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of records to create (defaults to generator.batch_size)
    #[arg(long)]
    pub count: Option<usize>,
}

impl SeedArgs {
    /// Execute the seed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if config.database_target == DatabaseTarget::Memory {
            println!("⚠️  database_target is 'memory'; seeded records vanish when this command exits");
        }

        let stores = match connect_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let count = self.count.unwrap_or(config.generator.batch_size);
        match seed_and_report(stores.records.as_ref(), &config.generator, count).await {
            Ok(_) => Ok(EXIT_SUCCESS),
            Err(code) => Ok(code),
        }
    }
}

/// Seed `count` records and print them
pub(crate) async fn seed_and_report(
    store: &(dyn RecordStore + Send + Sync),
    config: &GeneratorConfig,
    count: usize,
) -> Result<Vec<PendingRecord>, i32> {
    let now = Local::now().naive_local();
    println!("🌱 Seeding {count} record(s) at {}", now.format("%Y-%m-%dT%H:%M:%S"));

    let records = generator::seed(store, config, count, now).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to seed records");
        println!("❌ Failed to seed records");
        println!("   Error: {e}");
        EXIT_FATAL
    })?;

    for record in &records {
        println!(
            "  ✓ id={} name={} _id={} email={} phone={}",
            record.id, record.name, record.correlation_id, record.email, record.phone
        );
    }
    println!("  {} record(s) created", records.len());
    println!();

    Ok(records)
}
