//! Batch CSV - load a tag file and show how it packs.
//!
//! This example demonstrates:
//! - Lenient CSV loading (bad rows are logged and skipped)
//! - Explicit duplicate removal with `dedup`
//! - Packing tags under a PDU budget
//!
//! # Running
//!
//! ```text
//! RUST_LOG=debug cargo run --example batch_csv -- tags.csv 1500
//! ```
//!
//! Logs go to stderr, the batch table to stdout.

use tagreport::batch::{BatcherConfig, ReportBatcher, DEFAULT_PDU_BUDGET};
use tagreport::codec::csv::load_tags;
use tagreport::tag::dedup;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: batch_csv <tags.csv> [pdu_budget]")?;
    let pdu_budget = match args.next() {
        Some(budget) => budget.parse()?,
        None => DEFAULT_PDU_BUDGET,
    };

    let loaded = load_tags(&path)?;
    let tags = dedup(&loaded);
    if tags.len() != loaded.len() {
        tracing::info!("Dropped {} duplicate EPCs", loaded.len() - tags.len());
    }

    let batches = ReportBatcher::new(BatcherConfig::new(pdu_budget)).batch(&tags)?;

    for (index, batch) in batches.iter().enumerate() {
        println!(
            "batch {:>4}  tags {:>4}  bytes {:>6}{}",
            index,
            batch.tag_count(),
            batch.len(),
            if batch.is_oversized() { "  OVERSIZED" } else { "" }
        );
    }
    println!(
        "{} tags in {} batches",
        batches.total_tag_count(),
        batches.len()
    );

    Ok(())
}
