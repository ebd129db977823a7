//! Transmit - write a tag file out as RO_ACCESS_REPORT messages.
//!
//! This example demonstrates:
//! - Batching tags loaded from CSV
//! - Writing batches to an async sink with `ReportWriter`
//! - Choosing what happens to oversized batches
//!
//! # Running
//!
//! ```text
//! cargo run --example transmit -- tags.csv 1500 > reports.bin
//! ```
//!
//! The binary report stream goes to stdout; logs go to stderr.

use tagreport::batch::{BatcherConfig, ReportBatcher, DEFAULT_PDU_BUDGET};
use tagreport::codec::csv::load_tags;
use tagreport::writer::{OversizePolicy, ReportWriter, ReportWriterConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: transmit <tags.csv> [pdu_budget]")?;
    let pdu_budget = match args.next() {
        Some(budget) => budget.parse()?,
        None => DEFAULT_PDU_BUDGET,
    };

    let tags = load_tags(&path)?;
    let batches = ReportBatcher::new(BatcherConfig::new(pdu_budget)).batch(&tags)?;

    let config = ReportWriterConfig {
        oversize_policy: OversizePolicy::Skip,
        ..Default::default()
    };
    let mut writer = ReportWriter::new(tokio::io::stdout(), config);
    let summary = writer.write_sequence(&batches).await?;

    tracing::info!(
        "Sent {} reports with {} tags ({} oversized batches dropped)",
        summary.messages,
        summary.tags,
        summary.skipped_batches
    );
    Ok(())
}
