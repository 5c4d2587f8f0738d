// src/tdnet/mod.rs
pub mod client;
pub mod feed;
pub mod models;

pub use client::TdnetClient;

use crate::storage::{RunLogRow, StorageManager};
use crate::utils::config::Options;
use crate::utils::error::TdnetError;
use crate::utils::RunSummary;

pub const SOURCE_TAG: &str = "TDNET";

/// One pass over the earnings feeds, logged as a single `index.csv` row.
pub async fn run(
    client: &TdnetClient<'_>,
    storage: &StorageManager,
    options: &Options,
) -> Result<RunSummary, TdnetError> {
    let outcome = client
        .download_earnings_summaries(
            options.start,
            options.end,
            options.tdnet_limit,
            storage,
            &options.filter,
            options.sleep,
        )
        .await?;

    tracing::info!("TDnet: saved {} earnings summaries", outcome.saved.len());

    if !outcome.saved.is_empty() {
        let row = RunLogRow {
            source: SOURCE_TAG.to_string(),
            date: format!("{}~{}", options.start.format("%Y-%m-%d"), options.end.format("%Y-%m-%d")),
            sec_code: String::new(),
            issuer: String::new(),
            doc_id: String::new(),
            desc: feed::EARNINGS_SUMMARY_MARKER.to_string(),
            files: RunLogRow::join_files(&outcome.saved),
        };
        storage.run_log().append(&[row])?;
    }

    Ok(RunSummary {
        saved: outcome.saved.len(),
        failures: outcome.failures,
    })
}
