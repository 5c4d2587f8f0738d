// src/edinet/mod.rs
pub mod client;
pub mod models;
pub mod select;

pub use client::EdinetClient;
pub use models::{DocCategory, FileKind};

use crate::storage::{RunLogRow, StorageManager};
use crate::utils::config::Options;
use crate::utils::error::StorageError;
use crate::utils::progress::Progress;
use crate::utils::RunSummary;
use indicatif::ProgressIterator;

pub const SOURCE_TAG: &str = "EDINET";

/// Walks the date range one day at a time: list, select, download, log.
///
/// A failed listing skips its day and a failed download skips its document;
/// only storage errors on the output root end the walk. Progress is shown as
/// a day bar with a per-day document bar beneath it.
pub async fn run(
    client: &EdinetClient<'_>,
    storage: &StorageManager,
    options: &Options,
    progress: &Progress,
) -> Result<RunSummary, StorageError> {
    let categories = options.categories();
    let run_log = storage.run_log();
    let mut summary = RunSummary::default();
    let day_bar = progress.bar(options.days().count(), "EDINET list");

    for day in options.days().progress_with(day_bar.clone()) {
        day_bar.set_message(day.to_string());
        let records = match client.list_day(day).await {
            Ok(records) => records,
            Err(e) => {
                progress.suspend(|| tracing::warn!("EDINET listing failed for {}: {}", day, e));
                summary.failures += 1;
                continue;
            }
        };

        let picked = select::select(&records, &categories, &options.filter);
        progress.suspend(|| {
            tracing::info!("EDINET {}: {} listed, {} selected", day, records.len(), picked.len())
        });
        if picked.is_empty() {
            continue;
        }

        let day_dir = storage.edinet_day_dir(day)?;
        let mut rows = Vec::with_capacity(picked.len());
        let doc_bar = progress.bar(picked.len(), format!("EDINET dl {}", day));

        for record in picked.iter().progress_with(doc_bar.clone()) {
            doc_bar.set_message(record.doc_id.clone());
            tracing::debug!("Downloading {} {} ({})", record.doc_id, record.issuer(), record.description());

            match client
                .download(record, &day_dir, &options.file_kinds, options.sleep)
                .await
            {
                Ok(paths) => {
                    summary.saved += paths.len();
                    rows.push(RunLogRow {
                        source: SOURCE_TAG.to_string(),
                        date: day.format("%Y-%m-%d").to_string(),
                        sec_code: record.sec_code().to_string(),
                        issuer: record.issuer().to_string(),
                        doc_id: record.doc_id.clone(),
                        desc: record.description().to_string(),
                        files: RunLogRow::join_files(&paths),
                    });
                }
                Err(e) => {
                    progress.suspend(|| {
                        tracing::warn!("EDINET download failed for docID={}: {}", record.doc_id, e)
                    });
                    summary.failures += 1;
                }
            }
        }
        doc_bar.finish_and_clear();

        run_log.append(&rows)?;
    }

    day_bar.finish_and_clear();
    Ok(summary)
}
