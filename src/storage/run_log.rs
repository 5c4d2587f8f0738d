// src/storage/run_log.rs
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use crate::utils::error::StorageError;

/// One line of `index.csv`. Field names double as the header row.
#[derive(Debug, Clone, Serialize)]
pub struct RunLogRow {
    pub source: String,
    pub date: String,
    #[serde(rename = "secCode")]
    pub sec_code: String,
    pub issuer: String,
    #[serde(rename = "docID")]
    pub doc_id: String,
    pub desc: String,
    pub files: String,
}

impl RunLogRow {
    /// Pipe-joins saved paths for the `files` column.
    pub fn join_files(paths: &[PathBuf]) -> String {
        paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Append-only CSV log of everything fetched, across runs.
///
/// Not locked: one process at a time.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `rows`, writing the header first if the file does not exist yet.
    /// Rows are never deduplicated against earlier runs.
    pub fn append(&self, rows: &[RunLogRow]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let new_file = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(new_file)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!("Appended {} row(s) to {}", rows.len(), self.path.display());
        Ok(())
    }
}
