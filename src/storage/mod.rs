// src/storage/mod.rs
pub mod run_log;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use crate::utils::error::StorageError;

pub use run_log::{RunLog, RunLogRow};

pub const EDINET_DIR: &str = "EDINET";
pub const TDNET_DIR: &str = "TDNET";
pub const INDEX_FILE: &str = "index.csv";

const MAX_FILENAME_CHARS: usize = 180;

// Anything that is not a word character, hyphen, dot or CJK block character.
static UNSAFE_FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\-.\x{3000}-\x{9FFF}]+").expect("Failed to compile UNSAFE_FILENAME_RE")
});

/// Replaces runs of unsafe characters with `_`, trims leading and trailing
/// dots, underscores and spaces, and caps the result at 180 characters.
pub fn safe_filename(name: &str) -> String {
    let replaced = UNSAFE_FILENAME_RE.replace_all(name, "_");
    replaced
        .trim_matches(|c: char| c == '.' || c == '_' || c == ' ')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Owns the output root: `EDINET/<date>/`, `TDNET/<date>/` and `index.csv`.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager, creating the root directory if needed
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<root>/EDINET/YYYY-MM-DD`, created on demand.
    pub fn edinet_day_dir(&self, day: NaiveDate) -> Result<PathBuf, StorageError> {
        self.day_dir(EDINET_DIR, day)
    }

    /// `<root>/TDNET/YYYY-MM-DD`, created on demand.
    pub fn tdnet_day_dir(&self, day: NaiveDate) -> Result<PathBuf, StorageError> {
        self.day_dir(TDNET_DIR, day)
    }

    pub fn run_log(&self) -> RunLog {
        RunLog::new(self.base_dir.join(INDEX_FILE))
    }

    fn day_dir(&self, source: &str, day: NaiveDate) -> Result<PathBuf, StorageError> {
        let target_dir = self
            .base_dir
            .join(source)
            .join(day.format("%Y-%m-%d").to_string());

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)?;
        }
        Ok(target_dir)
    }
}

/// Writes raw response bytes, replacing any file already at `path`.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    fs::write(path, bytes)?;
    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitizes_separators_and_control_characters() {
        let name = safe_filename("ACME/Holdings: Inc.\n\t<2025>");

        assert_eq!(name, "ACME_Holdings_Inc._2025");
        assert!(name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.'));
    }

    #[test]
    fn keeps_japanese_text() {
        assert_eq!(
            safe_filename("トヨタ自動車株式会社　2025年3月期 決算短信〔日本基準〕(連結)"),
            "トヨタ自動車株式会社　2025年3月期_決算短信〔日本基準〕_連結"
        );
    }

    #[test]
    fn truncates_to_180_characters() {
        let long = "株".repeat(300);
        let name = safe_filename(&long);

        assert_eq!(name.chars().count(), 180);
    }

    #[test]
    fn trims_leading_and_trailing_junk() {
        assert_eq!(safe_filename("  ..report.. "), "report");
        assert_eq!(safe_filename("///"), "");
    }

    #[test]
    fn day_dirs_are_created_under_source() {
        let root = tempdir().unwrap();
        let storage = StorageManager::new(root.path().join("out")).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let edinet = storage.edinet_day_dir(day).unwrap();
        let tdnet = storage.tdnet_day_dir(day).unwrap();

        assert!(edinet.ends_with("EDINET/2025-08-01"));
        assert!(tdnet.ends_with("TDNET/2025-08-01"));
        assert!(edinet.is_dir() && tdnet.is_dir());
        assert_eq!(storage.run_log().path(), root.path().join("out").join("index.csv").as_path());
    }

    #[test]
    fn later_write_overwrites_same_name() {
        let root = tempdir().unwrap();
        let path = root.path().join("doc.pdf");

        write_bytes(&path, b"first").unwrap();
        write_bytes(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
    }
}
