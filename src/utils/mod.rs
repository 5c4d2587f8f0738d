// src/utils/mod.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;

pub use error::AppError; // Re-export main error type for convenience

/// Per-source tally reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written.
    pub saved: usize,
    /// Units (days, documents, entries, feeds) that were warned and skipped.
    pub failures: usize,
}
