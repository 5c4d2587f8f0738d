// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Transport errors, timeouts included

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String }, // Permanent, never retried

    #[error("Request to {url} failed after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

#[derive(Error, Debug)]
pub enum EdinetError {
    #[error("EDINET request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse EDINET response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("EDINET API returned status {status}: {message}")]
    Api { status: String, message: String },

    #[error("EDINET returned no {kind} payload for document {doc_id}")]
    UnexpectedPayload { doc_id: String, kind: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum TdnetError {
    #[error("TDnet request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse TDnet feed: {0}")]
    Feed(#[from] roxmltree::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("--end ({end}) must not be before --start ({start})")]
    InvalidDateRange { start: String, end: String },

    #[error("Unknown file kind '{0}' (choose from pdf, csv, xbrl)")]
    UnknownFileKind(String),

    #[error("Invalid value '{value}' for {flag} (expected yes or no)")]
    InvalidFlag { flag: &'static str, value: String },

    #[error("Invalid --sleep-sec '{0}' (expected a non-negative number of seconds)")]
    InvalidSleep(String),

    #[error("EDINET_API_KEY is not set; add it to the environment or a .env file")]
    MissingApiKey,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
