// src/main.rs
mod edinet;
mod filters;
mod http;
mod storage;
mod tdnet;
mod utils;

use clap::Parser;
use std::path::PathBuf;
use edinet::EdinetClient;
use http::{Fetcher, RetryPolicy};
use storage::StorageManager;
use tdnet::TdnetClient;
use utils::config::Options;
use utils::progress::Progress;
use utils::AppError;

/// Downloads EDINET statutory reports and TDnet earnings summaries (決算短信)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// Last date of the range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: String,

    /// Output root directory (falls back to OUTPUT_DIR, then ./downloads)
    #[arg(long)]
    out: Option<PathBuf>,

    /// EDINET file kinds, comma separated: pdf, csv, xbrl
    #[arg(long, default_value = "pdf")]
    edinet_filetypes: String,

    /// Include annual securities reports (yes/no)
    #[arg(long, default_value = "yes")]
    include_yuho: String,

    /// Include quarterly reports (yes/no)
    #[arg(long, default_value = "no")]
    include_quarter: String,

    /// Also fetch TDnet earnings summaries (yes/no)
    #[arg(long, default_value = "yes")]
    tdnet: String,

    /// Item cap for the TDnet recent feed
    #[arg(long, default_value_t = 1000)]
    tdnet_limit: u32,

    /// Company names or 4-digit security codes, comma separated (e.g. 7203,トヨタ自動車).
    /// EDINET's 5-digit codes match by their first four digits (72030 is 7203),
    /// so pass 7203; a token like 72030 is treated as a name pattern instead.
    #[arg(long, default_value = "")]
    codes: String,

    /// Attempts per HTTP request
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_retries: u32,

    /// Seconds to wait after each saved file
    #[arg(long, default_value_t = 0.6)]
    sleep_sec: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // 1. Load .env (EDINET_API_KEY, OUTPUT_DIR, RUST_LOG) if present
    dotenvy::dotenv().ok();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 3. Parse and validate CLI arguments; any error here aborts before network access
    let args = Args::parse();
    tracing::info!("Starting run for args: {:?}", args);
    let options = Options::from_args(&args, |name| std::env::var(name).ok())?;
    tracing::info!(
        "Range {}..={}, {} code(s), {} name pattern(s)",
        options.start,
        options.end,
        options.filter.codes().map_or(0, |c| c.len()),
        options.filter.patterns().map_or(0, |p| p.len())
    );

    // 4. Initialize storage and the shared HTTP client
    let storage = StorageManager::new(&options.out)?;
    tracing::info!("Output root: {}", storage.base_dir().display());
    let fetcher = Fetcher::new(RetryPolicy {
        max_retries: options.max_retries,
        ..RetryPolicy::default()
    })?;

    // 5. EDINET, one day at a time
    if let (false, Some(api_key)) = (options.categories().is_empty(), options.api_key.as_deref()) {
        let client = EdinetClient::new(&fetcher, api_key);
        let progress = Progress::new();
        match edinet::run(&client, &storage, &options, &progress).await {
            Ok(summary) => tracing::info!(
                "EDINET finished. Saved: {}, Failures: {}",
                summary.saved,
                summary.failures
            ),
            Err(e) => tracing::warn!("EDINET run stopped early: {}", e),
        }
    }

    // 6. TDnet, one pass over the feeds
    if options.tdnet {
        let client = TdnetClient::new(&fetcher);
        match tdnet::run(&client, &storage, &options).await {
            Ok(summary) => tracing::info!(
                "TDnet finished. Saved: {}, Failures: {}",
                summary.saved,
                summary.failures
            ),
            Err(e) => tracing::warn!("TDnet run failed: {}", e),
        }
    }

    tracing::info!("Processing finished. Index: {}", storage.run_log().path().display());
    Ok(())
}
