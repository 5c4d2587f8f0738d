// src/tdnet/client.rs
use chrono::NaiveDate;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use crate::filters::IdentifierFilter;
use crate::http::Fetcher;
use crate::storage::{safe_filename, write_bytes, StorageManager};
use crate::tdnet::feed::{self, EARNINGS_SUMMARY_MARKER, TDNET_BASE_URL};
use crate::tdnet::models::FeedEntry;
use crate::utils::error::TdnetError;

const FEED_ACCEPT: &str = "application/atom+xml, application/rss+xml;q=0.9, application/xml;q=0.8, */*;q=0.5";
const UNTITLED: &str = "untitled";

/// What one pass over the feeds produced.
#[derive(Debug, Default)]
pub struct FeedOutcome {
    pub saved: Vec<PathBuf>,
    /// Feed URLs or entry downloads that were warned and skipped.
    pub failures: usize,
}

pub struct TdnetClient<'a> {
    fetcher: &'a Fetcher,
    base_url: String,
}

impl<'a> TdnetClient<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self {
            fetcher,
            base_url: TDNET_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches and parses one feed URL.
    pub async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, TdnetError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let response = self.fetcher.fetch(url, &[], Some(&headers)).await?;
        let entries = feed::parse_feed(&response.text())?;
        Ok(entries)
    }

    /// Downloads every earnings summary (決算短信) in the feeds for
    /// `start..=end` that passes `filter`, into `TDNET/<published date>/`.
    ///
    /// Links are deduplicated within this call only. A feed or an entry that
    /// fails to download is skipped; storage errors end the pass.
    pub async fn download_earnings_summaries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: u32,
        storage: &StorageManager,
        filter: &IdentifierFilter,
        pause: Duration,
    ) -> Result<FeedOutcome, TdnetError> {
        let mut outcome = FeedOutcome::default();
        let mut seen_links: HashSet<String> = HashSet::new();

        for url in feed::feed_urls(&self.base_url, start, end, limit) {
            let entries = match self.fetch_entries(&url).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("TDnet feed {} failed: {}", url, e);
                    outcome.failures += 1;
                    continue;
                }
            };
            tracing::info!("TDnet feed {}: {} entries", url, entries.len());

            for entry in entries {
                if !entry.title.contains(EARNINGS_SUMMARY_MARKER) {
                    continue;
                }
                let link = match entry.link.as_deref() {
                    Some(link) if !link.is_empty() && !seen_links.contains(link) => link.to_string(),
                    _ => continue,
                };
                if !feed::entry_matches(&entry, filter) {
                    continue;
                }
                seen_links.insert(link.clone());

                let response = match self.fetcher.fetch(&link, &[], None).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::warn!("TDnet download failed for {}: {}", link, e);
                        outcome.failures += 1;
                        continue;
                    }
                };

                let day = entry.published_date().unwrap_or(start);
                let dir = storage.tdnet_day_dir(day)?;
                let path = dir.join(format!("{}.pdf", entry_filename(&entry)));
                write_bytes(&path, &response.body)?;
                outcome.saved.push(path);

                tokio::time::sleep(pause).await;
            }
        }

        Ok(outcome)
    }
}

fn entry_filename(entry: &FeedEntry) -> String {
    let name = safe_filename(&entry.title);
    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name
    }
}
