// src/utils/config.rs
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use crate::edinet::{DocCategory, FileKind};
use crate::filters::IdentifierFilter;
use crate::utils::error::ConfigError;
use crate::Args;

pub const API_KEY_ENV: &str = "EDINET_API_KEY";
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Validated run settings, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Options {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub out: PathBuf,
    pub file_kinds: Vec<FileKind>,
    pub include_annual: bool,
    pub include_quarterly: bool,
    pub tdnet: bool,
    pub tdnet_limit: u32,
    pub filter: IdentifierFilter,
    pub api_key: Option<String>,
    pub max_retries: u32,
    /// Pause after every saved file.
    pub sleep: Duration,
}

impl Options {
    /// Validates `args` against the environment (`lookup` is usually
    /// `std::env::var(..).ok()`, after `.env` has been loaded).
    pub fn from_args<F>(args: &Args, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let start = parse_date(&args.start)?;
        let end = parse_date(&args.end)?;
        if end < start {
            return Err(ConfigError::InvalidDateRange {
                start: args.start.clone(),
                end: args.end.clone(),
            });
        }

        let file_kinds = FileKind::parse_list(&args.edinet_filetypes)?;
        let include_annual = parse_flag("--include-yuho", &args.include_yuho)?;
        let include_quarterly = parse_flag("--include-quarter", &args.include_quarter)?;
        let tdnet = parse_flag("--tdnet", &args.tdnet)?;

        let sleep = Duration::try_from_secs_f64(args.sleep_sec)
            .map_err(|_| ConfigError::InvalidSleep(args.sleep_sec.to_string()))?;

        let api_key = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty());
        if (include_annual || include_quarterly) && api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let out = args
            .out
            .clone()
            .or_else(|| lookup(OUTPUT_DIR_ENV).filter(|d| !d.trim().is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            start,
            end,
            out,
            file_kinds,
            include_annual,
            include_quarterly,
            tdnet,
            tdnet_limit: args.tdnet_limit,
            filter: IdentifierFilter::parse(&args.codes),
            api_key,
            max_retries: args.max_retries,
            sleep,
        })
    }

    pub fn categories(&self) -> Vec<DocCategory> {
        DocCategory::enabled(self.include_annual, self.include_quarterly)
    }

    /// Every calendar day from `start` through `end`, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

fn parse_flag(flag: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { flag, value: value.to_string() }),
    }
}
