// src/edinet/select.rs
use crate::edinet::models::{DocCategory, FilingRecord};
use crate::filters::IdentifierFilter;

/// Keeps records whose category is enabled AND, when an identifier filter
/// is given, whose code or issuer name matches it.
pub fn select(
    records: &[FilingRecord],
    categories: &[DocCategory],
    filter: &IdentifierFilter,
) -> Vec<FilingRecord> {
    records
        .iter()
        .filter(|record| categories.iter().any(|c| c.matches_record(record)))
        .filter(|record| {
            filter.is_empty()
                || filter.matches_code(record.listing_code())
                || filter.matches_text(record.issuer())
        })
        .cloned()
        .collect()
}
