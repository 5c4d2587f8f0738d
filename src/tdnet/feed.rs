// src/tdnet/feed.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};
use crate::filters::IdentifierFilter;
use crate::tdnet::models::FeedEntry;

/// Unofficial TDnet WEB-API (yanoshin) list endpoint.
pub const TDNET_BASE_URL: &str = "https://webapi.yanoshin.jp/webapi/tdnet/list";

/// Titles of earnings summary announcements carry this marker.
pub const EARNINGS_SUMMARY_MARKER: &str = "決算短信";

// Maximal digit runs; a run of exactly four is a candidate security code.
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile DIGIT_RUN_RE"));

/// Feed URLs covering `start..=end`.
///
/// A single day uses the day feed. A longer range uses the range feed plus the
/// `recent` feed capped at `limit`, since the range feed lags on the newest days.
pub fn feed_urls(base_url: &str, start: NaiveDate, end: NaiveDate, limit: u32) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    if start == end {
        vec![format!("{}/{}.atom", base, start.format("%Y%m%d"))]
    } else {
        vec![
            format!("{}/{}-{}.atom", base, start.format("%Y%m%d"), end.format("%Y%m%d")),
            format!("{}/recent.atom?limit={}", base, limit),
        ]
    }
}

/// Parses an Atom or RSS 2.0 document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, roxmltree::Error> {
    let doc = Document::parse(xml)?;

    let entries = doc
        .descendants()
        .filter(|n| n.is_element() && matches!(n.tag_name().name(), "entry" | "item"))
        .map(|node| FeedEntry {
            title: child_text(node, &["title"]).unwrap_or_default(),
            summary: child_text(node, &["summary", "content", "description"]).unwrap_or_default(),
            link: entry_link(node),
            // `updated` is a revision time, not a publish time.
            published: child_text(node, &["published", "pubDate", "date"]),
        })
        .collect();

    Ok(entries)
}

/// First standalone run of exactly four digits in `text`.
///
/// Heuristic: a fiscal year or other 4-digit number ahead of the real code
/// is picked up instead.
pub fn extract_code(text: &str) -> Option<&str> {
    DIGIT_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.chars().count() == 4)
}

/// Code taken from title+summary is in the code set, or title+summary hits a
/// name pattern. With no identifiers at all every entry matches.
pub fn entry_matches(entry: &FeedEntry, filter: &IdentifierFilter) -> bool {
    if filter.is_empty() {
        return true;
    }
    let text = entry.search_text();
    if extract_code(&text).is_some_and(|code| filter.matches_code(code)) {
        return true;
    }
    filter.matches_text(&text)
}

fn child_text(node: Node<'_, '_>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        node.children()
            .find(|c| c.is_element() && c.tag_name().name() == *name)
            .map(|c| {
                c.descendants()
                    .filter(|d| d.is_text())
                    .filter_map(|d| d.text())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
    })
}

// Atom: <link rel="alternate" href=".."/>, else the first href.
// RSS: <link>..</link>.
fn entry_link(node: Node<'_, '_>) -> Option<String> {
    let mut fallback = None;

    for link in node
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "link")
    {
        match link.attribute("href") {
            Some(href) if matches!(link.attribute("rel"), None | Some("alternate")) => {
                return Some(href.trim().to_string());
            }
            Some(href) => {
                fallback.get_or_insert_with(|| href.trim().to_string());
            }
            None => {
                let text = link.text().unwrap_or_default().trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }

    fallback.filter(|l| !l.is_empty())
}
