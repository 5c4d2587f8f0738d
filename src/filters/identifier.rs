// src/filters/identifier.rs
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

// Exactly four ASCII digits: a listed security code.
static SECURITY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("Failed to compile SECURITY_CODE_RE"));

/// Company filter built from `--codes`: exact security codes plus
/// case-insensitive substring patterns for company names.
///
/// Either half is `None` when no token of that kind was given, so "no
/// filter" stays distinguishable from a filter that happens to be empty.
#[derive(Debug, Clone, Default)]
pub struct IdentifierFilter {
    codes: Option<HashSet<String>>,
    patterns: Option<Vec<Regex>>,
}

impl IdentifierFilter {
    /// Splits a comma separated token list. `7203` becomes a code,
    /// `トヨタ` or `Sony` becomes a literal (escaped) name pattern.
    pub fn parse(arg: &str) -> Self {
        let mut codes = HashSet::new();
        let mut patterns = Vec::new();

        for token in arg.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if SECURITY_CODE_RE.is_match(token) {
                codes.insert(token.to_string());
            } else if let Ok(re) = RegexBuilder::new(&regex::escape(token))
                .case_insensitive(true)
                .build()
            {
                patterns.push(re);
            }
        }

        Self {
            codes: (!codes.is_empty()).then_some(codes),
            patterns: (!patterns.is_empty()).then_some(patterns),
        }
    }

    pub fn codes(&self) -> Option<&HashSet<String>> {
        self.codes.as_ref()
    }

    pub fn patterns(&self) -> Option<&[Regex]> {
        self.patterns.as_deref()
    }

    /// No codes and no patterns: everything passes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_none() && self.patterns.is_none()
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.codes.as_ref().is_some_and(|codes| codes.contains(code))
    }

    pub fn matches_text(&self, text: &str) -> bool {
        matches(text, self.patterns())
    }
}

/// True if any pattern is found in `text`; always false without patterns.
pub fn matches(text: &str, patterns: Option<&[Regex]>) -> bool {
    patterns.is_some_and(|pats| pats.iter().any(|re| re.is_match(text)))
}
