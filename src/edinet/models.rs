// src/edinet/models.rs
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use crate::utils::error::ConfigError;

/// Envelope of the EDINET v2 `documents.json` listing.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub metadata: Option<ListingMetadata>,
    #[serde(default)]
    pub results: Option<Vec<FilingRecord>>,
    // Authentication failures come back as a flat `{StatusCode, message}` body.
    #[serde(rename = "StatusCode", default)]
    pub status_code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingMetadata {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One filing as listed by EDINET for a given day.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingRecord {
    #[serde(rename = "docID")]
    pub doc_id: String,
    pub sec_code: Option<String>,
    pub filer_name: Option<String>,
    pub ordinance_code: Option<String>,
    pub form_code: Option<String>,
    pub doc_description: Option<String>,
}

impl FilingRecord {
    pub fn sec_code(&self) -> &str {
        self.sec_code.as_deref().unwrap_or_default()
    }

    pub fn issuer(&self) -> &str {
        self.filer_name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.doc_description.as_deref().unwrap_or_default()
    }

    /// Security code in its 4-digit listed form. EDINET appends a check
    /// digit `0` (`72030`); shorter codes are returned unchanged.
    pub fn listing_code(&self) -> &str {
        let code = self.sec_code();
        if code.len() == 5 && code.ends_with('0') && code.bytes().all(|b| b.is_ascii_digit()) {
            &code[..4]
        } else {
            code
        }
    }
}

/// Statutory document categories, keyed by (ordinance code, form code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    /// 有価証券報告書
    Annual,
    /// 四半期報告書
    Quarterly,
}

impl DocCategory {
    pub fn matches(&self, ordinance_code: &str, form_code: &str) -> bool {
        match self {
            DocCategory::Annual => ordinance_code == "010" && form_code == "030000",
            DocCategory::Quarterly => {
                ordinance_code == "010" && matches!(form_code, "043000" | "043001")
            }
        }
    }

    pub fn matches_record(&self, record: &FilingRecord) -> bool {
        self.matches(
            record.ordinance_code.as_deref().unwrap_or_default(),
            record.form_code.as_deref().unwrap_or_default(),
        )
    }

    pub fn enabled(include_annual: bool, include_quarterly: bool) -> Vec<DocCategory> {
        let mut categories = Vec::new();
        if include_annual {
            categories.push(DocCategory::Annual);
        }
        if include_quarterly {
            categories.push(DocCategory::Quarterly);
        }
        categories
    }
}

/// Payload variants served by the document endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Xbrl,
    Pdf,
    Csv,
}

impl FileKind {
    /// Value of the `type` query parameter.
    pub fn selector(&self) -> u8 {
        match self {
            FileKind::Xbrl => 1,
            FileKind::Pdf => 2,
            FileKind::Csv => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Xbrl => "xbrl",
            FileKind::Pdf => "pdf",
            FileKind::Csv => "csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Xbrl | FileKind::Csv => ".zip",
            FileKind::Pdf => ".pdf",
        }
    }

    /// Parses a comma separated list such as `pdf,xbrl`. Empty tokens are skipped.
    pub fn parse_list(arg: &str) -> Result<Vec<FileKind>, ConfigError> {
        arg.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(FileKind::from_str)
            .collect()
    }
}

impl FromStr for FileKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xbrl" => Ok(FileKind::Xbrl),
            "pdf" => Ok(FileKind::Pdf),
            "csv" => Ok(FileKind::Csv),
            other => Err(ConfigError::UnknownFileKind(other.to_string())),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
