// src/edinet/client.rs
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::edinet::models::{FileKind, FilingRecord, ListingResponse};
use crate::http::Fetcher;
use crate::storage::{safe_filename, write_bytes};
use crate::utils::error::EdinetError;

pub const EDINET_BASE_URL: &str = "https://api.edinet-fsa.go.jp/api/v2";

// `type=2` asks the listing endpoint for full metadata, not just counts.
const LISTING_TYPE_FULL: &str = "2";
const API_KEY_PARAM: &str = "Subscription-Key";

/// EDINET API v2 client. The API key is handed in once and sent with every call.
pub struct EdinetClient<'a> {
    fetcher: &'a Fetcher,
    api_key: String,
    base_url: String,
}

impl<'a> EdinetClient<'a> {
    pub fn new(fetcher: &'a Fetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            base_url: EDINET_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Lists every filing submitted on `day`.
    pub async fn list_day(&self, day: NaiveDate) -> Result<Vec<FilingRecord>, EdinetError> {
        let url = format!("{}/documents.json", self.base_url);
        let query = [
            ("date", day.format("%Y-%m-%d").to_string()),
            ("type", LISTING_TYPE_FULL.to_string()),
            (API_KEY_PARAM, self.api_key.clone()),
        ];

        tracing::debug!("Listing EDINET filings for {}", day);
        let response = self.fetcher.fetch(&url, &query, None).await?;
        let listing: ListingResponse = response.json()?;

        if let Some(status) = listing.status_code.as_ref() {
            return Err(EdinetError::Api {
                status: status_text(status),
                message: listing.message.unwrap_or_default(),
            });
        }
        if let Some(metadata) = listing.metadata {
            let status = metadata.status.as_ref().map(status_text).unwrap_or_default();
            if !status.is_empty() && status != "200" {
                return Err(EdinetError::Api {
                    status,
                    message: metadata.message.unwrap_or_default(),
                });
            }
        }

        Ok(listing.results.unwrap_or_default())
    }

    /// Fetches each requested kind of `record` into `out_dir`, pausing `pause`
    /// after every file. The first failing kind aborts the rest; files
    /// already written stay on disk.
    pub async fn download(
        &self,
        record: &FilingRecord,
        out_dir: &Path,
        kinds: &[FileKind],
        pause: Duration,
    ) -> Result<Vec<PathBuf>, EdinetError> {
        let url = format!("{}/documents/{}", self.base_url, record.doc_id);
        let mut saved = Vec::with_capacity(kinds.len());

        for kind in kinds {
            let query = [
                ("type", kind.selector().to_string()),
                (API_KEY_PARAM, self.api_key.clone()),
            ];
            let response = self.fetcher.fetch(&url, &query, None).await?;

            // Missing documents are reported as a JSON body with status 200.
            if response.is_json() {
                tracing::debug!("EDINET JSON reply for {} ({}): {}", record.doc_id, kind, response.text());
                return Err(EdinetError::UnexpectedPayload {
                    doc_id: record.doc_id.clone(),
                    kind: kind.to_string(),
                });
            }

            let path = out_dir.join(document_filename(record, *kind));
            write_bytes(&path, &response.body)?;
            saved.push(path);

            tokio::time::sleep(pause).await;
        }

        Ok(saved)
    }
}

/// `<secCode>-<issuer>-<docID>-<kind><ext>`
pub fn document_filename(record: &FilingRecord, kind: FileKind) -> String {
    format!(
        "{}-{}-{}-{}{}",
        record.sec_code(),
        safe_filename(record.issuer()),
        record.doc_id,
        kind.as_str(),
        kind.extension()
    )
}

fn status_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use mockito::Matcher;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    fn fetcher() -> Fetcher {
        Fetcher::new(RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn annual_record() -> FilingRecord {
        serde_json::from_value(serde_json::json!({
            "docID": "S100TEST",
            "secCode": "7203",
            "filerName": "トヨタ自動車株式会社",
            "ordinanceCode": "010",
            "formCode": "030000",
            "docDescription": "有価証券報告書"
        }))
        .unwrap()
    }

    #[test]
    fn filename_layout() {
        let record = annual_record();

        assert_eq!(
            document_filename(&record, FileKind::Pdf),
            "7203-トヨタ自動車株式会社-S100TEST-pdf.pdf"
        );
        assert_eq!(
            document_filename(&record, FileKind::Xbrl),
            "7203-トヨタ自動車株式会社-S100TEST-xbrl.zip"
        );
    }

    #[tokio::test]
    async fn list_day_sends_date_type_and_key() {
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", "/documents.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("date".into(), "2025-08-01".into()),
                Matcher::UrlEncoded("type".into(), "2".into()),
                Matcher::UrlEncoded("Subscription-Key".into(), "secret".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"metadata":{"status":"200","message":"OK"},
                    "results":[{"docID":"S100TEST","secCode":"7203","filerName":"x",
                                "ordinanceCode":"010","formCode":"030000"}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let fetcher = fetcher();
        let client = EdinetClient::new(&fetcher, "secret").with_base_url(server.url());
        let records = assert_ok!(client.list_day(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()).await);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].doc_id, "S100TEST");
        listing.assert_async().await;
    }

    #[tokio::test]
    async fn null_results_is_an_empty_day() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/documents.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"metadata":{"status":"200"},"results":null}"#)
            .create_async()
            .await;

        let fetcher = fetcher();
        let client = EdinetClient::new(&fetcher, "k").with_base_url(server.url());
        let records = assert_ok!(client.list_day(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()).await);

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn api_error_envelope_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/documents.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"StatusCode":401,"message":"Access denied due to invalid subscription key."}"#)
            .create_async()
            .await;

        let fetcher = fetcher();
        let client = EdinetClient::new(&fetcher, "bad").with_base_url(server.url());
        let err = assert_err!(client.list_day(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()).await);

        assert!(matches!(err, EdinetError::Api { ref status, .. } if status == "401"));
    }

    #[tokio::test]
    async fn download_writes_each_kind() {
        let mut server = mockito::Server::new_async().await;
        let pdf = server
            .mock("GET", "/documents/S100TEST")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "2".into()),
                Matcher::UrlEncoded("Subscription-Key".into(), "k".into()),
            ]))
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.7")
            .expect(1)
            .create_async()
            .await;
        let xbrl = server
            .mock("GET", "/documents/S100TEST")
            .match_query(Matcher::UrlEncoded("type".into(), "1".into()))
            .with_header("content-type", "application/octet-stream")
            .with_body("PK\x03\x04")
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let fetcher = fetcher();
        let client = EdinetClient::new(&fetcher, "k").with_base_url(server.url());
        let paths = assert_ok!(
            client
                .download(&annual_record(), dir.path(), &[FileKind::Pdf, FileKind::Xbrl], Duration::ZERO)
                .await
        );

        assert_eq!(paths.len(), 2);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"%PDF-1.7");
        assert!(paths[1].ends_with("7203-トヨタ自動車株式会社-S100TEST-xbrl.zip"));
        pdf.assert_async().await;
        xbrl.assert_async().await;
    }

    #[tokio::test]
    async fn failing_kind_aborts_remaining_kinds() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/documents/S100TEST")
            .match_query(Matcher::UrlEncoded("type".into(), "2".into()))
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.7")
            .create_async()
            .await;
        server
            .mock("GET", "/documents/S100TEST")
            .match_query(Matcher::UrlEncoded("type".into(), "5".into()))
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"metadata":{"status":"404","message":"Not Found"}}"#)
            .create_async()
            .await;
        let never = server
            .mock("GET", "/documents/S100TEST")
            .match_query(Matcher::UrlEncoded("type".into(), "1".into()))
            .expect(0)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let fetcher = fetcher();
        let client = EdinetClient::new(&fetcher, "k").with_base_url(server.url());
        let kinds = [FileKind::Pdf, FileKind::Csv, FileKind::Xbrl];
        let err = assert_err!(client.download(&annual_record(), dir.path(), &kinds, Duration::ZERO).await);

        assert!(matches!(err, EdinetError::UnexpectedPayload { ref kind, .. } if kind == "csv"));
        // The PDF written before the failure is kept.
        assert!(dir.path().join("7203-トヨタ自動車株式会社-S100TEST-pdf.pdf").exists());
        never.assert_async().await;
    }
}
