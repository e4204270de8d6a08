use crate::error::{ExtractionError, Result};
use crate::loader::FactModelLoader;
use crate::registry::types::{filings_query, SearchResponse};
use crate::schema::{FactModel, FilingRecord};
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

pub const DISTRIBUTION_URL: &str = "http://distribution.virk.dk/offentliggoerelser/_search";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PAGE_SIZE: usize = 20;

fn fetch_error(url: &str, reason: impl ToString) -> ExtractionError {
    ExtractionError::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Client for the public annual-report distribution service. Owns its HTTP
/// connection pool; create one and share it by cloning.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    search_url: String,
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            search_url: DISTRIBUTION_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Published annual-report documents for a company, newest publication first.
    pub async fn list_filings(&self, cvr: u32) -> Result<Vec<FilingRecord>> {
        let query = filings_query(cvr, PAGE_SIZE);
        debug!("Searching publications for CVR {}", cvr);

        let res = self
            .client
            .post(&self.search_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&query)
            .send()
            .await
            .map_err(|e| fetch_error(&self.search_url, e))?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            return Err(fetch_error(
                &self.search_url,
                format!("status {}: {}", status, error_text),
            ));
        }

        let body: SearchResponse = res
            .json()
            .await
            .map_err(|e| fetch_error(&self.search_url, e))?;
        let filings = body.into_filings();

        info!("Found {} published documents for CVR {}", filings.len(), cvr);
        Ok(filings)
    }

    pub async fn fetch_document(&self, url: &str) -> Result<Vec<u8>> {
        let res = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(fetch_error(url, format!("status {}", status)));
        }

        let bytes = res.bytes().await.map_err(|e| fetch_error(url, e))?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Downloads a filing and hands its text to `loader`.
    pub async fn fetch_model(
        &self,
        filing: &FilingRecord,
        loader: &impl FactModelLoader,
    ) -> Result<FactModel> {
        if !filing.file_type.is_structured() {
            return Err(ExtractionError::Load(format!(
                "{} is not a machine-readable filing",
                filing.url
            )));
        }

        let bytes = self.fetch_document(&filing.url).await?;
        let text = String::from_utf8_lossy(&bytes);
        loader.load_str(&text)
    }
}

/// The XBRL or iXBRL filing with the latest period end.
pub fn newest_xbrl(filings: &[FilingRecord]) -> Option<&FilingRecord> {
    FilingRecord::newest_structured(filings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::loader::XmlFactModelLoader;
    use crate::schema::FileType;

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let client = RegistryClient::new();
        let err = client.fetch_document("not a url").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_pdf_filing_is_not_loaded() {
        let client = RegistryClient::new();
        let filing = FilingRecord {
            period_start: None,
            period_end: None,
            published_at: None,
            file_type: FileType::Pdf,
            url: "http://regnskaber.virk.dk/a/2024.pdf".to_string(),
        };
        let err = client
            .fetch_model(&filing, &XmlFactModelLoader::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }
}
