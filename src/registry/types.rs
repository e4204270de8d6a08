//! Wire types for the Danish Business Authority publication search.

use crate::schema::{FileType, FilingRecord};
use crate::utils::parse_xbrl_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

/// Elasticsearch query for the latest annual-report publications of one company.
pub fn filings_query(cvr: u32, size: usize) -> serde_json::Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "term": { "cvrNummer": cvr } },
                    { "term": { "offentliggoerelsestype": "regnskab" } }
                ]
            }
        },
        "_source": [
            "dokumenter",
            "regnskab.regnskabsperiode",
            "offentliggoerelsesTidspunkt"
        ],
        "sort": [{ "offentliggoerelsesTidspunkt": { "order": "desc" } }],
        "size": size
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: HitList,
}

#[derive(Debug, Default, Deserialize)]
pub struct HitList {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source", default)]
    pub source: Publication,
}

#[derive(Debug, Default, Deserialize)]
pub struct Publication {
    #[serde(default)]
    pub dokumenter: Vec<PublishedDocument>,
    #[serde(default)]
    pub regnskab: Option<AccountsSection>,
    #[serde(rename = "offentliggoerelsesTidspunkt", default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountsSection {
    #[serde(default)]
    pub regnskabsperiode: Option<AccountingPeriod>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountingPeriod {
    #[serde(rename = "startDato", default)]
    pub start: Option<String>,
    #[serde(rename = "slutDato", default)]
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishedDocument {
    #[serde(rename = "dokumentMimeType", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "dokumentUrl", default)]
    pub url: Option<String>,
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl SearchResponse {
    /// One record per published document; documents without a URL are dropped.
    pub fn into_filings(self) -> Vec<FilingRecord> {
        let mut filings = Vec::new();

        for hit in self.hits.hits {
            let publication = hit.source;
            let period = publication
                .regnskab
                .and_then(|r| r.regnskabsperiode)
                .unwrap_or_default();
            let period_start = period.start.as_deref().and_then(parse_xbrl_date);
            let period_end = period.end.as_deref().and_then(parse_xbrl_date);
            let published_at = publication.published_at.as_deref().and_then(parse_timestamp);

            for document in publication.dokumenter {
                let Some(url) = document.url.filter(|u| !u.trim().is_empty()) else {
                    continue;
                };
                filings.push(FilingRecord {
                    period_start,
                    period_end,
                    published_at,
                    file_type: FileType::from_mime(document.mime_type.as_deref().unwrap_or("")),
                    url,
                });
            }
        }

        filings
    }
}
