use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single tagged data point as produced by a fact model loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    #[schemars(
        description = "Local concept name without namespace prefix (e.g. 'Equity', 'ReportingPeriodEndDate')"
    )]
    pub concept: String,

    #[schemars(description = "Raw string value exactly as tagged in the filing")]
    pub value: String,

    #[serde(default)]
    #[schemars(description = "Id of the context binding this fact to a reporting period, if any")]
    pub context_ref: Option<String>,

    #[serde(default)]
    #[schemars(description = "Id of the unit for numeric facts, if any")]
    pub unit_ref: Option<String>,
}

impl Fact {
    pub fn new(concept: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            value: value.into(),
            context_ref: None,
            unit_ref: None,
        }
    }

    #[must_use]
    pub fn in_context(mut self, context_ref: impl Into<String>) -> Self {
        self.context_ref = Some(context_ref.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit_ref: impl Into<String>) -> Self {
        self.unit_ref = Some(unit_ref.into());
        self
    }

    /// Empty or whitespace-only values count as absent.
    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// Binds facts to a duration (start/end) or a point in time (instant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Context {
    pub id: String,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(description = "End of a duration period")]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(description = "Point in time for balance-sheet style facts")]
    pub instant: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(
        description = "True when the context carries a segment or scenario (an explicit dimension member)"
    )]
    pub dimensional: bool,
}

impl Context {
    pub fn duration(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date: Some(start),
            end_date: Some(end),
            instant: None,
            dimensional: false,
        }
    }

    pub fn instant(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date: None,
            end_date: None,
            instant: Some(date),
            dimensional: false,
        }
    }

    #[must_use]
    pub fn with_dimension(mut self) -> Self {
        self.dimensional = true;
        self
    }

    /// The single "as of" date used for ranking: duration end or instant.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.end_date.or(self.instant)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Unit {
    pub id: String,

    #[schemars(
        description = "Numerator measure symbols, namespace prefix stripped (e.g. 'DKK', 'pure', 'shares')"
    )]
    pub measures: Vec<String>,
}

/// Parsed filing: facts plus the contexts and units they refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FactModel {
    #[serde(default)]
    pub facts: Vec<Fact>,

    #[serde(default)]
    pub contexts: BTreeMap<String, Context>,

    #[serde(default)]
    pub units: BTreeMap<String, Unit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Raw XML/XHTML source, kept so tagged elements can be rescanned when no facts were resolved"
    )]
    pub document: Option<String>,
}

impl FactModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fact(&mut self, fact: Fact) -> &mut Self {
        self.facts.push(fact);
        self
    }

    pub fn insert_context(&mut self, context: Context) -> &mut Self {
        self.contexts.insert(context.id.clone(), context);
        self
    }

    pub fn insert_unit(&mut self, id: impl Into<String>, measures: &[&str]) -> &mut Self {
        let id = id.into();
        self.units.insert(
            id.clone(),
            Unit {
                id,
                measures: measures.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Pdf,
    Xbrl,
    #[serde(rename = "iXBRL")]
    Ixbrl,
}

impl FileType {
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Self::Pdf,
            "application/xhtml+xml" | "text/html" => Self::Ixbrl,
            _ => Self::Xbrl,
        }
    }

    pub fn is_structured(self) -> bool {
        matches!(self, Self::Xbrl | Self::Ixbrl)
    }
}

/// One published document of an annual report, as listed by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingRecord {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub file_type: FileType,
    pub url: String,
}

impl FilingRecord {
    /// The machine-readable filing with the latest period end.
    pub fn newest_structured(filings: &[FilingRecord]) -> Option<&FilingRecord> {
        filings
            .iter()
            .filter(|f| f.file_type.is_structured())
            .max_by_key(|f| (f.period_end, f.published_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_context_as_of() {
        let duration = Context::duration("d", date(2024, 1, 1), date(2024, 12, 31));
        let instant = Context::instant("i", date(2024, 12, 31));
        assert_eq!(duration.as_of(), instant.as_of());
    }

    #[test]
    fn test_file_type_from_mime() {
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Pdf);
        assert_eq!(FileType::from_mime("application/xml"), FileType::Xbrl);
        assert_eq!(
            FileType::from_mime("application/xhtml+xml; charset=utf-8"),
            FileType::Ixbrl
        );
    }

    #[test]
    fn test_newest_structured_skips_pdf() {
        let filings = vec![
            FilingRecord {
                period_start: Some(date(2024, 1, 1)),
                period_end: Some(date(2024, 12, 31)),
                published_at: None,
                file_type: FileType::Pdf,
                url: "https://example.test/2024.pdf".to_string(),
            },
            FilingRecord {
                period_start: Some(date(2023, 1, 1)),
                period_end: Some(date(2023, 12, 31)),
                published_at: None,
                file_type: FileType::Xbrl,
                url: "https://example.test/2023.xml".to_string(),
            },
            FilingRecord {
                period_start: Some(date(2022, 1, 1)),
                period_end: Some(date(2022, 12, 31)),
                published_at: None,
                file_type: FileType::Xbrl,
                url: "https://example.test/2022.xml".to_string(),
            },
        ];

        let newest = FilingRecord::newest_structured(&filings).unwrap();
        assert_eq!(newest.url, "https://example.test/2023.xml");
    }

    #[test]
    fn test_fact_model_serialization() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::instant("c1", date(2024, 12, 31)))
            .insert_unit("DKK", &["DKK"])
            .push_fact(Fact::new("Equity", "1.000").in_context("c1").with_unit("DKK"));

        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("document"));

        let back: FactModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
