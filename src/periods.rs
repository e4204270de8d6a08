//! Current-year / prior-year period detection.
//!
//! Standard Danish filings declare their periods with explicit DCCA tags
//! (`ReportingPeriodEndDate`, `PredingReportingPeriodEndDate`, ...). IFRS/ESEF
//! filings usually lack them, in which case the two latest distinct context
//! end dates are taken instead.

use crate::facts::FactSource;
use crate::numeric::parse_numeric;
use crate::options::{ExtractionOptions, PeriodFallback};
use crate::schema::Context;
use crate::taxonomy::Concept;
use crate::utils::{is_calendar_year, parse_xbrl_date};
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const NOT_REPORTED: &str = "ikke rapporteret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLabel {
    Year(i32),
    Split { start_year: i32, end_year: i32 },
    NotReported,
}

impl PeriodLabel {
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if is_calendar_year(start, end) => Self::Year(end.year()),
            (Some(start), Some(end)) => Self::Split {
                start_year: start.year(),
                end_year: end.year(),
            },
            _ => Self::NotReported,
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{}", year),
            Self::Split {
                start_year,
                end_year,
            } => write!(f, "{}/{:02}", start_year, end_year.rem_euclid(100)),
            Self::NotReported => f.write_str(NOT_REPORTED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportingPeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[schemars(description = "'2024' for a calendar year, '2024/25' for a split fiscal year, 'ikke rapporteret' when unknown")]
    pub label: String,
}

impl ReportingPeriod {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end,
            label: PeriodLabel::from_dates(start, end).to_string(),
        }
    }

    pub fn not_reported() -> Self {
        Self::new(None, None)
    }

    pub fn label_kind(&self) -> PeriodLabel {
        PeriodLabel::from_dates(self.start, self.end)
    }

    pub fn is_reported(&self) -> bool {
        self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
    ExplicitTags,
    ContextDates,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodPair {
    pub current: ReportingPeriod,
    pub preceding: ReportingPeriod,
    pub source: PeriodSource,
}

impl PeriodPair {
    pub fn unresolved() -> Self {
        Self {
            current: ReportingPeriod::not_reported(),
            preceding: ReportingPeriod::not_reported(),
            source: PeriodSource::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.source != PeriodSource::Unresolved
    }

    /// Picks the CY and PY values out of a concept's date-keyed values. When no
    /// period could be resolved the concept's own two latest dates are used.
    pub fn select(&self, values: &BTreeMap<NaiveDate, f64>) -> (Option<f64>, Option<f64>) {
        if !self.is_resolved() {
            return select_two_latest(values);
        }

        let pick = |period: &ReportingPeriod| period.end.and_then(|d| values.get(&d).copied());
        (pick(&self.current), pick(&self.preceding))
    }
}

/// The two latest entries of a date-keyed map: (CY, PY).
pub fn select_two_latest(values: &BTreeMap<NaiveDate, f64>) -> (Option<f64>, Option<f64>) {
    let mut latest = values.values().rev().copied();
    (latest.next(), latest.next())
}

pub fn resolve_periods(source: &FactSource<'_>, options: &ExtractionOptions) -> PeriodPair {
    if let Some(pair) = from_explicit_tags(source, options) {
        debug!(
            "Periods from explicit tags: CY {} ({:?}), PY {} ({:?})",
            pair.current.label, pair.current.end, pair.preceding.label, pair.preceding.end
        );
        return pair;
    }

    match from_context_dates(source, options) {
        Some(pair) => {
            debug!(
                "Periods from context end dates: CY {:?}, PY {:?}",
                pair.current.end, pair.preceding.end
            );
            pair
        }
        None => {
            warn!("No period tags and no dated contexts; periods unresolved");
            PeriodPair::unresolved()
        }
    }
}

fn first_date(source: &FactSource<'_>, concept: Concept) -> Option<NaiveDate> {
    concept.tags().iter().find_map(|tag| {
        source
            .iter()
            .filter(|f| f.concept == *tag)
            .find_map(|f| parse_xbrl_date(&f.value))
    })
}

fn from_explicit_tags(source: &FactSource<'_>, options: &ExtractionOptions) -> Option<PeriodPair> {
    let cy_end = first_date(source, Concept::ReportingPeriodEnd)?;
    let cy_start = first_date(source, Concept::ReportingPeriodStart);
    let mut py_start = first_date(source, Concept::PrecedingPeriodStart);
    let mut py_end = first_date(source, Concept::PrecedingPeriodEnd);

    // No preceding end tag: the comparative is the latest statement date before CY end.
    if py_end.is_none() {
        let contexts = candidate_contexts(source, options);
        py_end = contexts
            .iter()
            .filter_map(|c| c.as_of())
            .filter(|d| *d < cy_end)
            .max();
        if let Some(end) = py_end {
            debug!("No preceding period end tag; using context date {}", end);
            py_start = py_start.or_else(|| earliest_start(&contexts, end));
        }
    }

    let mut current = ReportingPeriod::new(cy_start, Some(cy_end));
    let mut preceding = ReportingPeriod::new(py_start, py_end);

    if matches!(py_end, Some(py) if py > cy_end) {
        warn!(
            "Preceding period end {:?} is after current period end {}; swapping",
            py_end, cy_end
        );
        std::mem::swap(&mut current, &mut preceding);
    }

    Some(PeriodPair {
        current,
        preceding,
        source: PeriodSource::ExplicitTags,
    })
}

fn candidate_contexts<'a>(
    source: &FactSource<'a>,
    options: &ExtractionOptions,
) -> Vec<&'a Context> {
    let model = source.model();
    let contexts: Vec<&'a Context> = match options.period_fallback {
        PeriodFallback::AllContexts => model.contexts.values().collect(),
        PeriodFallback::StatementContexts => {
            let mut seen = BTreeSet::new();
            source
                .iter()
                .filter(|f| Concept::LINE_ITEMS.iter().any(|c| c.matches(&f.concept)))
                .filter(|f| parse_numeric(&f.value).is_some())
                .filter_map(|f| source.context_of(f))
                .filter(|c| seen.insert(c.id.clone()))
                .collect()
        }
    };

    contexts
        .into_iter()
        .filter(|c| options.include_dimensional_contexts || !c.dimensional)
        .filter(|c| c.as_of().is_some())
        .collect()
}

// Longest duration ending on the date gives the period start.
fn earliest_start(contexts: &[&Context], end: NaiveDate) -> Option<NaiveDate> {
    contexts
        .iter()
        .filter(|c| c.end_date == Some(end))
        .filter_map(|c| c.start_date)
        .min()
}

fn from_context_dates(source: &FactSource<'_>, options: &ExtractionOptions) -> Option<PeriodPair> {
    let contexts = candidate_contexts(source, options);

    let dates: BTreeSet<NaiveDate> = contexts.iter().filter_map(|c| c.as_of()).collect();
    let mut ranked = dates.into_iter().rev();
    let cy_end = ranked.next()?;
    let py_end = ranked.next();

    let start_for = |end: NaiveDate| earliest_start(&contexts, end);

    Some(PeriodPair {
        current: ReportingPeriod::new(start_for(cy_end), Some(cy_end)),
        preceding: match py_end {
            Some(end) => ReportingPeriod::new(start_for(end), Some(end)),
            None => ReportingPeriod::not_reported(),
        },
        source: PeriodSource::ContextDates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Fact, FactModel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            ReportingPeriod::new(Some(date(2024, 1, 1)), Some(date(2024, 12, 31))).label,
            "2024"
        );
        assert_eq!(
            ReportingPeriod::new(Some(date(2024, 7, 1)), Some(date(2025, 6, 30))).label,
            "2024/25"
        );
        assert_eq!(
            ReportingPeriod::new(None, Some(date(2024, 12, 31))).label,
            NOT_REPORTED
        );
        assert_eq!(ReportingPeriod::not_reported().label, "ikke rapporteret");
    }

    #[test]
    fn test_label_kind_display_matches_label() {
        let period = ReportingPeriod::new(Some(date(2023, 4, 1)), Some(date(2024, 3, 31)));
        assert_eq!(
            period.label_kind(),
            PeriodLabel::Split {
                start_year: 2023,
                end_year: 2024
            }
        );
        assert_eq!(period.label_kind().to_string(), period.label);
    }

    #[test]
    fn test_explicit_tags_with_typo() {
        let mut model = FactModel::new();
        model
            .push_fact(Fact::new("ReportingPeriodStartDate", "2024-01-01"))
            .push_fact(Fact::new("ReportingPeriodEndDate", "2024-12-31"))
            .push_fact(Fact::new("PrecedingReportingPeriodStartDate", "2023-01-01"))
            .push_fact(Fact::new("PredingReportingPeriodEndDate", "2023-12-31"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.source, PeriodSource::ExplicitTags);
        assert_eq!(pair.current.label, "2024");
        assert_eq!(pair.preceding.label, "2023");
        assert_eq!(pair.preceding.end, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_missing_preceding_end_tag_uses_earlier_statement_context() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::duration("d2024", date(2024, 1, 1), date(2024, 12, 31)))
            .insert_context(Context::duration("d2023", date(2023, 1, 1), date(2023, 12, 31)))
            .insert_context(Context::instant("i2022", date(2022, 12, 31)))
            .push_fact(Fact::new("ReportingPeriodStartDate", "2024-01-01"))
            .push_fact(Fact::new("ReportingPeriodEndDate", "2024-12-31"))
            .push_fact(Fact::new("ProfitLoss", "500").in_context("d2024"))
            .push_fact(Fact::new("ProfitLoss", "400").in_context("d2023"))
            .push_fact(Fact::new("Equity", "300").in_context("i2022"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.source, PeriodSource::ExplicitTags);
        assert_eq!(pair.current.end, Some(date(2024, 12, 31)));
        assert_eq!(pair.preceding.end, Some(date(2023, 12, 31)));
        assert_eq!(pair.preceding.start, Some(date(2023, 1, 1)));
        assert_eq!(pair.preceding.label, "2023");
    }

    #[test]
    fn test_missing_preceding_end_tag_without_comparatives() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::instant("i2024", date(2024, 12, 31)))
            .insert_context(Context::instant("i2025", date(2025, 3, 1)))
            .push_fact(Fact::new("ReportingPeriodEndDate", "2024-12-31"))
            .push_fact(Fact::new("Equity", "300").in_context("i2024"))
            .push_fact(Fact::new("Equity", "310").in_context("i2025"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.preceding, ReportingPeriod::not_reported());
    }

    #[test]
    fn test_explicit_tags_correct_spelling_accepted() {
        let mut model = FactModel::new();
        model
            .push_fact(Fact::new("ReportingPeriodEndDate", "2024-06-30"))
            .push_fact(Fact::new("PrecedingReportingPeriodEndDate", "2023-06-30"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.preceding.end, Some(date(2023, 6, 30)));
        // No start tags: labels fall back to the sentinel rather than an empty string.
        assert_eq!(pair.current.label, NOT_REPORTED);
    }

    #[test]
    fn test_inverted_explicit_pair_is_swapped() {
        let mut model = FactModel::new();
        model
            .push_fact(Fact::new("ReportingPeriodEndDate", "2022-12-31"))
            .push_fact(Fact::new("PredingReportingPeriodEndDate", "2023-12-31"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert!(pair.current.end >= pair.preceding.end);
        assert_eq!(pair.current.end, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_fallback_ranks_instant_and_duration_together() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::duration("cy", date(2024, 1, 1), date(2024, 12, 31)))
            .insert_context(Context::instant("cy_i", date(2024, 12, 31)))
            .insert_context(Context::instant("py_i", date(2023, 12, 31)))
            .push_fact(Fact::new("Revenue", "100").in_context("cy"))
            .push_fact(Fact::new("Assets", "500").in_context("cy_i"))
            .push_fact(Fact::new("Assets", "450").in_context("py_i"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.source, PeriodSource::ContextDates);
        assert_eq!(pair.current.end, Some(date(2024, 12, 31)));
        assert_eq!(pair.current.label, "2024");
        assert_eq!(pair.preceding.end, Some(date(2023, 12, 31)));
        assert_eq!(pair.preceding.label, NOT_REPORTED);
    }

    #[test]
    fn test_fallback_single_date_has_no_prior_year() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::instant("c", date(2024, 12, 31)))
            .push_fact(Fact::new("Equity", "10").in_context("c"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.current.end, Some(date(2024, 12, 31)));
        assert!(!pair.preceding.is_reported());
        assert_eq!(pair.preceding.label, NOT_REPORTED);
    }

    #[test]
    fn test_fallback_ignores_unrelated_later_contexts_by_default() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::instant("cy", date(2024, 12, 31)))
            .insert_context(Context::instant("py", date(2023, 12, 31)))
            .insert_context(Context::instant("events", date(2025, 3, 15)))
            .push_fact(Fact::new("Equity", "10").in_context("cy"))
            .push_fact(Fact::new("Equity", "9").in_context("py"))
            .push_fact(Fact::new("DescriptionOfEventsAfterReportingDate", "Ingen").in_context("events"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.current.end, Some(date(2024, 12, 31)));

        let options = ExtractionOptions {
            period_fallback: PeriodFallback::AllContexts,
            ..ExtractionOptions::default()
        };
        let pair = resolve_periods(&source, &options);
        assert_eq!(pair.current.end, Some(date(2025, 3, 15)));
        assert_eq!(pair.preceding.end, Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_fallback_skips_dimensional_contexts() {
        let mut model = FactModel::new();
        model
            .insert_context(Context::instant("cy", date(2024, 12, 31)))
            .insert_context(Context::instant("seg", date(2025, 12, 31)).with_dimension())
            .push_fact(Fact::new("Equity", "10").in_context("cy"))
            .push_fact(Fact::new("Equity", "3").in_context("seg"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert_eq!(pair.current.end, Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_unresolved_when_nothing_dated() {
        let mut model = FactModel::new();
        model.push_fact(Fact::new("Equity", "10"));
        let source = FactSource::new(&model).unwrap();

        let pair = resolve_periods(&source, &ExtractionOptions::default());
        assert!(!pair.is_resolved());
        assert_eq!(pair.current.label, NOT_REPORTED);
    }

    #[test]
    fn test_select_by_resolved_dates() {
        let pair = PeriodPair {
            current: ReportingPeriod::new(Some(date(2024, 1, 1)), Some(date(2024, 12, 31))),
            preceding: ReportingPeriod::new(Some(date(2023, 1, 1)), Some(date(2023, 12, 31))),
            source: PeriodSource::ExplicitTags,
        };
        let values: BTreeMap<NaiveDate, f64> = [
            (date(2022, 12, 31), 1.0),
            (date(2023, 12, 31), 2.0),
            (date(2024, 12, 31), 3.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(pair.select(&values), (Some(3.0), Some(2.0)));
        assert_eq!(
            PeriodPair::unresolved().select(&values),
            (Some(3.0), Some(2.0))
        );
        assert_eq!(pair.select(&BTreeMap::new()), (None, None));
    }
}
