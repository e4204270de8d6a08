//! # Regnskab XBRL
//!
//! Extracts a two-year (current year / preceding year) financial and
//! qualitative summary from Danish annual reports filed as XBRL or inline
//! XBRL.
//!
//! ## Core Concepts
//!
//! - **Concept Dictionary**: each logical field maps to an ordered list of taxonomy tags; the first tag with a value wins
//! - **Fact Model**: facts, contexts and units from a loaded filing ([`FactModel`])
//! - **Periods**: CY/PY come from the explicit Danish GAAP period tags, otherwise from the latest context end dates
//! - **Unknown vs. missing**: an omitted revenue is `Ukendt`, never zero and never gross profit
//!
//! ## Example
//!
//! ```rust,ignore
//! use regnskab_xbrl::*;
//! use std::path::Path;
//!
//! let model = XmlFactModelLoader::new().load(Path::new("report.xml"))?;
//! let financial = extract_financials(&model)?;
//! let qualitative = extract_qualitative(&model)?;
//!
//! println!("{}", financial.to_markdown());
//! println!("{}", AnnualReport::new(&qualitative, &financial).to_json()?);
//! ```

pub mod error;
pub mod facts;
pub mod financials;
pub mod loader;
pub mod numeric;
pub mod options;
pub mod periods;
pub mod qualitative;
pub mod report;
pub mod schema;
pub mod taxonomy;
pub mod utils;

#[cfg(feature = "fetch")]
pub mod registry;

pub use error::{ErrorKind, ErrorRecord, ExtractionError, Result};
pub use facts::{get_all_text_values, get_fact, FactSource};
pub use financials::{
    collect_numeric_values, currency_from_units, ratio, Balance, Earnings, FinancialRecord,
    Ratios, RevenueValue, YearPair,
};
pub use loader::{FactModelLoader, XmlFactModelLoader};
pub use numeric::{format_amount, format_percent, parse_numeric, Amount};
pub use options::{ExtractionOptions, PeriodFallback};
pub use periods::{resolve_periods, PeriodLabel, PeriodPair, PeriodSource, ReportingPeriod};
pub use qualitative::{
    clean_activity, classify_revision_type, normalize_revision_type, AuditorCategory,
    QualitativeRecord, RevisionType,
};
pub use report::AnnualReport;
pub use schema::*;
pub use taxonomy::{lookup, Concept, ConceptGroup};

use log::info;
use std::path::Path;

pub struct ReportExtractor;

impl ReportExtractor {
    pub fn financials(model: &FactModel, options: &ExtractionOptions) -> Result<FinancialRecord> {
        let source = FactSource::new(model)?;
        info!(
            "Extracting financials from {} facts{}",
            source.len(),
            if source.is_raw_scan() { " (raw scan)" } else { "" }
        );

        let record = financials::resolve_financials(&source, options);
        info!(
            "Financials resolved for CY {} / PY {} with {} diagnostics",
            record.periods.current.label,
            record.periods.preceding.label,
            record.diagnostics.len()
        );
        Ok(record)
    }

    pub fn qualitative(model: &FactModel, options: &ExtractionOptions) -> Result<QualitativeRecord> {
        let source = FactSource::new(model)?;
        info!("Extracting qualitative facts from {} facts", source.len());
        Ok(qualitative::resolve_qualitative(&source, options))
    }

    /// Both records for one model, combined into the report JSON shape.
    pub fn annual_report(model: &FactModel, options: &ExtractionOptions) -> Result<AnnualReport> {
        let financial = Self::financials(model, options)?;
        let qualitative = Self::qualitative(model, options)?;
        Ok(AnnualReport::new(&qualitative, &financial))
    }

    /// Free-text values longer than `options.min_text_value_len`, e.g. for a search index.
    pub fn text_values(model: &FactModel, options: &ExtractionOptions) -> Result<Vec<String>> {
        let source = FactSource::new(model)?;
        Ok(source
            .text_values_longer_than(options.min_text_value_len)
            .into_iter()
            .map(String::from)
            .collect())
    }
}

pub fn load_model(path: &Path) -> Result<FactModel> {
    XmlFactModelLoader::new().load(path)
}

pub fn extract_financials(model: &FactModel) -> Result<FinancialRecord> {
    ReportExtractor::financials(model, &ExtractionOptions::default())
}

pub fn extract_financials_with(
    model: &FactModel,
    options: &ExtractionOptions,
) -> Result<FinancialRecord> {
    ReportExtractor::financials(model, options)
}

pub fn extract_qualitative(model: &FactModel) -> Result<QualitativeRecord> {
    ReportExtractor::qualitative(model, &ExtractionOptions::default())
}

pub fn extract_qualitative_with(
    model: &FactModel,
    options: &ExtractionOptions,
) -> Result<QualitativeRecord> {
    ReportExtractor::qualitative(model, options)
}
