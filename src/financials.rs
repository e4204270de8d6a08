//! Earnings, balance and ratio extraction for the current and preceding year.

use crate::error::{ErrorRecord, ExtractionError};
use crate::facts::FactSource;
use crate::numeric::{parse_numeric, Amount, UNKNOWN_TEXT};
use crate::options::ExtractionOptions;
use crate::periods::{resolve_periods, PeriodPair};
use crate::schema::FactModel;
use crate::taxonomy::Concept;
use crate::utils::local_name;
use chrono::NaiveDate;
use log::{debug, warn};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, SubschemaValidation};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Revenue is either reported or explicitly unknown. Small Danish companies may
/// omit it, and it must never be filled in from gross profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevenueValue {
    Reported(f64),
    Unknown,
}

impl RevenueValue {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Reported(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl From<Option<f64>> for RevenueValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unknown, Self::Reported)
    }
}

impl From<RevenueValue> for Amount {
    fn from(value: RevenueValue) -> Self {
        match value {
            RevenueValue::Reported(v) => Amount::Value(v),
            RevenueValue::Unknown => Amount::Unknown,
        }
    }
}

impl Serialize for RevenueValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Reported(v) => serializer.serialize_f64(*v),
            Self::Unknown => serializer.serialize_str(UNKNOWN_TEXT),
        }
    }
}

impl<'de> Deserialize<'de> for RevenueValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Self::Reported(v)),
            Raw::Text(t) if t == UNKNOWN_TEXT => Ok(Self::Unknown),
            Raw::Text(t) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{}\", got \"{}\"",
                UNKNOWN_TEXT, t
            ))),
        }
    }
}

impl JsonSchema for RevenueValue {
    fn schema_name() -> String {
        "RevenueValue".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let unknown = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            enum_values: Some(vec![serde_json::json!(UNKNOWN_TEXT)]),
            ..Default::default()
        };

        SchemaObject {
            subschemas: Some(Box::new(SubschemaValidation {
                any_of: Some(vec![gen.subschema_for::<f64>(), unknown.into()]),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearPair<T> {
    pub current: T,
    pub preceding: T,
}

impl<T> YearPair<T> {
    pub fn new(current: T, preceding: T) -> Self {
        Self { current, preceding }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> YearPair<U> {
        YearPair {
            current: f(self.current),
            preceding: f(self.preceding),
        }
    }
}

impl<T: Copy> YearPair<T> {
    pub fn zip_with<U: Copy, R>(&self, other: &YearPair<U>, f: impl Fn(T, U) -> R) -> YearPair<R> {
        YearPair {
            current: f(self.current, other.current),
            preceding: f(self.preceding, other.preceding),
        }
    }
}

impl From<(Option<f64>, Option<f64>)> for YearPair<Option<f64>> {
    fn from((current, preceding): (Option<f64>, Option<f64>)) -> Self {
        Self { current, preceding }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Earnings {
    #[schemars(description = "Nettoomsætning. 'Ukendt' when the filing omits it")]
    pub revenue: YearPair<RevenueValue>,
    pub gross_profit: YearPair<Option<f64>>,
    pub operating_result: YearPair<Option<f64>>,
    pub net_result: YearPair<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Balance {
    pub assets: YearPair<Option<f64>>,
    pub equity: YearPair<Option<f64>>,
    pub liabilities: YearPair<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ratios {
    #[schemars(description = "Net result / revenue, as a fraction")]
    pub profit_margin: YearPair<Option<f64>>,
    #[schemars(description = "Equity / total assets, as a fraction")]
    pub solvency_ratio: YearPair<Option<f64>>,
    #[schemars(description = "Total liabilities / equity, as a fraction")]
    pub debt_ratio: YearPair<Option<f64>>,
}

impl Ratios {
    pub fn compute(earnings: &Earnings, balance: &Balance) -> Self {
        let revenue = earnings.revenue.map(RevenueValue::value);
        Self {
            profit_margin: earnings.net_result.zip_with(&revenue, ratio),
            solvency_ratio: balance.equity.zip_with(&balance.assets, ratio),
            debt_ratio: balance.liabilities.zip_with(&balance.equity, ratio),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialRecord {
    #[schemars(description = "ISO currency code from the filing's units, e.g. DKK")]
    pub currency: Option<String>,
    pub periods: PeriodPair,
    pub earnings: Earnings,
    pub balance: Balance,
    pub ratios: Ratios,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(description = "Recovered problems: skipped values, missing concepts, unresolved periods")]
    pub diagnostics: Vec<ErrorRecord>,
}

impl FinancialRecord {
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FinancialRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}

/// `numerator / denominator`, or `None` when either side is missing or the denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d).filter(|r| r.is_finite()),
        _ => None,
    }
}

/// First measure that looks like a currency code ("iso4217:DKK" -> "DKK").
/// "pure" and "shares" are skipped.
pub fn currency_from_units(model: &FactModel) -> Option<String> {
    model
        .units
        .values()
        .flat_map(|u| u.measures.iter())
        .map(|m| local_name(m.trim()))
        .find(|code| {
            (3..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_uppercase())
        })
        .map(str::to_string)
}

/// Date-keyed numeric values for a concept. Tags are visited in dictionary
/// order, so for a given date the higher-priority tag wins.
pub fn collect_numeric_values(
    source: &FactSource<'_>,
    concept: Concept,
    options: &ExtractionOptions,
    diagnostics: &mut Vec<ErrorRecord>,
) -> BTreeMap<NaiveDate, f64> {
    let mut values = BTreeMap::new();

    for tag in concept.tags() {
        for fact in source.iter().filter(|f| f.concept == *tag && f.has_value()) {
            let Some(context) = source.context_of(fact) else {
                debug!("{} fact without resolvable context ignored", tag);
                continue;
            };
            if context.dimensional && !options.include_dimensional_contexts {
                continue;
            }
            let Some(date) = context.as_of() else {
                continue;
            };

            match parse_numeric(&fact.value) {
                Some(value) => {
                    values.entry(date).or_insert(value);
                }
                None => {
                    let err = ExtractionError::NumericParseSkip {
                        concept: tag.to_string(),
                        value: fact.value.trim().to_string(),
                    };
                    warn!("{}", err);
                    diagnostics.push(ErrorRecord::from(&err));
                }
            }
        }
    }

    if values.is_empty() {
        let err = ExtractionError::ConceptUnresolved(concept.to_string());
        debug!("{}", err);
        diagnostics.push(ErrorRecord::from(&err));
    }

    values
}

pub fn resolve_financials(source: &FactSource<'_>, options: &ExtractionOptions) -> FinancialRecord {
    let mut diagnostics = Vec::new();
    let periods = resolve_periods(source, options);

    if !periods.is_resolved() {
        let err = ExtractionError::PeriodUnresolved(
            "falling back to each concept's two latest dates".to_string(),
        );
        diagnostics.push(ErrorRecord::from(&err));
    }

    let mut line_item = |concept: Concept| -> YearPair<Option<f64>> {
        let values = collect_numeric_values(source, concept, options, &mut diagnostics);
        periods.select(&values).into()
    };

    let revenue = line_item(Concept::Revenue).map(RevenueValue::from);
    let earnings = Earnings {
        revenue,
        gross_profit: line_item(Concept::GrossProfit),
        operating_result: line_item(Concept::OperatingResult),
        net_result: line_item(Concept::NetResult),
    };

    let balance = Balance {
        assets: line_item(Concept::Assets),
        equity: line_item(Concept::Equity),
        liabilities: line_item(Concept::Liabilities),
    };

    if earnings.revenue.current.is_unknown() {
        debug!("Revenue not reported for current year; marked unknown");
    }

    let ratios = Ratios::compute(&earnings, &balance);

    FinancialRecord {
        currency: currency_from_units(source.model()),
        periods,
        earnings,
        balance,
        ratios,
        diagnostics,
    }
}
