use crate::financials::{FinancialRecord, RevenueValue, YearPair};
use crate::numeric::{format_amount, format_percent, Amount};
use crate::qualitative::QualitativeRecord;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const NO_REMARKS: &str = "Erklæringsgiver har ingen bemærkninger vedrørende væsentlige fejl eller usikkerhed om going concern.";

struct AmountRow {
    section: &'static str,
    label: &'static str,
    values: YearPair<Amount>,
}

struct RatioRow {
    label: &'static str,
    values: YearPair<Option<f64>>,
}

const EARNINGS_SECTION: &str = "Indtjening";
const BALANCE_SECTION: &str = "Balance";
const RATIO_SECTION: &str = "Nøgletal";

fn amounts(pair: YearPair<Option<f64>>) -> YearPair<Amount> {
    pair.map(Amount::from)
}

impl FinancialRecord {
    fn amount_rows(&self) -> Vec<AmountRow> {
        let e = &self.earnings;
        let b = &self.balance;
        let row = |section: &'static str, label: &'static str, values| AmountRow {
            section,
            label,
            values,
        };

        vec![
            row(EARNINGS_SECTION, "Nettoomsætning", e.revenue.map(Amount::from)),
            row(EARNINGS_SECTION, "Bruttofortjeneste", amounts(e.gross_profit)),
            row(EARNINGS_SECTION, "Driftsresultat", amounts(e.operating_result)),
            row(EARNINGS_SECTION, "Årets resultat", amounts(e.net_result)),
            row(BALANCE_SECTION, "Aktiver", amounts(b.assets)),
            row(BALANCE_SECTION, "Egenkapital", amounts(b.equity)),
            row(BALANCE_SECTION, "Gæld", amounts(b.liabilities)),
        ]
    }

    fn ratio_rows(&self) -> Vec<RatioRow> {
        vec![
            RatioRow {
                label: "Overskudsgrad",
                values: self.ratios.profit_margin,
            },
            RatioRow {
                label: "Soliditetsgrad",
                values: self.ratios.solvency_ratio,
            },
            RatioRow {
                label: "Gældsgrad",
                values: self.ratios.debt_ratio,
            },
        ]
    }

    fn column_header(&self, label: &str) -> String {
        match &self.currency {
            Some(currency) => format!("{} ({})", label, currency),
            None => label.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Section,Post,CY,PY\n");

        for row in self.amount_rows() {
            output.push_str(&format!(
                "{},{},{},{}\n",
                row.section,
                row.label,
                csv_field(&format_amount(row.values.current)),
                csv_field(&format_amount(row.values.preceding))
            ));
        }

        for row in self.ratio_rows() {
            output.push_str(&format!(
                "{},{},{},{}\n",
                RATIO_SECTION,
                row.label,
                csv_field(&format_percent(row.values.current)),
                csv_field(&format_percent(row.values.preceding))
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let cy = &self.periods.current.label;
        let py = &self.periods.preceding.label;

        output.push_str("# Årsregnskab\n\n");
        if let Some(currency) = &self.currency {
            output.push_str(&format!("**Valuta:** {}\n\n", currency));
        }

        for section in [EARNINGS_SECTION, BALANCE_SECTION] {
            output.push_str(&format!("## {}\n\n", section));
            output.push_str(&format!(
                "| Post | {} | {} |\n|---|---:|---:|\n",
                self.column_header(cy),
                self.column_header(py)
            ));
            for row in self.amount_rows().iter().filter(|r| r.section == section) {
                output.push_str(&format!(
                    "| {} | {} | {} |\n",
                    row.label, row.values.current, row.values.preceding
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!("## {}\n\n", RATIO_SECTION));
        output.push_str(&format!("| Post | {} | {} |\n|---|---:|---:|\n", cy, py));
        for row in self.ratio_rows() {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                row.label,
                format_percent(row.values.current),
                format_percent(row.values.preceding)
            ));
        }
        output.push('\n');

        output
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl QualitativeRecord {
    /// Fixed auditor remark sentence, built only from the tagged texts.
    pub fn remarks(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &self.material_error_correction {
            parts.push(format!(
                "Bemærkning om væsentlig fejl: {}.",
                text.trim().trim_end_matches('.')
            ));
        }
        if let Some(text) = &self.going_concern {
            parts.push(format!(
                "Bemærkning om going concern: {}.",
                text.trim().trim_end_matches('.')
            ));
        }

        if parts.is_empty() {
            NO_REMARKS.to_string()
        } else {
            format!("Erklæringsgiver har følgende bemærkninger: {}", parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneralAnalysis {
    pub audit_type: Option<String>,
    pub auditor_type: Option<String>,
    pub going_concern: Option<String>,
    pub main_activity: Option<String>,
    pub material_error_correction: Option<String>,
    pub accounting_class: Option<String>,
    pub accounting_class_upgrade: Option<String>,
    pub remarks: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearValues {
    pub current_year: Option<f64>,
    pub previous_year: Option<f64>,
}

impl From<YearPair<Option<f64>>> for YearValues {
    fn from(pair: YearPair<Option<f64>>) -> Self {
        Self {
            current_year: pair.current,
            previous_year: pair.preceding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodDates {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Periods {
    pub current_year: PeriodDates,
    pub previous_year: PeriodDates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeStatement {
    #[schemars(description = "null when revenue is not reported")]
    pub revenue: YearValues,
    pub gross_profit: YearValues,
    pub operating_result: YearValues,
    pub net_result: YearValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceSheet {
    pub assets: YearValues,
    pub equity: YearValues,
    pub liabilities: YearValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyRatios {
    pub profit_margin: YearValues,
    pub solvency_ratio: YearValues,
    pub debt_ratio: YearValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialAnalysis {
    pub currency: Option<String>,
    pub periods: Periods,
    pub income_statement: IncomeStatement,
    pub balance_sheet: BalanceSheet,
    pub ratios: KeyRatios,
}

/// Combined qualitative and financial view of one annual report, with plain
/// numbers and nulls only (no display strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnualReport {
    pub general_analysis: GeneralAnalysis,
    pub financial_analysis: FinancialAnalysis,
}

impl AnnualReport {
    pub fn new(qualitative: &QualitativeRecord, financial: &FinancialRecord) -> Self {
        let general_analysis = GeneralAnalysis {
            audit_type: qualitative.audit_opinion.clone(),
            auditor_type: qualitative.auditor.clone(),
            going_concern: qualitative.going_concern.clone(),
            main_activity: qualitative.main_activity.clone(),
            material_error_correction: qualitative.material_error_correction.clone(),
            accounting_class: qualitative.accounting_class.clone(),
            accounting_class_upgrade: qualitative.accounting_class_upgrade.clone(),
            remarks: qualitative.remarks(),
        };

        let p = &financial.periods;
        let e = &financial.earnings;
        let b = &financial.balance;
        let r = &financial.ratios;

        let financial_analysis = FinancialAnalysis {
            currency: financial.currency.clone(),
            periods: Periods {
                current_year: PeriodDates {
                    start_date: p.current.start,
                    end_date: p.current.end,
                },
                previous_year: PeriodDates {
                    start_date: p.preceding.start,
                    end_date: p.preceding.end,
                },
            },
            income_statement: IncomeStatement {
                revenue: e.revenue.map(RevenueValue::value).into(),
                gross_profit: e.gross_profit.into(),
                operating_result: e.operating_result.into(),
                net_result: e.net_result.into(),
            },
            balance_sheet: BalanceSheet {
                assets: b.assets.into(),
                equity: b.equity.into(),
                liabilities: b.liabilities.into(),
            },
            ratios: KeyRatios {
                profit_margin: r.profit_margin.into(),
                solvency_ratio: r.solvency_ratio.into(),
                debt_ratio: r.debt_ratio.into(),
            },
        };

        Self {
            general_analysis,
            financial_analysis,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnnualReport)
    }
}
