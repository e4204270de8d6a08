//! Concept dictionary: logical line items and disclosures mapped to the
//! taxonomy element names that carry them across Danish GAAP, IFRS/ESEF and
//! the DCCA extension taxonomies.
//!
//! Tag lists are ordered. Consumers try each tag in turn and the first one
//! yielding a non-empty fact wins, so adding coverage for a new taxonomy
//! version means appending to a list, never reordering it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Concept {
    Revenue,
    GrossProfit,
    OperatingResult,
    NetResult,
    Assets,
    Equity,
    Liabilities,
    RevisionType,
    AuditorDescription,
    MainActivity,
    MaterialErrorCorrection,
    GoingConcern,
    AccountingClass,
    AccountingClassUpgrade,
    ReportingPeriodStart,
    ReportingPeriodEnd,
    PrecedingPeriodStart,
    PrecedingPeriodEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConceptGroup {
    Earnings,
    Balance,
    Qualitative,
    Period,
}

const REVENUE: &[&str] = &[
    "Revenue",
    "NetRevenue",
    "NetTurnover",
    "RevenueFromContractsWithCustomers",
    "RevenueFromSaleOfGoods",
    "RevenueFromSaleOfServices",
];

const GROSS_PROFIT: &[&str] = &["GrossProfitLoss", "GrossProfit"];

const OPERATING_RESULT: &[&str] = &[
    "ProfitLossFromOrdinaryOperatingActivities",
    "OperatingProfitLoss",
];

const NET_RESULT: &[&str] = &["ProfitLoss", "ProfitOrLoss"];

const ASSETS: &[&str] = &["Assets", "TotalAssets"];

const EQUITY: &[&str] = &["Equity", "TotalEquity"];

const LIABILITIES: &[&str] = &[
    "LiabilitiesOtherThanProvisions",
    "Liabilities",
    "TotalLiabilities",
];

const REVISION_TYPE: &[&str] = &[
    "TypeOfAuditorAssistance",
    "AuditorsAssistanceType",
    "AuditorsConclusion",
    "AuditorsOpinion",
];

const AUDITOR_DESCRIPTION: &[&str] = &["DescriptionOfAuditor", "AuditorName", "NameOfAuditor"];

const MAIN_ACTIVITY: &[&str] = &[
    "DescriptionOfPrimaryActivitiesOfEntity",
    "DisclosureOfMainActivitiesAndAccountingAndFinancialMatters",
    "NatureOfOperations",
    "PrincipalActivities",
    "DescriptionOfBusiness",
];

const MATERIAL_ERROR_CORRECTION: &[&str] =
    &["CorrectionOfMaterialError", "PriorPeriodErrorRestatement"];

const GOING_CONCERN: &[&str] = &[
    "UncertaintyRelatedToGoingConcern",
    "DescriptionOfGoingConcern",
    "MaterialUncertaintyRelatedToGoingConcern",
    "GoingConcernAssumption",
    "DisclosureOfUncertaintiesRelatingToGoingConcern",
];

const ACCOUNTING_CLASS: &[&str] = &["ClassOfReportingEntity", "ReportingFramework"];

const ACCOUNTING_CLASS_UPGRADE: &[&str] = &[
    "SelectedElementsFromReportingClassC",
    "SelectedElementsFromReportingClassD",
];

const REPORTING_PERIOD_START: &[&str] = &["ReportingPeriodStartDate"];

const REPORTING_PERIOD_END: &[&str] = &["ReportingPeriodEndDate"];

const PRECEDING_PERIOD_START: &[&str] = &["PrecedingReportingPeriodStartDate"];

// "Preding" is how the DCCA taxonomy actually spells the element; filings use it.
const PRECEDING_PERIOD_END: &[&str] = &[
    "PredingReportingPeriodEndDate",
    "PrecedingReportingPeriodEndDate",
];

impl Concept {
    pub const LINE_ITEMS: [Concept; 7] = [
        Self::Revenue,
        Self::GrossProfit,
        Self::OperatingResult,
        Self::NetResult,
        Self::Assets,
        Self::Equity,
        Self::Liabilities,
    ];

    pub const QUALITATIVE: [Concept; 7] = [
        Self::RevisionType,
        Self::AuditorDescription,
        Self::MainActivity,
        Self::MaterialErrorCorrection,
        Self::GoingConcern,
        Self::AccountingClass,
        Self::AccountingClassUpgrade,
    ];

    pub const ALL: [Concept; 18] = [
        Self::Revenue,
        Self::GrossProfit,
        Self::OperatingResult,
        Self::NetResult,
        Self::Assets,
        Self::Equity,
        Self::Liabilities,
        Self::RevisionType,
        Self::AuditorDescription,
        Self::MainActivity,
        Self::MaterialErrorCorrection,
        Self::GoingConcern,
        Self::AccountingClass,
        Self::AccountingClassUpgrade,
        Self::ReportingPeriodStart,
        Self::ReportingPeriodEnd,
        Self::PrecedingPeriodStart,
        Self::PrecedingPeriodEnd,
    ];

    /// Accepted taxonomy element names in priority order.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Revenue => REVENUE,
            Self::GrossProfit => GROSS_PROFIT,
            Self::OperatingResult => OPERATING_RESULT,
            Self::NetResult => NET_RESULT,
            Self::Assets => ASSETS,
            Self::Equity => EQUITY,
            Self::Liabilities => LIABILITIES,
            Self::RevisionType => REVISION_TYPE,
            Self::AuditorDescription => AUDITOR_DESCRIPTION,
            Self::MainActivity => MAIN_ACTIVITY,
            Self::MaterialErrorCorrection => MATERIAL_ERROR_CORRECTION,
            Self::GoingConcern => GOING_CONCERN,
            Self::AccountingClass => ACCOUNTING_CLASS,
            Self::AccountingClassUpgrade => ACCOUNTING_CLASS_UPGRADE,
            Self::ReportingPeriodStart => REPORTING_PERIOD_START,
            Self::ReportingPeriodEnd => REPORTING_PERIOD_END,
            Self::PrecedingPeriodStart => PRECEDING_PERIOD_START,
            Self::PrecedingPeriodEnd => PRECEDING_PERIOD_END,
        }
    }

    pub fn group(self) -> ConceptGroup {
        match self {
            Self::Revenue | Self::GrossProfit | Self::OperatingResult | Self::NetResult => {
                ConceptGroup::Earnings
            }
            Self::Assets | Self::Equity | Self::Liabilities => ConceptGroup::Balance,
            Self::ReportingPeriodStart
            | Self::ReportingPeriodEnd
            | Self::PrecedingPeriodStart
            | Self::PrecedingPeriodEnd => ConceptGroup::Period,
            _ => ConceptGroup::Qualitative,
        }
    }

    /// Danish label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Nettoomsætning",
            Self::GrossProfit => "Bruttofortjeneste",
            Self::OperatingResult => "Driftsresultat",
            Self::NetResult => "Årets resultat",
            Self::Assets => "Aktiver",
            Self::Equity => "Egenkapital",
            Self::Liabilities => "Gæld",
            Self::RevisionType => "Revisionstype",
            Self::AuditorDescription => "Revisortype",
            Self::MainActivity => "Væsentlig aktivitet",
            Self::MaterialErrorCorrection => "Korrektion af væsentlig fejl",
            Self::GoingConcern => "Going concern usikkerhed",
            Self::AccountingClass => "Anvendt regnskabsklasse",
            Self::AccountingClassUpgrade => "Tilvalg af højere regnskabsklasse",
            Self::ReportingPeriodStart => "Regnskabsperiode start",
            Self::ReportingPeriodEnd => "Regnskabsperiode slut",
            Self::PrecedingPeriodStart => "Sammenligningsperiode start",
            Self::PrecedingPeriodEnd => "Sammenligningsperiode slut",
        }
    }

    pub fn matches(self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Concept {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| format!("Unknown concept: {}", name))
    }
}

/// Ordered tag names for a logical concept name such as "Equity" or "GoingConcern".
pub fn lookup(concept_name: &str) -> Option<&'static [&'static str]> {
    concept_name.parse::<Concept>().ok().map(Concept::tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_by_name() {
        let tags = lookup("Equity").unwrap();
        assert_eq!(tags, &["Equity", "TotalEquity"]);
        assert!(lookup("goingconcern").is_some());
        assert!(lookup("Dividend").is_none());
    }

    #[test]
    fn test_preceding_end_keeps_official_typo_first() {
        let tags = Concept::PrecedingPeriodEnd.tags();
        assert_eq!(tags[0], "PredingReportingPeriodEndDate");
        assert!(tags.contains(&"PrecedingReportingPeriodEndDate"));
    }

    #[test]
    fn test_danish_gaap_tags_take_priority() {
        assert_eq!(Concept::Revenue.tags()[0], "Revenue");
        assert_eq!(Concept::RevisionType.tags()[0], "TypeOfAuditorAssistance");
        assert_eq!(
            Concept::Liabilities.tags()[0],
            "LiabilitiesOtherThanProvisions"
        );
    }

    #[test]
    fn test_main_activity_tags_are_separate_entries() {
        let tags = Concept::MainActivity.tags();
        assert!(tags.contains(&"DisclosureOfMainActivitiesAndAccountingAndFinancialMatters"));
        assert!(tags.contains(&"NatureOfOperations"));
    }

    #[test]
    fn test_no_duplicate_tags_within_a_concept() {
        for concept in Concept::ALL {
            let unique: HashSet<_> = concept.tags().iter().collect();
            assert_eq!(unique.len(), concept.tags().len(), "{}", concept);
        }
    }

    #[test]
    fn test_groups() {
        for concept in Concept::LINE_ITEMS {
            assert!(matches!(
                concept.group(),
                ConceptGroup::Earnings | ConceptGroup::Balance
            ));
        }
        for concept in Concept::QUALITATIVE {
            assert_eq!(concept.group(), ConceptGroup::Qualitative);
        }
        assert_eq!(Concept::PrecedingPeriodEnd.group(), ConceptGroup::Period);
    }
}
