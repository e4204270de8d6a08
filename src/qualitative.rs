use crate::facts::FactSource;
use crate::options::ExtractionOptions;
use crate::taxonomy::Concept;
use crate::utils::collapse_whitespace;
use log::debug;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Canonical kind of auditor involvement with the annual report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RevisionType {
    NoAssistance,
    #[schemars(description = "Compilation of the financial statements (opstilling)")]
    Assistance,
    ExtendedReview,
    FullAudit,
    Review,
}

impl RevisionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::NoAssistance => "No assistance",
            Self::Assistance => "Assistance",
            Self::ExtendedReview => "Extended review",
            Self::FullAudit => "Full audit",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for RevisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const NO_ASSISTANCE_PHRASES: &[&str] = &[
    "ingen bistand",
    "ingen revision",
    "ingen assistance",
    "ingen erklæring",
    "fravalg af revision",
    "fravalgt revision",
    "no assistance",
    "no audit",
    "no review",
    "not audited",
    "unaudited",
];

// Words that, next to "ingen", mean the auditor was not engaged at all.
const NEGATED_ENGAGEMENTS: &[&str] =
    &["revision", "review", "bistand", "assistance", "erklæring"];

// "Revision: ingen" declines the audit, "ingen forbehold" only means an unqualified opinion.
fn is_no_assistance(lowered: &str) -> bool {
    if NO_ASSISTANCE_PHRASES.iter().any(|p| lowered.contains(p)) {
        return true;
    }
    lowered.contains("ingen")
        && !lowered.contains("forbehold")
        && NEGATED_ENGAGEMENTS.iter().any(|w| lowered.contains(w))
}

// Checked top to bottom against the lowercased text, after the no-assistance check.
const REVISION_RULES: &[(RevisionType, &[&str])] = &[
    (
        RevisionType::Assistance,
        &["assistance", "opstilling", "assisteret", "compilation"],
    ),
    (
        RevisionType::ExtendedReview,
        &["udvidet gennemgang", "extended review"],
    ),
    (
        RevisionType::FullAudit,
        &["revisionspåtegning", "revideret", "revision", "audit"],
    ),
    (RevisionType::Review, &["review", "gennemgang"]),
];

pub fn classify_revision_type(text: &str) -> Option<RevisionType> {
    let lowered = text.to_lowercase();
    if is_no_assistance(&lowered) {
        return Some(RevisionType::NoAssistance);
    }

    REVISION_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(kind, _)| *kind)
}

/// Canonical label for a recognised opinion; anything else is returned unchanged.
pub fn normalize_revision_type(text: &str) -> String {
    match classify_revision_type(text) {
        Some(kind) => kind.label().to_string(),
        None => text.to_string(),
    }
}

const ACTIVITY_PREFIXES: &[&str] = &[
    "Selskabets væsentligste aktiviteter",
    "Virksomhedens væsentligste aktiviteter",
    "Koncernens væsentligste aktiviteter",
];

fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => None,
            '\u{2011}' => Some('-'),
            '\u{00A0}' => Some(' '),
            c => Some(c),
        })
        .collect()
}

/// Removes the disclosure label the filings repeat in front of (or glued into)
/// the activity description, plus soft hyphens and whitespace noise.
pub fn clean_activity(text: &str) -> String {
    let mut cleaned = collapse_whitespace(&strip_invisible(text));

    for prefix in ACTIVITY_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim_start_matches([' ', '.']).to_string();
        }
        cleaned = cleaned
            .replace(&format!("{} ", prefix), "")
            .replace(prefix, "");
    }

    collapse_whitespace(&cleaned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AuditorCategory {
    StateAuthorised,
    Registered,
    Other,
}

impl AuditorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::StateAuthorised => "Statsautoriseret revisor",
            Self::Registered => "Registreret revisor",
            Self::Other => "Revisor",
        }
    }

    pub fn classify(text: &str) -> Option<Self> {
        let normalized = normalize_auditor_text(text);

        if normalized.contains("statsautoriseret revisor") {
            Some(Self::StateAuthorised)
        } else if normalized.contains("registreret revisor")
            || normalized.contains("godkendt revisor")
        {
            Some(Self::Registered)
        } else if normalized.contains("revisor") {
            Some(Self::Other)
        } else {
            None
        }
    }
}

fn glued_words() -> &'static Regex {
    static GLUED: OnceLock<Regex> = OnceLock::new();
    GLUED.get_or_init(|| Regex::new(r"([a-zæøå])([A-ZÆØÅ])").expect("valid regex"))
}

// "larsenRegistreret revisor" -> "larsen registreret revisor"
fn normalize_auditor_text(text: &str) -> String {
    let stripped = strip_invisible(text);
    let split = glued_words().replace_all(&stripped, "$1 $2");
    collapse_whitespace(&split.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualitativeRecord {
    #[schemars(
        description = "Auditor's statement type: a canonical label ('No assistance', 'Assistance', 'Extended review', 'Full audit', 'Review') or the unmapped source text"
    )]
    pub audit_opinion: Option<String>,

    pub revision_type: Option<RevisionType>,

    #[schemars(description = "Auditor description exactly as tagged")]
    pub auditor: Option<String>,

    pub auditor_category: Option<AuditorCategory>,

    pub main_activity: Option<String>,

    pub material_error_correction: Option<String>,

    pub going_concern: Option<String>,

    pub accounting_class: Option<String>,

    pub accounting_class_upgrade: Option<String>,
}

impl QualitativeRecord {
    pub fn has_going_concern_uncertainty(&self) -> bool {
        self.going_concern.is_some()
    }

    pub fn has_material_error_correction(&self) -> bool {
        self.material_error_correction.is_some()
    }

    pub fn has_accounting_class_upgrade(&self) -> bool {
        self.accounting_class_upgrade.is_some()
    }
}

pub fn resolve_qualitative(
    source: &FactSource<'_>,
    options: &ExtractionOptions,
) -> QualitativeRecord {
    let include_dimensional = options.include_dimensional_contexts;
    let first = |concept: Concept| source.find_first_in(concept, include_dimensional);
    let find = |concept: Concept| first(concept).map(str::to_string);

    let raw_opinion = first(Concept::RevisionType);
    let auditor = find(Concept::AuditorDescription);
    let main_activity = first(Concept::MainActivity)
        .map(clean_activity)
        .filter(|a| !a.is_empty());

    let record = QualitativeRecord {
        audit_opinion: raw_opinion.map(normalize_revision_type),
        revision_type: raw_opinion.and_then(classify_revision_type),
        auditor_category: auditor.as_deref().and_then(AuditorCategory::classify),
        auditor,
        main_activity,
        material_error_correction: find(Concept::MaterialErrorCorrection),
        going_concern: find(Concept::GoingConcern),
        accounting_class: find(Concept::AccountingClass),
        accounting_class_upgrade: find(Concept::AccountingClassUpgrade),
    };

    for concept in Concept::QUALITATIVE {
        if first(concept).is_none() {
            debug!("No fact for {} ({})", concept, concept.label());
        }
    }

    record
}
