use crate::facts::MIN_TEXT_VALUE_LEN;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PeriodFallback {
    #[default]
    #[schemars(
        description = "Rank only the end dates of contexts referenced by income statement and balance sheet facts. Keeps unrelated later contexts (e.g. subsequent-events notes) out of the CY/PY choice."
    )]
    StatementContexts,

    #[schemars(description = "Rank the end dates of every context declared in the filing.")]
    AllContexts,
}

/// Knobs for a single extraction call. The concept dictionary itself is not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionOptions {
    #[serde(default)]
    #[schemars(description = "Which contexts feed the fallback period ranking when no explicit period tags exist")]
    pub period_fallback: PeriodFallback,

    #[serde(default)]
    #[schemars(
        description = "Whether facts bound to dimensional (segment/scenario) contexts count as line-item values. Off by default: those are breakdowns, not totals."
    )]
    pub include_dimensional_contexts: bool,

    #[serde(default = "default_min_text_value_len")]
    #[schemars(description = "Text values must be longer than this many characters to be collected as free text")]
    pub min_text_value_len: usize,
}

fn default_min_text_value_len() -> usize {
    MIN_TEXT_VALUE_LEN
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            period_fallback: PeriodFallback::default(),
            include_dimensional_contexts: false,
            min_text_value_len: MIN_TEXT_VALUE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options: ExtractionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ExtractionOptions::default());
        assert_eq!(options.period_fallback, PeriodFallback::StatementContexts);
        assert_eq!(options.min_text_value_len, 5);
    }

    #[test]
    fn test_override_fallback() {
        let options: ExtractionOptions =
            serde_json::from_str(r#"{"period_fallback": "AllContexts"}"#).unwrap();
        assert_eq!(options.period_fallback, PeriodFallback::AllContexts);
        assert!(!options.include_dimensional_contexts);
    }
}
