use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Could not load fact model: {0}")]
    Load(String),

    #[error("Could not fetch document from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("No usable reporting period found: {0}")]
    PeriodUnresolved(String),

    #[error("Skipped value '{value}' for {concept}: not a number")]
    NumericParseSkip { concept: String, value: String },

    #[error("No fact found for concept {0}")]
    ConceptUnresolved(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Load,
    Fetch,
    PeriodUnresolved,
    NumericParseSkip,
    ConceptUnresolved,
    Serialization,
    Io,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load(_) => ErrorKind::Load,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::PeriodUnresolved(_) => ErrorKind::PeriodUnresolved,
            Self::NumericParseSkip { .. } => ErrorKind::NumericParseSkip,
            Self::ConceptUnresolved(_) => ErrorKind::ConceptUnresolved,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the failure aborts a whole extraction call rather than a single field.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::PeriodUnresolved(_) | Self::NumericParseSkip { .. } | Self::ConceptUnresolved(_)
        )
    }
}

/// Serialisable form of an [`ExtractionError`] for JSON consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub error: String,
}

impl From<&ExtractionError> for ErrorRecord {
    fn from(err: &ExtractionError) -> Self {
        Self {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(ExtractionError::Load("bad xml".to_string()).is_fatal());
        assert!(ExtractionError::Fetch {
            url: "http://example.test".to_string(),
            reason: "timeout".to_string(),
        }
        .is_fatal());
        assert!(!ExtractionError::ConceptUnresolved("Revenue".to_string()).is_fatal());
        assert!(!ExtractionError::NumericParseSkip {
            concept: "Equity".to_string(),
            value: "n/a".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_error_record_carries_kind() {
        let err = ExtractionError::Load("no root element".to_string());
        let record = ErrorRecord::from(&err);
        assert_eq!(record.kind, ErrorKind::Load);
        assert!(record.error.contains("no root element"));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"load\""));
    }
}
