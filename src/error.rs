use crate::models::VerseId;
use std::fmt;
use thiserror::Error;

/// Why a range token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeIssue {
    CrossBook,
    CrossChapter,
    Descending,
    /// Number of verses the range would cover, and the limit it exceeds.
    TooLong { span: u64, max: u32 },
}

impl fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeIssue::CrossBook => write!(f, "verses in a range must be in the same book"),
            RangeIssue::CrossChapter => write!(f, "ranges spanning chapters are not supported"),
            RangeIssue::Descending => write!(f, "range end precedes range start"),
            RangeIssue::TooLong { span, max } => {
                write!(f, "range covers {} verses, more than the limit of {}", span, max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Malformed reference '{raw}': {reason}")]
    MalformedReference { raw: String, reason: String },

    #[error("Invalid range '{raw}': {issue}")]
    InvalidRange { raw: String, issue: RangeIssue },
}

impl ReferenceError {
    pub fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        ReferenceError::MalformedReference {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_range(raw: &str, issue: RangeIssue) -> Self {
        ReferenceError::InvalidRange {
            raw: raw.to_string(),
            issue,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ReferenceError::MalformedReference { .. })
    }
}

/// A verse pair that does not hold exactly two distinct verses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Verse pair must contain exactly two distinct verses, found {}", .members.len())]
pub struct CardinalityError {
    pub members: Vec<VerseId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ReferenceError::invalid_range("Gen.1.1-Gen.2.1", RangeIssue::CrossChapter);
        assert_eq!(
            err.to_string(),
            "Invalid range 'Gen.1.1-Gen.2.1': ranges spanning chapters are not supported"
        );
        assert!(!err.is_malformed());

        let err = ReferenceError::malformed("Gen.1", "expected 3 components, found 2");
        assert!(err.is_malformed());
        assert!(err.to_string().contains("Gen.1"));
    }

    #[test]
    fn test_cardinality_message() {
        let err = CardinalityError {
            members: vec![VerseId::new("Gen", 1, 1)],
        };
        assert!(err.to_string().ends_with("found 1"));
    }

    #[test]
    fn test_too_long_message() {
        let err = ReferenceError::invalid_range(
            "Gen.1.1-Gen.1.5000",
            RangeIssue::TooLong { span: 5000, max: 1000 },
        );
        assert!(!err.is_malformed());
        assert!(err.to_string().contains("range covers 5000 verses"));
    }
}
