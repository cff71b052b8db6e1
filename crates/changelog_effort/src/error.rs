//! Error model used by changelog normalization and effort aggregation.

use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EffortError>;

/// Represents the failure conditions of the effort engine: unparseable timestamps, inverted date ranges, malformed tracker records, non-numeric estimates and per-issue aggregation failures.
#[derive(Debug, Error)]
pub enum EffortError {
    #[error("history entry {entry_id}: invalid timestamp {value:?}: {source}")]
    TimestampParse {
        entry_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid range: end {end} is before start {start}")]
    InvalidRange { start: String, end: String },
    #[error("history record {entry_id:?} is missing required key `{key}`")]
    MissingKey {
        entry_id: Option<String>,
        key: &'static str,
    },
    #[error("history entry {entry_id}: estimate {value:?} is not a whole number of seconds")]
    InvalidEstimate { entry_id: String, value: String },
    #[error("issue {issue_key}: phase `{phase}` ({field} = {value:?}) failed: {source}")]
    Aggregation {
        issue_key: String,
        phase: String,
        field: String,
        value: String,
        #[source]
        source: Box<EffortError>,
    },
}

impl EffortError {
    /// Wraps a per-phase failure with the issue and triple it belongs to.
    pub fn aggregation(
        issue_key: impl Into<String>,
        phase: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        source: EffortError,
    ) -> Self {
        EffortError::Aggregation {
            issue_key: issue_key.into(),
            phase: phase.into(),
            field: field.into(),
            value: value.into(),
            source: Box::new(source),
        }
    }

    /// Builds a range error from any pair of displayable bounds.
    pub fn invalid_range(start: impl Display, end: impl Display) -> Self {
        EffortError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Returns the innermost error for aggregation failures, `self` otherwise.
    pub fn root_cause(&self) -> &EffortError {
        match self {
            EffortError::Aggregation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
