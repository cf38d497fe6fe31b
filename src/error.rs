//! Error types for the Fitfin engine

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during evaluation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse records: {0}")]
    ParseError(String),

    /// A record in a batch failed validation; `index` is its position in the batch
    #[error("Record {index}: {source}")]
    Record {
        index: usize,
        source: ValidationError,
    },

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One or more raw metrics fell outside their documented domain.
///
/// Every offending field is listed; the cross-field study-block check is only
/// reported once all per-field bounds pass.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Metrics failed validation: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Wire names of the offending fields, in check order
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

/// A single bounds violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    /// Wire name of the field (e.g. `hydrationLiters`)
    pub field: &'static str,
    pub value: f64,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ViolationKind {
    /// Value lies outside `[min, max]`; `max` is `None` for open-ended fields
    OutOfRange { min: f64, max: Option<f64> },
    /// NaN or infinite where a finite value is required
    NotFinite,
    /// `studyBlocksCompleted` exceeds `studyBlocksPlanned`
    ExceedsPlanned { planned: f64 },
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::OutOfRange { min, max: Some(max) } => {
                write!(f, "{}={} outside [{}, {}]", self.field, self.value, min, max)
            }
            ViolationKind::OutOfRange { min, max: None } => {
                write!(f, "{}={} below {}", self.field, self.value, min)
            }
            ViolationKind::NotFinite => write!(f, "{} is not a finite number", self.field),
            ViolationKind::ExceedsPlanned { planned } => {
                write!(f, "{}={} exceeds planned {}", self.field, self.value, planned)
            }
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
