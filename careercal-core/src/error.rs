//! Error types for careercal.

use thiserror::Error;

/// Errors that can occur while parsing the textual recurrence encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RRuleError {
    #[error("RRULE is missing FREQ")]
    MissingFrequency,

    #[error("Malformed RRULE part '{0}' (expected KEY=VALUE)")]
    MalformedPair(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Unsupported RRULE construct: {0}")]
    Unsupported(String),
}

/// Errors that can occur in careercal operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error(transparent)]
    RRule(#[from] RRuleError),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Event already exists: {0}")]
    AlreadyExists(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CalendarError {
    fn from(err: serde_json::Error) -> Self {
        CalendarError::Serialization(err.to_string())
    }
}

/// Result type alias for careercal operations.
pub type CalResult<T> = Result<T, CalendarError>;
