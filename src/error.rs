//! Error types for dashmon
//!
//! Producer-side input errors are rejected at the API boundary and never
//! touch stored state. Collaborator failures have their own type because a
//! monitor absorbs them instead of returning them.

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for monitor operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Value is not a finite number (NaN, Inf)
    #[error("Invalid value for {metric}: {value}")]
    InvalidValue { metric: String, value: f64 },

    /// Metric or entity name is empty
    #[error("Name must not be empty")]
    EmptyName,

    /// Category not declared by the domain profile
    #[error("Unknown category '{category}' for domain '{domain}'")]
    UnknownCategory { domain: String, category: String },

    /// Entity kind not accepted by the domain profile
    #[error("Domain '{domain}' does not track {kind} entities")]
    UnsupportedEntity { domain: String, kind: String },

    /// Inconsistent threshold bounds
    #[error("Invalid thresholds for '{category}': {reason}")]
    InvalidThresholds { category: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration or profile could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err.to_string())
    }
}

/// Errors raised by external collaborators (health probes, OS metric sources)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectorError {
    /// Target could not be reached
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Check did not answer in time
    #[error("Timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Check ran and failed
    #[error("Check failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::UnknownCategory {
            domain: "financial".to_string(),
            category: "latency".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("latency"));
        assert!(msg.contains("financial"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: MonitorError = parse_err.into();
        assert!(matches!(err, MonitorError::Parse(_)));
    }

    #[test]
    fn test_collector_error_display() {
        let err = CollectorError::Timeout { timeout_ms: 250 };
        assert_eq!(format!("{}", err), "Timed out after 250ms");
    }
}
