use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;

/// Normalized log event captured from a `tracing` event, before it is
/// turned into an uploadable document.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub logger: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub message: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub error: Option<ErrorDetails>,
}

impl LogRecord {
    /// `<file>:<line>` source location of the event callsite, or
    /// `<unknown>` when the callsite carries no location data.
    pub fn origin(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            _ => "<unknown>".to_string(),
        }
    }
}

/// Details of an error attached to a log event: the error's type name,
/// its display form, and its full `source()` chain.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub kind: String,
    pub message: String,
    pub trace: String,
}

impl ErrorDetails {
    /// Extract details from a dynamically-typed error.
    ///
    /// The concrete type is erased behind `dyn Error`, so the type name is
    /// taken from the leading identifier of the error's `Debug` form (the
    /// struct or enum variant name for derived impls). The trace lists the
    /// error followed by each cause in its `source()` chain, one per line.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let debug = format!("{:?}", err);
        let kind: String = debug
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let kind = if kind.is_empty() { "Error".to_string() } else { kind };

        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str(&format!("\ncaused by: {}", cause));
            source = cause.source();
        }

        ErrorDetails {
            kind,
            message: err.to_string(),
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct RootError;

    impl fmt::Display for RootError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk offline")
        }
    }

    impl Error for RootError {}

    #[derive(Debug)]
    struct WrapError {
        source: RootError,
    }

    impl fmt::Display for WrapError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "job failed")
        }
    }

    impl Error for WrapError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn details_carry_type_name_message_and_chain() {
        let err = WrapError { source: RootError };
        let details = ErrorDetails::from_error(&err);

        assert_eq!(details.kind, "WrapError");
        assert_eq!(details.message, "job failed");
        assert_eq!(details.trace, "job failed\ncaused by: disk offline");
    }

    #[test]
    fn details_without_source_have_single_line_trace() {
        let details = ErrorDetails::from_error(&RootError);

        assert_eq!(details.kind, "RootError");
        assert_eq!(details.trace, "disk offline");
    }

    #[test]
    fn origin_falls_back_when_location_is_missing() {
        let record = LogRecord {
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            logger: "app".to_string(),
            file: None,
            line: None,
            message: None,
            fields: BTreeMap::new(),
            error: None,
        };

        assert_eq!(record.origin(), "<unknown>");
    }

    #[test]
    fn origin_joins_file_and_line() {
        let record = LogRecord {
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            logger: "app".to_string(),
            file: Some("src/jobs.rs".to_string()),
            line: Some(42),
            message: None,
            fields: BTreeMap::new(),
            error: None,
        };

        assert_eq!(record.origin(), "src/jobs.rs:42");
    }
}
