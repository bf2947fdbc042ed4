use crate::record::LogRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat field-to-value mapping uploaded to the indexing service for one
/// log record.
pub type Document = BTreeMap<String, Value>;

/// Upper bound on the `error_trace` field. Longer traces are cut on a
/// char boundary and marked with a trailing ` [truncated]`.
pub const MAX_ERROR_TRACE_BYTES: usize = 8 * 1024;

/// Turns a [`LogRecord`] into a [`Document`].
///
/// **Fields**
/// - `extra_fields`: record field names copied into the document when the
///   record carries them.
/// - `extra_values`: constant field values stamped on every document,
///   overriding a same-named record field.
#[derive(Debug, Clone, Default)]
pub struct DocumentFormatter {
    extra_fields: Vec<String>,
    extra_values: BTreeMap<String, String>,
}

impl DocumentFormatter {
    pub fn new(extra_fields: Vec<String>, extra_values: BTreeMap<String, String>) -> Self {
        DocumentFormatter {
            extra_fields,
            extra_values,
        }
    }

    /// Produce the document for a single record. Pure; the fallible part
    /// of the pipeline is event capture, which happened before this.
    pub fn format(&self, record: &LogRecord) -> Document {
        let mut doc = Document::new();
        doc.insert(
            "date".to_string(),
            Value::String(format_timestamp(&record.timestamp)),
        );
        doc.insert("level".to_string(), Value::String(record.level.clone()));
        doc.insert("logger".to_string(), Value::String(record.logger.clone()));
        doc.insert("origin".to_string(), Value::String(record.origin()));
        doc.insert(
            "title".to_string(),
            Value::String(record.message.clone().unwrap_or_default()),
        );

        for name in &self.extra_fields {
            if let Some(value) = record.fields.get(name) {
                doc.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &self.extra_values {
            doc.insert(name.clone(), Value::String(value.clone()));
        }

        if let Some(error) = &record.error {
            doc.insert(
                "error_type".to_string(),
                Value::String(error.kind.clone()),
            );
            doc.insert(
                "error_message".to_string(),
                Value::String(error.message.clone()),
            );
            doc.insert(
                "error_trace".to_string(),
                Value::String(truncate_trace(&error.trace)),
            );
        }

        doc
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`: the timestamp formatted to second
/// precision with the millisecond component appended. Timestamps are
/// captured as UTC, so no conversion happens here.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}.{:03}Z",
        timestamp.format("%Y-%m-%dT%H:%M:%S"),
        timestamp.timestamp_subsec_millis()
    )
}

fn truncate_trace(trace: &str) -> String {
    if trace.len() <= MAX_ERROR_TRACE_BYTES {
        return trace.to_string();
    }
    let mut end = MAX_ERROR_TRACE_BYTES;
    while !trace.is_char_boundary(end) {
        end -= 1;
    }
    format!("{} [truncated]", &trace[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ErrorDetails;

    fn record() -> LogRecord {
        LogRecord {
            timestamp: "2023-04-05T06:07:08.090Z".parse().unwrap(),
            level: "INFO".to_string(),
            logger: "app::jobs".to_string(),
            file: Some("src/jobs.rs".to_string()),
            line: Some(42),
            message: Some("job finished".to_string()),
            fields: BTreeMap::new(),
            error: None,
        }
    }

    #[test]
    fn fixed_fields_are_populated() {
        let doc = DocumentFormatter::default().format(&record());

        assert_eq!(doc["date"], "2023-04-05T06:07:08.090Z");
        assert_eq!(doc["level"], "INFO");
        assert_eq!(doc["logger"], "app::jobs");
        assert_eq!(doc["origin"], "src/jobs.rs:42");
        assert_eq!(doc["title"], "job finished");
    }

    #[test]
    fn date_matches_millisecond_utc_shape() {
        let date = format_timestamp(&Utc::now());

        assert_eq!(date.len(), 24);
        let bytes = date.as_bytes();
        assert_eq!(bytes[4], b'-');
        assert_eq!(bytes[7], b'-');
        assert_eq!(bytes[10], b'T');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
        assert_eq!(bytes[19], b'.');
        assert_eq!(bytes[23], b'Z');
        assert!(date[20..23].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn no_error_fields_without_error_details() {
        let doc = DocumentFormatter::default().format(&record());

        assert!(!doc.contains_key("error_type"));
        assert!(!doc.contains_key("error_message"));
        assert!(!doc.contains_key("error_trace"));
    }

    #[test]
    fn error_details_fill_all_three_error_fields() {
        let mut record = record();
        record.error = Some(ErrorDetails {
            kind: "ParseError".to_string(),
            message: "bad input".to_string(),
            trace: "bad input\ncaused by: unexpected eof".to_string(),
        });

        let doc = DocumentFormatter::default().format(&record);

        assert_eq!(doc["error_type"], "ParseError");
        assert_eq!(doc["error_message"], "bad input");
        assert_eq!(doc["error_trace"], "bad input\ncaused by: unexpected eof");
    }

    #[test]
    fn long_traces_are_bounded() {
        let mut record = record();
        record.error = Some(ErrorDetails {
            kind: "ParseError".to_string(),
            message: "bad input".to_string(),
            trace: "x".repeat(MAX_ERROR_TRACE_BYTES + 100),
        });

        let doc = DocumentFormatter::default().format(&record);
        let trace = doc["error_trace"].as_str().unwrap();

        assert!(trace.ends_with(" [truncated]"));
        assert!(trace.len() <= MAX_ERROR_TRACE_BYTES + " [truncated]".len());
    }

    #[test]
    fn configured_extra_field_is_copied_when_present() {
        let formatter = DocumentFormatter::new(vec!["user_id".to_string()], BTreeMap::new());
        let mut record = record();
        record
            .fields
            .insert("user_id".to_string(), Value::String("abc".to_string()));

        let doc = formatter.format(&record);

        assert_eq!(doc["user_id"], "abc");
    }

    #[test]
    fn absent_extra_field_is_omitted() {
        let formatter = DocumentFormatter::new(vec!["user_id".to_string()], BTreeMap::new());

        let doc = formatter.format(&record());

        assert!(!doc.contains_key("user_id"));
    }

    #[test]
    fn unconfigured_record_fields_are_not_copied() {
        let formatter = DocumentFormatter::new(vec!["user_id".to_string()], BTreeMap::new());
        let mut record = record();
        record
            .fields
            .insert("request_id".to_string(), Value::String("r-1".to_string()));

        let doc = formatter.format(&record);

        assert!(!doc.contains_key("request_id"));
    }

    #[test]
    fn constant_values_override_record_fields() {
        let formatter = DocumentFormatter::new(
            vec!["user_id".to_string()],
            BTreeMap::from([("user_id".to_string(), "fixed".to_string())]),
        );
        let mut record = record();
        record
            .fields
            .insert("user_id".to_string(), Value::String("abc".to_string()));

        let doc = formatter.format(&record);

        assert_eq!(doc["user_id"], "fixed");
    }

    #[test]
    fn constant_values_appear_without_a_record_field() {
        let formatter = DocumentFormatter::new(
            Vec::new(),
            BTreeMap::from([("host".to_string(), "worker-1".to_string())]),
        );

        let doc = formatter.format(&record());

        assert_eq!(doc["host"], "worker-1");
    }

    #[test]
    fn missing_message_becomes_empty_title() {
        let mut record = record();
        record.message = None;

        let doc = DocumentFormatter::default().format(&record);

        assert_eq!(doc["title"], "");
    }
}
