use crate::client::IndexClient;
use crate::format::DocumentFormatter;
use crate::record::{ErrorDetails, LogRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns each event into a document and
/// uploads it through an [`IndexClient`].
///
/// The upload is one synchronous call per event, on the calling thread.
/// There is no queue, no batching and no retry; an upload failure is
/// reported to stderr, counted, and the record is dropped.
pub struct IndexLogLayer {
    client: Arc<dyn IndexClient>,
    index: String,
    formatter: DocumentFormatter,
    /// Events observed by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Documents accepted by the indexing service.
    pub uploaded_events: Arc<AtomicU64>,
    /// Documents lost to client errors.
    pub failed_events: Arc<AtomicU64>,
}

impl IndexLogLayer {
    pub fn new(
        client: Arc<dyn IndexClient>,
        index: impl Into<String>,
        formatter: DocumentFormatter,
    ) -> Self {
        IndexLogLayer {
            client,
            index: index.into(),
            formatter,
            total_events: Arc::new(AtomicU64::new(0)),
            uploaded_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    fn capture(event: &Event<'_>) -> LogRecord {
        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut error: Option<ErrorDetails> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
            error: &mut error,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        LogRecord {
            timestamp: Utc::now(),
            level: meta.level().to_string(),
            logger: meta.target().to_string(),
            file: meta.file().map(|s| s.to_string()),
            line: meta.line(),
            message,
            fields,
            error,
        }
    }
}

impl<S> Layer<S> for IndexLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let record = Self::capture(event);
        let doc = self.formatter.format(&record);

        match self.client.upload_documents(&self.index, &[doc], true) {
            Ok(()) => {
                self.uploaded_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!(
                    "failed to upload log document to index {}: {}",
                    self.index, e
                );
            }
        }
    }
}

use tracing::field::{Field, Visit};

/// Event visitor feeding [`IndexLogLayer::capture`].
///
/// The `message` field lands in the message slot (it arrives through
/// `record_str` or, for formatted messages, `record_debug`), error-valued
/// fields land in the error slot, everything else goes into the field map.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
    pub error: &'a mut Option<ErrorDetails>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        // First error-valued field wins; an event carries one error.
        if self.error.is_none() {
            *self.error = Some(ErrorDetails::from_error(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }
}
