//! In-memory event recording for tests
//!
//! `init_test_capture()` installs a global subscriber whose only layer
//! stores every event. Span fields are recorded too, so an event emitted
//! inside the coordinator's `update` span reports that span's `update_id`
//! even when the event itself does not carry one.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_UPDATE_ID};

/// One recorded event, fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    /// From the event, or else from the nearest enclosing span that has one
    pub update_id: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Renders every field value to a string
#[derive(Default)]
struct Recorder(HashMap<String, String>);

impl Recorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

/// Fields of a span, kept in the span's extensions
struct SpanFields(HashMap<String, String>);

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

pub struct TestCaptureLayer {
    buffer: Buffer,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let buffer: Buffer = Arc::default();
        (
            Self {
                buffer: Arc::clone(&buffer),
            },
            TestCapture { buffer },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        attrs.record(&mut recorder);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(recorder.0));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);
        let fields = recorder.0;

        let update_id = fields.get(FIELD_UPDATE_ID).cloned().or_else(|| {
            ctx.event_scope(event)?.find_map(|span| {
                span.extensions()
                    .get::<SpanFields>()
                    .and_then(|SpanFields(f)| f.get(FIELD_UPDATE_ID).cloned())
            })
        });

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            update_id,
            fields,
        };
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Read handle on the shared event buffer
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    /// Events whose `op` field equals `op`, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    /// # Panics
    ///
    /// Panics unless some event has this `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let matching = self.count_events(|e| {
            e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event)
        });
        assert!(
            matching > 0,
            "Expected event op={} event={} not found among {} recorded events",
            op,
            event,
            self.events().len()
        );
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.buffer
            .lock()
            .map(|buffer| buffer.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber (first call only) and return its handle.
///
/// Tests in one binary share the buffer, so assertions should filter on a
/// unique `op` or `update_id`.
///
/// ```
/// use sectiondiff_core::logging_facility::test_capture::init_test_capture;
/// use sectiondiff_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op");
/// capture.assert_event_exists("doc_example_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let (layer, handle) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            handle
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let event = CapturedEvent {
            level: Level::DEBUG,
            component: None,
            op: Some("diff".to_string()),
            event: Some("end".to_string()),
            update_id: None,
            fields: HashMap::from([("operation_count".to_string(), "3".to_string())]),
        };

        assert_eq!(event.field("operation_count"), Some("3"));
        assert_eq!(event.field("missing"), None);
    }

    #[test]
    fn test_span_update_id_is_inherited() {
        let capture = init_test_capture();
        let span = tracing::info_span!("update", update_id = "span-inherit-unique");

        span.in_scope(|| tracing::debug!(op = "span_inherit_unique_op", "inside"));

        let events = capture.events_for_op("span_inherit_unique_op");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].update_id.as_deref(), Some("span-inherit-unique"));
    }

    #[test]
    fn test_macro_fields_are_promoted() {
        // GIVEN a boundary event written by the logging macro
        let capture = init_test_capture();
        crate::log_op_start!("macro_fields_unique_op");

        // WHEN it is read back
        let events = capture.events_for_op("macro_fields_unique_op");

        // THEN every schema key it carries landed in a typed field
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].component.as_deref(),
            Some("sectiondiff_core::logging_facility::test_capture::tests")
        );
        assert_eq!(events[0].event.as_deref(), Some(crate::schema::EVENT_START));
    }
}
