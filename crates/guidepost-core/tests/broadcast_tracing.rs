#![forbid(unsafe_code)]

//! Structured logging emitted by the store and registry.
//!
//! Verifies:
//! - Every broadcast opens a `guide.broadcast` span with `command`,
//!   `version` and `listeners` fields.
//! - Registry anomalies (replaced registration, stale unregister) are logged
//!   at DEBUG with the target name, never escalated.
//! - Commands deferred during a broadcast are logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use guidepost_core::{AnchorHandle, AnchorTarget, GuideDefinition, GuideStore};

// ============================================================================
// Capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing(f: impl FnOnce()) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

fn message(event: &CapturedEvent) -> &str {
    event.fields.get("message").map(String::as_str).unwrap_or("")
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn broadcast_span_reports_command_version_and_listeners() {
    let store = GuideStore::new();
    let _a = store.subscribe(|_| {});
    let _b = store.subscribe(|_| {});

    let capture = with_captured_tracing(|| {
        store.start_guide(GuideDefinition::new("g").step_at("a"));
        store.next_step();
    });

    let spans = capture.spans.lock().unwrap().clone();
    let broadcasts: Vec<_> = spans
        .iter()
        .filter(|s| s.name == "guide.broadcast")
        .collect();
    let field = |i: usize, key: &str| broadcasts[i].fields.get(key).cloned();

    assert_eq!(broadcasts.len(), 2);
    assert_eq!(field(0, "command").as_deref(), Some("start_guide"));
    assert_eq!(field(0, "version").as_deref(), Some("1"));
    assert_eq!(field(0, "listeners").as_deref(), Some("2"));
    assert_eq!(field(1, "command").as_deref(), Some("next_step"));
}

#[test]
fn registry_anomalies_log_at_debug() {
    let store = GuideStore::new();
    let target = AnchorTarget::new("dashboard.header");
    let old = AnchorHandle::next();
    let new = AnchorHandle::next();

    let capture = with_captured_tracing(|| {
        store.register_anchor(target.clone(), old);
        store.register_anchor(target.clone(), new);
        store.unregister_anchor(target.clone(), old);
    });

    let events = capture.events.lock().unwrap().clone();
    let registry_events: Vec<_> = events
        .iter()
        .filter(|e| e.target == "guidepost.registry")
        .collect();
    assert_eq!(registry_events.len(), 3);
    for event in &registry_events {
        assert_eq!(event.level, tracing::Level::DEBUG);
        assert_eq!(
            event.fields.get("anchor_target").map(String::as_str),
            Some("dashboard.header")
        );
    }
    assert!(
        registry_events
            .iter()
            .any(|e| message(e) == "anchor registration replaced")
    );
    assert!(
        registry_events
            .iter()
            .any(|e| message(e) == "stale unregister ignored")
    );
    assert!(store.is_mounted(&target));
}

#[test]
fn deferred_commands_are_logged() {
    let store = GuideStore::new();
    let inner = store.clone();
    let _sub = store.subscribe(move |state| {
        if state.current_step() == 1 {
            inner.close_guide();
        }
    });

    let capture = with_captured_tracing(|| {
        store.start_guide(GuideDefinition::new("g").step_at("a"));
    });

    let events = capture.events.lock().unwrap().clone();
    assert!(events.iter().any(|e| {
        e.target == "guidepost.store"
            && message(e) == "command deferred until broadcast completes"
            && e.fields.get("command").map(String::as_str) == Some("close_guide")
    }));
    assert!(!store.state().has_guide());
}
