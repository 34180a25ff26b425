//! Tracing setup and the activity event layer.
//!
//! `ActivityEventLayer` forwards every tracing event to a tokio channel so a
//! presentation layer can stream what the client is doing.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber (env filter + fmt).
///
/// `filter` takes precedence over `RUST_LOG`. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(filter: Option<&str>) -> bool {
    init_with(filter, None)
}

/// Like `init_tracing`, additionally streaming events into `sender`.
pub fn init_tracing_with_activity(
    filter: Option<&str>,
    sender: mpsc::UnboundedSender<ActivityEvent>,
) -> bool {
    init_with(filter, Some(ActivityEventLayer::new(sender)))
}

fn init_with(filter: Option<&str>, activity: Option<ActivityEventLayer>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(activity)
        .with(filter)
        .try_init()
        .is_ok()
}

/// Event data sent to observers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityEvent {
    /// Event target (e.g., "tradewind_application::app_state_store")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    /// Structured fields from the event
    pub fields: HashMap<String, Value>,
    /// RFC 3339
    pub timestamp: String,
}

/// A tracing layer that sends every event to a channel.
pub struct ActivityEventLayer {
    sender: mpsc::UnboundedSender<ActivityEvent>,
}

impl ActivityEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<ActivityEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for ActivityEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let activity = ActivityEvent {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone: nobody is streaming, drop the event.
        let _ = self.sender.send(activity);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
