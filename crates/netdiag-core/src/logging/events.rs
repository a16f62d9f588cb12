//! Structured event definitions for logging.
//!
//! Every JSONL record shares one schema: timestamp, level, event name, the
//! run id and stage when known, a message, and free-form fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of a diagnostic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and argument handling.
    Init,
    /// Configuration and knowledge loading.
    Load,
    /// Filtering the supplied symptom ids.
    Observe,
    /// Posterior computation.
    Infer,
    /// Recommendation assembly.
    Recommend,
    /// Rendering the payload.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Observe => "observe",
            Stage::Infer => "infer",
            Stage::Recommend => "recommend",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config/load events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Observation
    pub const SYMPTOMS_IGNORED: &str = "symptoms.ignored";

    // Inference and diagnosis
    pub const INFER_FINISHED: &str = "infer.finished";
    pub const INFER_FAILED: &str = "infer.failed";
    pub const DIAGNOSE_FINISHED: &str = "diagnose.finished";

    // Rules
    pub const RULES_EVALUATED: &str = "rules.evaluated";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log record for JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub level: Level,

    /// Event name (e.g., "run.started", "config.loaded").
    pub event: String,

    /// Unique ID for this invocation of netdiag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Additional structured fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    /// Create a new log event with required fields.
    pub fn new(level: Level, event: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: None,
            stage: None,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_stage(mut self, stage: impl ToString) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Correlation data shared by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// CLI subcommand being executed.
    pub command: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, command: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            command: command.into(),
        }
    }

    /// Create an event with this context.
    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        LogEvent::new(level, event, message)
            .with_run_id(&self.run_id)
            .with_stage(stage)
            .with_field("command", &self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(Level::Info, "run.started", "Starting diagnosis")
            .with_run_id("run-12345")
            .with_stage(Stage::Init)
            .with_field("schema_version", "1.0.0");

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"run.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"init""#));
        assert!(json.contains(r#""run_id":"run-12345""#));
        assert!(json.contains(r#""schema_version":"1.0.0""#));
    }

    #[test]
    fn test_log_event_omits_empty_parts() {
        let json = LogEvent::new(Level::Debug, "infer.finished", "").to_jsonl();
        assert!(!json.contains("run_id"));
        assert!(!json.contains("message"));
        assert!(!json.contains("fields"));
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc", "diagnose");
        let event = ctx.event(Level::Info, event_names::DIAGNOSE_FINISHED, Stage::Infer, "done");
        assert_eq!(event.run_id.as_deref(), Some("run-abc"));
        assert_eq!(event.stage.as_deref(), Some("infer"));
        assert_eq!(event.fields["command"], "diagnose");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Load.to_string(), "load");
        assert_eq!(Stage::Recommend.to_string(), "recommend");
        assert_eq!(serde_json::to_string(&Stage::Observe).unwrap(), "\"observe\"");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::RUN_STARTED, "run.started");
        assert_eq!(event_names::SYMPTOMS_IGNORED, "symptoms.ignored");
        assert_eq!(event_names::DIAGNOSE_FINISHED, "diagnose.finished");
    }
}
