//! Error types for network diagnosis.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ No Valid Symptoms
//!   Reason: cannot diagnose: no valid symptoms were supplied
//!   Fix: Select at least one symptom from 'netdiag symptoms'.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 30,
//!   "category": "inference",
//!   "message": "cannot diagnose: no valid symptoms were supplied",
//!   "recoverable": true,
//!   "suggested_action": "select_symptoms"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for network diagnosis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration resolution and knowledge-file loading.
    Config,
    /// Knowledge base consistency (catalogs, probability table).
    Knowledge,
    /// Posterior computation.
    Inference,
    /// File I/O and serialization errors.
    Io,
}

impl ErrorCategory {
    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Knowledge => "knowledge",
            ErrorCategory::Inference => "inference",
            ErrorCategory::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested actions for callers to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Pick at least one catalogued symptom and retry.
    SelectSymptoms,
    /// Remove the custom knowledge file and use the built-in table.
    ResetConfig,
    /// Run the validation command.
    RunCheck,
    /// Retry the operation.
    Retry,
    /// Abort the operation.
    Abort,
    /// Manual intervention required.
    ManualIntervention,
}

impl SuggestedAction {
    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::SelectSymptoms => "select_symptoms",
            SuggestedAction::ResetConfig => "reset_config",
            SuggestedAction::RunCheck => "run_check",
            SuggestedAction::Retry => "retry",
            SuggestedAction::Abort => "abort",
            SuggestedAction::ManualIntervention => "manual_intervention",
        }
    }
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for network diagnosis.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid knowledge file: {0}")]
    InvalidKnowledge(String),

    #[error("schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersion { expected: String, actual: String },

    // Knowledge base errors (20-29)
    #[error("unknown symptom: {id}")]
    UnknownSymptom { id: String },

    #[error("unknown cause: {id}")]
    UnknownCause { id: String },

    // Inference errors (30-39)
    #[error("cannot diagnose: no valid symptoms were supplied")]
    NoValidSymptoms,

    #[error("degenerate model: every cause scored zero for {observed:?}")]
    DegenerateModel { observed: Vec<String> },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Knowledge base errors
    /// - 30-39: Inference errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidKnowledge(_) => 11,
            Error::SchemaVersion { .. } => 12,
            Error::UnknownSymptom { .. } => 20,
            Error::UnknownCause { .. } => 21,
            Error::NoValidSymptoms => 30,
            Error::DegenerateModel { .. } => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidKnowledge(_) | Error::SchemaVersion { .. } => {
                ErrorCategory::Config
            }
            Error::UnknownSymptom { .. } | Error::UnknownCause { .. } => ErrorCategory::Knowledge,
            Error::NoValidSymptoms | Error::DegenerateModel { .. } => ErrorCategory::Inference,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Only caller input and configuration problems are; a corrupt
    /// probability table is an authoring bug.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidKnowledge(_) => true,
            Error::SchemaVersion { .. } => true,

            Error::UnknownSymptom { .. } => false,
            Error::UnknownCause { .. } => false,

            Error::NoValidSymptoms => true,
            Error::DegenerateModel { .. } => false,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for automated callers.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidKnowledge(_) => SuggestedAction::ResetConfig,
            Error::SchemaVersion { .. } => SuggestedAction::ResetConfig,

            Error::UnknownSymptom { .. } => SuggestedAction::ManualIntervention,
            Error::UnknownCause { .. } => SuggestedAction::ManualIntervention,

            Error::NoValidSymptoms => SuggestedAction::SelectSymptoms,
            Error::DegenerateModel { .. } => SuggestedAction::Abort,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'netdiag check' to validate configuration.",
            Error::InvalidKnowledge(_) => {
                "Fix knowledge.json or remove it to fall back to the built-in knowledge base."
            }
            Error::SchemaVersion { .. } => {
                "Regenerate knowledge.json for the current schema version."
            }
            Error::UnknownSymptom { .. } | Error::UnknownCause { .. } => {
                "The knowledge base references an id outside its own catalog. Correct the table."
            }
            Error::NoValidSymptoms => "Select at least one symptom from 'netdiag symptoms'.",
            Error::DegenerateModel { .. } => {
                "The probability table gives zero likelihood to every cause. Correct the table."
            }
            Error::Io(_) => "Check file permissions and that the config directory exists.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidKnowledge(_) => "Invalid Knowledge File",
            Error::SchemaVersion { .. } => "Schema Version Mismatch",
            Error::UnknownSymptom { .. } => "Unknown Symptom",
            Error::UnknownCause { .. } => "Unknown Cause",
            Error::NoValidSymptoms => "No Valid Symptoms",
            Error::DegenerateModel { .. } => "Degenerate Model",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for automated callers.
    pub suggested_action: SuggestedAction,

    /// Additional structured context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::UnknownSymptom { id } | Error::UnknownCause { id } => {
                context.insert("id".to_string(), serde_json::json!(id));
            }
            Error::SchemaVersion { expected, actual } => {
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::DegenerateModel { observed } => {
                context.insert("observed".to_string(), serde_json::json!(observed));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
