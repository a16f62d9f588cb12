//! JSON Schema generation for payload and knowledge-file types.
//!
//! ```bash
//! netdiag schema --list
//! netdiag schema DiagnosticResult
//! netdiag schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::config::ConfigSnapshot;
pub use crate::diagnose::DiagnosticResult;
pub use crate::inference::PosteriorEntry;
pub use crate::knowledge::{Cause, KnowledgeRule, KnowledgeSpec, Symptom};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DiagnosticResult", "Outcome of one diagnosis run"),
        ("PosteriorEntry", "Cause with its posterior probability"),
        ("KnowledgeSpec", "Knowledge file (knowledge.json)"),
        ("Symptom", "Symptom catalog entry"),
        ("Cause", "Cause catalog entry with prior"),
        ("KnowledgeRule", "IF-THEN troubleshooting rule"),
        ("ConfigSnapshot", "Resolved configuration summary"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns None if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "DiagnosticResult" => schema_for!(DiagnosticResult),
        "PosteriorEntry" => schema_for!(PosteriorEntry),
        "KnowledgeSpec" => schema_for!(KnowledgeSpec),
        "Symptom" => schema_for!(Symptom),
        "Cause" => schema_for!(Cause),
        "KnowledgeRule" => schema_for!(KnowledgeRule),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}
