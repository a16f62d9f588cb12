//! Payload rendering for the CLI.
//!
//! JSON payloads are wrapped in a versioned [`Envelope`]; Markdown and
//! one-line summaries are produced for humans. Rendering never touches
//! stdout directly: callers decide where the text goes.

use crate::config::ConfigSnapshot;
use crate::diagnose::{DetailedDiagnosis, DiagnosticResult};
use crate::inference::PosteriorResult;
use crate::knowledge::{KnowledgeBase, RuleMatch};
use chrono::{DateTime, Utc};
use netdiag_common::{StructuredError, SCHEMA_VERSION};
use serde::Serialize;
use std::fmt::Write as _;

/// Versioned wrapper around every JSON payload.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub schema_version: &'static str,
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(run_id: impl Into<String>, command: impl Into<String>, data: T) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.into(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// JSON error body emitted on stdout when a command fails in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: StructuredError,
    pub exit_code: i32,
    pub exit_code_name: &'static str,
}

/// Probability as a percentage with two decimals, e.g. `49.59%`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Diagnosis payload: the result, how the input was filtered, and the
/// evidence ledger when requested.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisPayload<'a> {
    #[serde(flatten)]
    pub result: &'a DiagnosticResult,
    pub observed_symptoms: &'a [String],
    pub ignored_symptoms: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<&'a PosteriorResult>,
}

impl<'a> DiagnosisPayload<'a> {
    pub fn new(diagnosis: &'a DetailedDiagnosis, explain: bool) -> Self {
        DiagnosisPayload {
            result: &diagnosis.result,
            observed_symptoms: &diagnosis.observed_symptoms,
            ignored_symptoms: &diagnosis.ignored_symptoms,
            evidence: explain.then_some(&diagnosis.posterior),
        }
    }
}

/// Markdown report for one diagnosis, with the evidence table when `explain`.
pub fn render_markdown(diagnosis: &DetailedDiagnosis, explain: bool) -> String {
    let mut out = String::new();
    let result = &diagnosis.result;
    let top = &result.most_probable_cause;

    let _ = writeln!(out, "# Network diagnosis");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Most probable cause:** {} ({})",
        top.description, top.cause_id
    );
    let _ = writeln!(out, "**Probability:** {}", format_percent(top.probability));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Observed symptoms:** {}",
        diagnosis.observed_symptoms.join(", ")
    );
    if !diagnosis.ignored_symptoms.is_empty() {
        let _ = writeln!(
            out,
            "**Ignored ids:** {}",
            diagnosis.ignored_symptoms.join(", ")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## All causes");
    let _ = writeln!(out);
    for entry in &result.ranked_causes {
        let _ = writeln!(
            out,
            "- {} ({}): {}",
            entry.description,
            entry.cause_id,
            format_percent(entry.probability)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Recommendations");
    let _ = writeln!(out);
    if result.recommendations.is_empty() {
        let _ = writeln!(out, "_None._");
    }
    for rec in &result.recommendations {
        let _ = writeln!(out, "- {}", rec);
    }

    if explain {
        out.push('\n');
        out.push_str(&render_evidence_markdown(&diagnosis.posterior));
    }
    out
}

/// Evidence ledger as a Markdown table: one row per factor, one column per cause.
fn render_evidence_markdown(evidence: &PosteriorResult) -> String {
    let columns: Vec<&str> = evidence.causes.iter().map(|c| c.as_str()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "## Evidence (ln contribution)");
    let _ = writeln!(out);
    let _ = writeln!(out, "| factor | {} |", columns.join(" | "));
    let _ = writeln!(out, "|---|{}", "---|".repeat(columns.len()));
    for term in &evidence.evidence_terms {
        let cells: Vec<String> = term
            .log_likelihood
            .iter()
            .map(|v| {
                if v.is_finite() {
                    format!("{:.4}", v)
                } else {
                    "-inf".to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "| {} | {} |", term.feature, cells.join(" | "));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "ln P(evidence) = {:.4}", evidence.log_evidence);
    out
}

/// One-line summary for quick status checks.
pub fn render_summary(result: &DiagnosticResult) -> String {
    let top = &result.most_probable_cause;
    format!(
        "{} {} ({}) | recommendations: {}",
        top.cause_id,
        top.description,
        format_percent(top.probability),
        result.recommendations.len()
    )
}

/// [`render_summary`] plus the symptoms used and any ignored ids.
pub fn render_diagnosis_summary(diagnosis: &DetailedDiagnosis) -> String {
    let mut line = render_summary(&diagnosis.result);
    let _ = write!(line, " | symptoms: {}", diagnosis.observed_symptoms.join(","));
    if !diagnosis.ignored_symptoms.is_empty() {
        let _ = write!(line, " | ignored: {}", diagnosis.ignored_symptoms.join(","));
    }
    line
}

/// Symptom checklist as Markdown.
pub fn render_symptoms_markdown(kb: &KnowledgeBase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Symptoms");
    let _ = writeln!(out);
    let _ = writeln!(out, "| id | description | frequency | reliability | suggested action |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for s in kb.symptoms() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} | {} |",
            s.id,
            s.description,
            s.frequency,
            s.estimated_reliability,
            kb.suggested_action(s.id.as_str()).unwrap_or("-")
        );
    }
    out
}

/// Cause catalog as Markdown.
pub fn render_causes_markdown(kb: &KnowledgeBase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Causes");
    let _ = writeln!(out);
    for c in kb.causes() {
        let _ = writeln!(
            out,
            "- **{}** {} (prior {})",
            c.id,
            c.description,
            format_percent(c.prior_probability)
        );
        for step in kb.remediations(c.id.as_str()) {
            let _ = writeln!(out, "  - {}", step);
        }
    }
    out
}

/// Matched rules as Markdown.
pub fn render_rules_markdown(matches: &[RuleMatch<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Matching rules");
    let _ = writeln!(out);
    if matches.is_empty() {
        let _ = writeln!(out, "_No rule matched the supplied facts._");
    }
    for m in matches {
        let _ = writeln!(
            out,
            "- IF {} THEN **{}**",
            m.conditions.join(" AND "),
            m.conclusion
        );
    }
    out
}

/// Configuration snapshot as Markdown.
pub fn render_snapshot_markdown(snapshot: &ConfigSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Configuration");
    let _ = writeln!(out);
    let _ = writeln!(out, "Config dir: {}", snapshot.config_dir.display());
    match (&snapshot.knowledge_path, &snapshot.knowledge_hash) {
        (Some(path), Some(hash)) => {
            let _ = writeln!(out, "Knowledge file: {}", path.display());
            let _ = writeln!(out, "SHA-256: {}", hash);
        }
        _ => {
            let _ = writeln!(out, "Knowledge file: built-in");
        }
    }
    let _ = writeln!(out, "Schema version: {}", snapshot.schema_version);
    let _ = writeln!(
        out,
        "Catalog: {} symptoms, {} causes, {} rules",
        snapshot.symptom_count, snapshot.cause_count, snapshot.rule_count
    );
    out
}
