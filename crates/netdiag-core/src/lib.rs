//! netdiag core library
//!
//! Naive-Bayes diagnosis of office network problems:
//! - Knowledge base: symptom and cause catalogs, likelihood table, hints, rules
//! - Inference engine: ranked posteriors with an evidence ledger
//! - Recommendation generator and the diagnostic service that ties them together
//! - Configuration, logging, output rendering and exit codes for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod diagnose;
pub mod exit_codes;
pub mod inference;
pub mod knowledge;
pub mod logging;
pub mod output;
pub mod recommend;
pub mod scenarios;
pub mod schema;

pub use diagnose::{DetailedDiagnosis, DiagnosticResult, DiagnosticService};
pub use inference::{InferenceError, ObservationSet, PosteriorEntry};
pub use knowledge::{KnowledgeBase, KnowledgeError, KnowledgeSpec};
pub use recommend::recommend;
