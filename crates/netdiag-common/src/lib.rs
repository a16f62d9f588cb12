//! Network diagnosis common types, IDs, and errors.
//!
//! This crate provides foundational types shared across netdiag-core modules:
//! - Symptom and cause identifiers with format validation
//! - Schema versioning
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use id::{CauseId, IdError, IdKind, SymptomId};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
