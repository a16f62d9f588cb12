//! Schema versioning for knowledge files and command payloads.

/// Current schema version for knowledge files and JSON output envelopes.
///
/// Bumped whenever a field is renamed or removed.
pub const SCHEMA_VERSION: &str = "1.0.0";
