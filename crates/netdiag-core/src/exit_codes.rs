//! Exit codes for the netdiag CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-9: Operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs or broken installations)

/// Exit codes for netdiag operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Diagnosis produced / command succeeded
    Clean = 0,

    /// No catalogued symptom was supplied; nothing to diagnose
    NoValidSymptoms = 1,

    /// Invalid arguments
    ArgsError = 10,

    /// Config directory or knowledge file could not be used
    ConfigError = 11,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,

    /// Probability table gave every cause a zero score
    ModelError = 22,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 0-9 are outcomes, not errors.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    /// Codes 10-19 can be resolved by the user.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Codes 20-29 indicate bugs or a broken model.
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoValidSymptoms => "OK_NO_SYMPTOMS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
            ExitCode::ModelError => "ERR_MODEL",
        }
    }
}

impl From<&netdiag_common::Error> for ExitCode {
    fn from(err: &netdiag_common::Error) -> Self {
        use netdiag_common::Error;
        match err {
            Error::NoValidSymptoms => ExitCode::NoValidSymptoms,
            Error::DegenerateModel { .. } => ExitCode::ModelError,
            Error::Config(_)
            | Error::InvalidKnowledge(_)
            | Error::SchemaVersion { .. }
            | Error::UnknownSymptom { .. }
            | Error::UnknownCause { .. } => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
