//! Symptom and cause identity types.
//!
//! Catalog entries are identified by short prefixed ordinals: symptoms use
//! `S<n>` and causes use `C<n>`, with `n` a positive integer without leading
//! zeros. The numeric suffix carries no meaning beyond uniqueness; catalog
//! position is always resolved through an explicit index, never by parsing.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

static SYMPTOM_ID_RE: OnceLock<Regex> = OnceLock::new();
static CAUSE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn symptom_re() -> &'static Regex {
    SYMPTOM_ID_RE.get_or_init(|| Regex::new(r"^S[1-9][0-9]*$").expect("valid symptom id regex"))
}

fn cause_re() -> &'static Regex {
    CAUSE_ID_RE.get_or_init(|| Regex::new(r"^C[1-9][0-9]*$").expect("valid cause id regex"))
}

/// Which catalog an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Symptom,
    Cause,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Symptom => write!(f, "symptom"),
            IdKind::Cause => write!(f, "cause"),
        }
    }
}

/// Malformed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id '{value}' (expected {pattern})")]
pub struct IdError {
    pub kind: IdKind,
    pub value: String,
    pub pattern: &'static str,
}

/// Symptom identifier (`S1`, `S2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SymptomId(String);

impl SymptomId {
    /// Parse and validate a symptom id.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if symptom_re().is_match(s) {
            Ok(SymptomId(s.to_string()))
        } else {
            Err(IdError {
                kind: IdKind::Symptom,
                value: s.to_string(),
                pattern: "S<n>",
            })
        }
    }

    /// Whether the wrapped string matches the `S<n>` format.
    ///
    /// Deserialized ids are not checked until the knowledge base is built.
    pub fn is_well_formed(&self) -> bool {
        symptom_re().is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cause identifier (`C1`, `C2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CauseId(String);

impl CauseId {
    /// Parse and validate a cause id.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if cause_re().is_match(s) {
            Ok(CauseId(s.to_string()))
        } else {
            Err(IdError {
                kind: IdKind::Cause,
                value: s.to_string(),
                pattern: "C<n>",
            })
        }
    }

    /// Whether the wrapped string matches the `C<n>` format.
    pub fn is_well_formed(&self) -> bool {
        cause_re().is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_id_traits {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::parse(s)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

impl_id_traits!(SymptomId);
impl_id_traits!(CauseId);
