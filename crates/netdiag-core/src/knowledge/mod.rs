//! Symptom/cause knowledge: catalogs, likelihood table, hints and rules.

pub mod base;
pub mod rules;
pub mod spec;

pub use base::{KnowledgeBase, KnowledgeError};
pub use rules::{RuleEngine, RuleMatch};
pub use spec::{Cause, Frequency, KnowledgeRule, KnowledgeSpec, Symptom};
