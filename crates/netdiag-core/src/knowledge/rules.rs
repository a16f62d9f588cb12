//! IF-THEN troubleshooting rules over free-text facts.
//!
//! Rules are a checklist aid that lives beside the Bayesian model; they never
//! contribute to posterior scores.

use super::spec::KnowledgeRule;
use serde::Serialize;

/// A rule whose conditions were all satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch<'a> {
    /// Position of the rule in the rule catalog.
    pub rule_index: usize,
    pub conclusion: &'a str,
    pub conditions: &'a [String],
}

/// Evaluates a rule catalog against a set of facts.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'a> {
    rules: &'a [KnowledgeRule],
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: &'a [KnowledgeRule]) -> Self {
        Self { rules }
    }

    /// Every rule whose conditions are all among `facts`, in catalog order.
    ///
    /// Facts and conditions are compared trimmed and case-insensitively.
    pub fn evaluate<S: AsRef<str>>(&self, facts: &[S]) -> Vec<RuleMatch<'a>> {
        let facts: Vec<String> = facts.iter().map(|f| canonical(f.as_ref())).collect();
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| {
                rule.conditions
                    .iter()
                    .all(|c| facts.iter().any(|f| *f == canonical(c)))
            })
            .map(|(rule_index, rule)| RuleMatch {
                rule_index,
                conclusion: &rule.conclusion,
                conditions: &rule.conditions,
            })
            .collect()
    }
}

fn canonical(text: &str) -> String {
    text.trim().to_lowercase()
}
