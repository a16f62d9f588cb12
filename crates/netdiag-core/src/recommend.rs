//! Recommendation generation.
//!
//! Symptom hints come first, in observation order, followed by the
//! remediation steps of the top-ranked cause. Duplicates are dropped with
//! the first occurrence kept, so display order is stable.

use crate::inference::{ObservationSet, PosteriorEntry};
use crate::knowledge::KnowledgeBase;
use std::collections::HashSet;

/// Ordered, de-duplicated action list for an observation set and its top cause.
pub fn recommend(
    kb: &KnowledgeBase,
    observed: &ObservationSet,
    top_cause: &PosteriorEntry,
) -> Vec<String> {
    let hints = observed
        .symptoms()
        .iter()
        .filter_map(|s| kb.suggested_action(s.as_str()));
    let steps = kb
        .remediations(top_cause.cause_id.as_str())
        .iter()
        .map(String::as_str);

    let mut seen = HashSet::new();
    hints
        .chain(steps)
        .filter(|action| seen.insert(*action))
        .map(str::to_string)
        .collect()
}
