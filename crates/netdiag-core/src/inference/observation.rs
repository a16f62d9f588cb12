//! Observed symptom sets for one diagnostic run.

use crate::knowledge::KnowledgeBase;
use netdiag_common::SymptomId;
use serde::Serialize;
use std::collections::HashSet;

/// De-duplicated, catalog-filtered symptom observations.
///
/// Order is the order in which ids were first supplied. Ids that are not in
/// the symptom catalog are kept aside in `ignored` so callers can report
/// them; they never reach the inference engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservationSet {
    symptoms: Vec<SymptomId>,
    ignored: Vec<String>,
}

impl ObservationSet {
    /// Build an observation set from raw caller-supplied ids.
    pub fn from_ids<S: AsRef<str>>(kb: &KnowledgeBase, ids: &[S]) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut symptoms = Vec::new();
        let mut ignored = Vec::new();

        for raw in ids {
            let raw = raw.as_ref();
            if !seen.insert(raw) {
                continue;
            }
            match kb.symptom(raw) {
                Some(symptom) => symptoms.push(symptom.id.clone()),
                None => {
                    tracing::debug!(
                        target: "symptoms.ignored",
                        symptom = raw,
                        "dropping id outside the symptom catalog"
                    );
                    ignored.push(raw.to_string());
                }
            }
        }

        Self { symptoms, ignored }
    }

    /// Valid observed symptoms, first-occurrence order.
    pub fn symptoms(&self) -> &[SymptomId] {
        &self.symptoms
    }

    /// Supplied ids that were not in the catalog, first-occurrence order.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub(crate) fn id_strings(&self) -> Vec<String> {
        self.symptoms.iter().map(|s| s.to_string()).collect()
    }
}
