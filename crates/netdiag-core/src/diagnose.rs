//! Diagnostic service: observation filtering, inference and recommendations
//! in one call.

use crate::inference::{
    compute_posterior, InferenceError, ObservationSet, PosteriorEntry, PosteriorResult,
};
use crate::knowledge::{KnowledgeBase, KnowledgeError};
use crate::recommend::recommend;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of one diagnostic run.
///
/// Depends only on the valid observed symptoms: unknown and repeated ids
/// leave it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticResult {
    pub most_probable_cause: PosteriorEntry,
    /// All causes, descending probability, ties in catalog order.
    pub ranked_causes: Vec<PosteriorEntry>,
    /// Unique action strings, symptom hints first.
    pub recommendations: Vec<String>,
}

/// A diagnosis together with how the input was filtered and the posterior
/// evidence ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedDiagnosis {
    pub result: DiagnosticResult,
    /// Observed symptoms that were used, in first-occurrence order.
    pub observed_symptoms: Vec<String>,
    /// Supplied ids that are not in the symptom catalog.
    pub ignored_symptoms: Vec<String>,
    pub posterior: PosteriorResult,
}

/// Stateless front door over a shared knowledge base.
#[derive(Debug, Clone)]
pub struct DiagnosticService {
    kb: Arc<KnowledgeBase>,
}

impl DiagnosticService {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Service over the embedded knowledge base.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        KnowledgeBase::builtin().map(Self::new)
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Diagnose from raw symptom ids.
    ///
    /// Unknown and repeated ids are dropped. Fails with
    /// [`InferenceError::NoValidSymptoms`] when nothing usable remains.
    pub fn diagnose<S: AsRef<str>>(
        &self,
        observed_ids: &[S],
    ) -> Result<DiagnosticResult, InferenceError> {
        self.diagnose_detailed(observed_ids).map(|d| d.result)
    }

    /// Like [`Self::diagnose`], also returning the evidence ledger.
    pub fn diagnose_detailed<S: AsRef<str>>(
        &self,
        observed_ids: &[S],
    ) -> Result<DetailedDiagnosis, InferenceError> {
        let observed = ObservationSet::from_ids(&self.kb, observed_ids);
        let posterior = compute_posterior(&self.kb, &observed)?;
        let top = posterior.top().clone();
        let recommendations = recommend(&self.kb, &observed, &top);

        tracing::debug!(
            target: "diagnose.finished",
            cause = %top.cause_id,
            probability = top.probability,
            observed = observed.len(),
            ignored = observed.ignored().len(),
            recommendations = recommendations.len(),
            "diagnosis complete"
        );

        let result = DiagnosticResult {
            most_probable_cause: top,
            ranked_causes: posterior.ranked.clone(),
            recommendations,
        };
        Ok(DetailedDiagnosis {
            result,
            observed_symptoms: posterior.observed.clone(),
            ignored_symptoms: observed.ignored().to_vec(),
            posterior,
        })
    }
}
