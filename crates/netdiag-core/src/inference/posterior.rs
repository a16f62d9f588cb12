//! Naive-Bayes posterior P(cause | observed symptoms).
//!
//! Raw scores are `prior(c) * Π likelihood(s, c)` over the observed symptoms,
//! multiplied in symptom catalog order so the supply order of ids never
//! changes a probability. Scores are normalized linearly; a zero or
//! non-finite total is a model error, never a silent NaN. The log-domain
//! ledger is kept alongside for explanation only.

use super::observation::ObservationSet;
use crate::knowledge::{KnowledgeBase, KnowledgeError};
use netdiag_common::CauseId;
use netdiag_math::{ln_prob, log_sum_exp, normalize_probs};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use thiserror::Error;

/// Posteriors are ranked at this many units per 1.0; values closer than one
/// unit are ties and keep catalog order.
const RANK_SCALE: f64 = 1e12;

/// One cause with its posterior probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorEntry {
    pub cause_id: CauseId,
    pub description: String,
    pub probability: f64,
}

/// Log-domain contribution of one factor, per cause in catalog order.
///
/// Zero likelihoods appear as `-inf` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceTerm {
    pub feature: String,
    pub log_likelihood: Vec<f64>,
}

/// Posterior computation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorResult {
    /// Causes ranked by descending probability.
    pub ranked: Vec<PosteriorEntry>,
    /// Column order of every `log_likelihood` vector (cause catalog order).
    pub causes: Vec<CauseId>,
    /// `prior` first, then one term per observed symptom.
    pub evidence_terms: Vec<EvidenceTerm>,
    /// ln Σ raw scores.
    pub log_evidence: f64,
    pub observed: Vec<String>,
}

impl PosteriorResult {
    pub fn top(&self) -> &PosteriorEntry {
        &self.ranked[0]
    }
}

/// Errors raised during posterior computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("cannot diagnose: no valid symptoms were supplied")]
    NoValidSymptoms,

    #[error("degenerate model: every cause scored zero for {observed:?}")]
    DegenerateModel { observed: Vec<String> },

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

impl From<InferenceError> for netdiag_common::Error {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::NoValidSymptoms => netdiag_common::Error::NoValidSymptoms,
            InferenceError::DegenerateModel { observed } => {
                netdiag_common::Error::DegenerateModel { observed }
            }
            InferenceError::Knowledge(e) => e.into(),
        }
    }
}

/// Compute ranked posteriors and the evidence ledger.
pub fn compute_posterior(
    kb: &KnowledgeBase,
    observed: &ObservationSet,
) -> Result<PosteriorResult, InferenceError> {
    if observed.is_empty() {
        return Err(InferenceError::NoValidSymptoms);
    }

    let causes = kb.causes();
    let mut raw: Vec<f64> = causes.iter().map(|c| c.prior_probability).collect();
    let mut log_raw: Vec<f64> = raw.iter().map(|p| ln_prob(*p)).collect();

    let mut evidence_terms = Vec::with_capacity(observed.len() + 1);
    evidence_terms.push(EvidenceTerm {
        feature: "prior".to_string(),
        log_likelihood: log_raw.clone(),
    });

    let mut positions = Vec::with_capacity(observed.len());
    for symptom in observed.symptoms() {
        let pos = kb
            .symptom_position(symptom.as_str())
            .ok_or_else(|| KnowledgeError::UnknownSymptom {
                id: symptom.to_string(),
            })?;
        evidence_terms.push(EvidenceTerm {
            feature: symptom.to_string(),
            log_likelihood: kb.likelihood_row(pos).iter().map(|p| ln_prob(*p)).collect(),
        });
        positions.push(pos);
    }

    positions.sort_unstable();
    for pos in positions {
        for (i, p) in kb.likelihood_row(pos).iter().enumerate() {
            raw[i] *= p;
            log_raw[i] += ln_prob(*p);
        }
    }

    let probs = normalize_probs(&raw).ok_or_else(|| InferenceError::DegenerateModel {
        observed: observed.id_strings(),
    })?;

    let mut order: Vec<usize> = (0..causes.len()).collect();
    order.sort_by_key(|&i| (Reverse(rank_key(probs[i])), i));

    let ranked = order
        .into_iter()
        .map(|i| PosteriorEntry {
            cause_id: causes[i].id.clone(),
            description: causes[i].description.clone(),
            probability: probs[i],
        })
        .collect();

    Ok(PosteriorResult {
        ranked,
        causes: causes.iter().map(|c| c.id.clone()).collect(),
        evidence_terms,
        log_evidence: log_sum_exp(&log_raw),
        observed: observed.id_strings(),
    })
}

fn rank_key(probability: f64) -> u64 {
    (probability * RANK_SCALE).round() as u64
}

/// Ranked posterior entries for an observation set.
pub fn infer(
    kb: &KnowledgeBase,
    observed: &ObservationSet,
) -> Result<Vec<PosteriorEntry>, InferenceError> {
    compute_posterior(kb, observed).map(|r| r.ranked)
}
