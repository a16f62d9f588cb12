//! Validated, immutable knowledge base.
//!
//! Every consistency rule is checked once in [`KnowledgeBase::from_spec`];
//! afterwards the base only answers read queries. Catalog positions are
//! resolved through id maps built at construction.

use super::rules::{RuleEngine, RuleMatch};
use super::spec::{Cause, KnowledgeRule, KnowledgeSpec, Symptom};
use netdiag_common::{CauseId, IdError, IdKind, SymptomId, SCHEMA_VERSION};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Tolerance for the prior-sum check.
const PRIOR_SUM_TOLERANCE: f64 = 1e-6;

static BUILTIN: OnceLock<Result<Arc<KnowledgeBase>, KnowledgeError>> = OnceLock::new();

/// Knowledge base construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnowledgeError {
    #[error("schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersion { expected: String, actual: String },

    #[error("{kind} catalog is empty")]
    EmptyCatalog { kind: IdKind },

    #[error(transparent)]
    InvalidId(#[from] IdError),

    #[error("duplicate symptom id {id}")]
    DuplicateSymptom { id: String },

    #[error("duplicate cause id {id}")]
    DuplicateCause { id: String },

    #[error("unknown symptom: {id}")]
    UnknownSymptom { id: String },

    #[error("unknown cause: {id}")]
    UnknownCause { id: String },

    #[error("symptom {symptom} has no likelihood row")]
    MissingRow { symptom: String },

    #[error("likelihood row for {symptom} has {actual} entries, expected {expected}")]
    RowLength {
        symptom: String,
        expected: usize,
        actual: usize,
    },

    #[error("{field} must be in [0, 1] (got {value})")]
    ProbabilityRange { field: String, value: f64 },

    #[error("prior probability for {cause} must be non-negative (got {value})")]
    PriorNegative { cause: String, value: f64 },

    #[error("cause prior probabilities must sum to 1.0 (got {sum:.6})")]
    PriorSum { sum: f64 },

    #[error("rule {index} must have at least one condition and a conclusion")]
    InvalidRule { index: usize },
}

impl From<KnowledgeError> for netdiag_common::Error {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::SchemaVersion { expected, actual } => {
                netdiag_common::Error::SchemaVersion { expected, actual }
            }
            KnowledgeError::UnknownSymptom { id } => netdiag_common::Error::UnknownSymptom { id },
            KnowledgeError::UnknownCause { id } => netdiag_common::Error::UnknownCause { id },
            other => netdiag_common::Error::InvalidKnowledge(other.to_string()),
        }
    }
}

/// Immutable probabilistic model: catalogs, likelihood table and lookups.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    description: Option<String>,
    symptoms: Vec<Symptom>,
    causes: Vec<Cause>,
    symptom_index: HashMap<SymptomId, usize>,
    cause_index: HashMap<CauseId, usize>,
    /// `likelihoods[symptom_pos][cause_pos]`.
    likelihoods: Vec<Vec<f64>>,
    actions: Vec<Option<String>>,
    remediations: Vec<Vec<String>>,
    rules: Vec<KnowledgeRule>,
}

impl KnowledgeBase {
    /// Validate a knowledge document and build the lookup structures.
    pub fn from_spec(spec: KnowledgeSpec) -> Result<Self, KnowledgeError> {
        if spec.schema_version != SCHEMA_VERSION {
            return Err(KnowledgeError::SchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: spec.schema_version,
            });
        }
        if spec.symptoms.is_empty() {
            return Err(KnowledgeError::EmptyCatalog {
                kind: IdKind::Symptom,
            });
        }
        if spec.causes.is_empty() {
            return Err(KnowledgeError::EmptyCatalog {
                kind: IdKind::Cause,
            });
        }

        let symptom_index = index_symptoms(&spec.symptoms)?;
        let cause_index = index_causes(&spec.causes)?;
        validate_causes(&spec.causes)?;

        let likelihoods = order_likelihoods(&spec, &symptom_index)?;
        let actions = order_actions(spec.actions, &spec.symptoms, &symptom_index)?;
        let remediations = order_remediations(spec.remediations, &spec.causes, &cause_index)?;

        for (index, rule) in spec.rules.iter().enumerate() {
            if rule.conditions.is_empty()
                || rule.conditions.iter().any(|c| c.trim().is_empty())
                || rule.conclusion.trim().is_empty()
            {
                return Err(KnowledgeError::InvalidRule { index });
            }
        }

        Ok(KnowledgeBase {
            description: spec.description,
            symptoms: spec.symptoms,
            causes: spec.causes,
            symptom_index,
            cause_index,
            likelihoods,
            actions,
            remediations,
            rules: spec.rules,
        })
    }

    /// Process-wide shared instance of the embedded table.
    ///
    /// Built and validated on first use; later calls return the same `Arc`.
    pub fn builtin() -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        BUILTIN
            .get_or_init(|| KnowledgeBase::from_spec(KnowledgeSpec::builtin()).map(Arc::new))
            .clone()
    }

    /// Convert back into a serializable document.
    pub fn to_spec(&self) -> KnowledgeSpec {
        let likelihoods = self
            .symptoms
            .iter()
            .zip(&self.likelihoods)
            .map(|(s, row)| (s.id.clone(), row.clone()))
            .collect();
        let actions = self
            .symptoms
            .iter()
            .zip(&self.actions)
            .filter_map(|(s, a)| a.as_ref().map(|a| (s.id.clone(), a.clone())))
            .collect();
        let remediations = self
            .causes
            .iter()
            .zip(&self.remediations)
            .filter(|(_, steps)| !steps.is_empty())
            .map(|(c, steps)| (c.id.clone(), steps.clone()))
            .collect();

        KnowledgeSpec {
            schema_version: SCHEMA_VERSION.to_string(),
            description: self.description.clone(),
            symptoms: self.symptoms.clone(),
            causes: self.causes.clone(),
            likelihoods,
            actions,
            remediations,
            rules: self.rules.clone(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Symptom catalog, in catalog order.
    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    /// Cause catalog, in catalog order.
    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn rules(&self) -> &[KnowledgeRule] {
        &self.rules
    }

    pub fn symptom(&self, id: &str) -> Option<&Symptom> {
        self.symptom_position(id).map(|pos| &self.symptoms[pos])
    }

    pub fn cause(&self, id: &str) -> Option<&Cause> {
        self.cause_position(id).map(|pos| &self.causes[pos])
    }

    /// Catalog position of a symptom id.
    pub fn symptom_position(&self, id: &str) -> Option<usize> {
        self.symptom_index.get(id).copied()
    }

    /// Catalog position of a cause id.
    pub fn cause_position(&self, id: &str) -> Option<usize> {
        self.cause_index.get(id).copied()
    }

    /// P(symptom | cause).
    pub fn likelihood(&self, symptom_id: &str, cause_id: &str) -> Result<f64, KnowledgeError> {
        let s = self
            .symptom_position(symptom_id)
            .ok_or_else(|| KnowledgeError::UnknownSymptom {
                id: symptom_id.to_string(),
            })?;
        let c = self
            .cause_position(cause_id)
            .ok_or_else(|| KnowledgeError::UnknownCause {
                id: cause_id.to_string(),
            })?;
        Ok(self.likelihoods[s][c])
    }

    /// Likelihood row for a symptom position, in cause catalog order.
    pub(crate) fn likelihood_row(&self, symptom_pos: usize) -> &[f64] {
        &self.likelihoods[symptom_pos]
    }

    /// Suggested action for a symptom; `None` when no hint is available.
    pub fn suggested_action(&self, symptom_id: &str) -> Option<&str> {
        self.symptom_position(symptom_id)
            .and_then(|pos| self.actions[pos].as_deref())
    }

    /// Ordered remediation steps for a cause; empty when none are known.
    pub fn remediations(&self, cause_id: &str) -> &[String] {
        self.cause_position(cause_id)
            .map(|pos| self.remediations[pos].as_slice())
            .unwrap_or(&[])
    }

    /// Rules whose conditions are all among `facts`.
    pub fn matching_rules<S: AsRef<str>>(&self, facts: &[S]) -> Vec<RuleMatch<'_>> {
        RuleEngine::new(&self.rules).evaluate(facts)
    }
}

fn index_symptoms(symptoms: &[Symptom]) -> Result<HashMap<SymptomId, usize>, KnowledgeError> {
    let mut index = HashMap::with_capacity(symptoms.len());
    for (pos, symptom) in symptoms.iter().enumerate() {
        if !symptom.id.is_well_formed() {
            SymptomId::parse(symptom.id.as_str())?;
        }
        check_unit_interval(
            &format!("symptoms.{}.estimated_reliability", symptom.id),
            symptom.estimated_reliability,
        )?;
        if index.insert(symptom.id.clone(), pos).is_some() {
            return Err(KnowledgeError::DuplicateSymptom {
                id: symptom.id.to_string(),
            });
        }
    }
    Ok(index)
}

fn index_causes(causes: &[Cause]) -> Result<HashMap<CauseId, usize>, KnowledgeError> {
    let mut index = HashMap::with_capacity(causes.len());
    for (pos, cause) in causes.iter().enumerate() {
        if !cause.id.is_well_formed() {
            CauseId::parse(cause.id.as_str())?;
        }
        if index.insert(cause.id.clone(), pos).is_some() {
            return Err(KnowledgeError::DuplicateCause {
                id: cause.id.to_string(),
            });
        }
    }
    Ok(index)
}

fn validate_causes(causes: &[Cause]) -> Result<(), KnowledgeError> {
    for cause in causes {
        let value = cause.prior_probability;
        if value.is_nan() || value < 0.0 {
            return Err(KnowledgeError::PriorNegative {
                cause: cause.id.to_string(),
                value,
            });
        }
        check_unit_interval(&format!("causes.{}.prior_probability", cause.id), value)?;
    }
    let sum: f64 = causes.iter().map(|c| c.prior_probability).sum();
    if (sum - 1.0).abs() > PRIOR_SUM_TOLERANCE {
        return Err(KnowledgeError::PriorSum { sum });
    }
    Ok(())
}

fn order_likelihoods(
    spec: &KnowledgeSpec,
    symptom_index: &HashMap<SymptomId, usize>,
) -> Result<Vec<Vec<f64>>, KnowledgeError> {
    if let Some(unknown) = spec
        .likelihoods
        .keys()
        .find(|id| !symptom_index.contains_key(*id))
    {
        return Err(KnowledgeError::UnknownSymptom {
            id: unknown.to_string(),
        });
    }

    let expected = spec.causes.len();
    let mut rows = Vec::with_capacity(spec.symptoms.len());
    for symptom in &spec.symptoms {
        let row = spec
            .likelihoods
            .get(&symptom.id)
            .ok_or_else(|| KnowledgeError::MissingRow {
                symptom: symptom.id.to_string(),
            })?;
        if row.len() != expected {
            return Err(KnowledgeError::RowLength {
                symptom: symptom.id.to_string(),
                expected,
                actual: row.len(),
            });
        }
        for (col, value) in row.iter().enumerate() {
            check_unit_interval(&format!("likelihoods.{}[{}]", symptom.id, col), *value)?;
        }
        rows.push(row.clone());
    }
    Ok(rows)
}

fn order_actions(
    mut actions: BTreeMap<SymptomId, String>,
    symptoms: &[Symptom],
    symptom_index: &HashMap<SymptomId, usize>,
) -> Result<Vec<Option<String>>, KnowledgeError> {
    if let Some(unknown) = actions.keys().find(|id| !symptom_index.contains_key(*id)) {
        return Err(KnowledgeError::UnknownSymptom {
            id: unknown.to_string(),
        });
    }
    Ok(symptoms.iter().map(|s| actions.remove(&s.id)).collect())
}

fn order_remediations(
    mut remediations: BTreeMap<CauseId, Vec<String>>,
    causes: &[Cause],
    cause_index: &HashMap<CauseId, usize>,
) -> Result<Vec<Vec<String>>, KnowledgeError> {
    if let Some(unknown) = remediations.keys().find(|id| !cause_index.contains_key(*id)) {
        return Err(KnowledgeError::UnknownCause {
            id: unknown.to_string(),
        });
    }
    Ok(causes
        .iter()
        .map(|c| remediations.remove(&c.id).unwrap_or_default())
        .collect())
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), KnowledgeError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(KnowledgeError::ProbabilityRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::spec::Frequency;

    fn builtin() -> KnowledgeBase {
        KnowledgeBase::from_spec(KnowledgeSpec::builtin()).expect("builtin validates")
    }

    fn sid(s: &str) -> SymptomId {
        SymptomId::parse(s).unwrap()
    }

    fn cid(s: &str) -> CauseId {
        CauseId::parse(s).unwrap()
    }

    #[test]
    fn builtin_loads_with_catalog_order() {
        let kb = builtin();
        let symptom_ids: Vec<&str> = kb.symptoms().iter().map(|s| s.id.as_str()).collect();
        let cause_ids: Vec<&str> = kb.causes().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(symptom_ids, ["S1", "S2", "S3", "S4", "S5"]);
        assert_eq!(cause_ids, ["C1", "C2", "C3", "C4", "C5"]);
    }

    #[test]
    fn builtin_shared_instance_is_reused() {
        let a = KnowledgeBase::builtin().unwrap();
        let b = KnowledgeBase::builtin().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn builtin_catalog_attributes() {
        let kb = builtin();
        let s4 = kb.symptom("S4").unwrap();
        assert_eq!(s4.frequency, Frequency::High);
        assert_eq!(s4.estimated_reliability, 0.95);
        assert_eq!(kb.symptom("S5").unwrap().frequency, Frequency::Low);
        assert_eq!(kb.cause("C3").unwrap().prior_probability, 0.20);
        assert_eq!(kb.cause("C1").unwrap().description, "Falla en el router");
    }

    #[test]
    fn likelihood_lookup() {
        let kb = builtin();
        assert_eq!(kb.likelihood("S1", "C1").unwrap(), 0.80);
        assert_eq!(kb.likelihood("S3", "C5").unwrap(), 0.90);
        assert_eq!(kb.likelihood("S4", "C2").unwrap(), 0.95);
        assert_eq!(kb.likelihood("S5", "C5").unwrap(), 0.05);
    }

    #[test]
    fn likelihood_unknown_ids() {
        let kb = builtin();
        assert_eq!(
            kb.likelihood("S9", "C1").unwrap_err(),
            KnowledgeError::UnknownSymptom { id: "S9".into() }
        );
        assert_eq!(
            kb.likelihood("S1", "C9").unwrap_err(),
            KnowledgeError::UnknownCause { id: "C9".into() }
        );
    }

    #[test]
    fn suggested_action_and_missing_hint() {
        let kb = builtin();
        assert_eq!(kb.suggested_action("S5"), Some("Reemplazar cable"));
        assert_eq!(kb.suggested_action("S42"), None);
    }

    #[test]
    fn remediations_lookup_and_unknown_is_empty() {
        let kb = builtin();
        assert_eq!(
            kb.remediations("C2"),
            ["Instalar repetidor Wi-Fi", "Cambiar canal de Wi-Fi para evitar interferencias"]
        );
        assert!(kb.remediations("C9").is_empty());
    }

    #[test]
    fn cause_without_remediations_maps_to_empty() {
        let mut spec = KnowledgeSpec::builtin();
        spec.remediations.remove(&cid("C4"));
        let kb = KnowledgeBase::from_spec(spec).unwrap();
        assert!(kb.remediations("C4").is_empty());
        assert_eq!(kb.remediations("C5").len(), 2);
    }

    #[test]
    fn rejects_wrong_schema_version() {
        let mut spec = KnowledgeSpec::builtin();
        spec.schema_version = "0.9.0".into();
        assert!(matches!(
            KnowledgeBase::from_spec(spec),
            Err(KnowledgeError::SchemaVersion { .. })
        ));
    }

    #[test]
    fn rejects_short_row() {
        let mut spec = KnowledgeSpec::builtin();
        spec.likelihoods.insert(sid("S2"), vec![0.5, 0.5]);
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::RowLength {
                symptom: "S2".into(),
                expected: 5,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_missing_row() {
        let mut spec = KnowledgeSpec::builtin();
        spec.likelihoods.remove(&sid("S3"));
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::MissingRow {
                symptom: "S3".into()
            }
        );
    }

    #[test]
    fn rejects_row_for_uncatalogued_symptom() {
        let mut spec = KnowledgeSpec::builtin();
        spec.likelihoods.insert(sid("S6"), vec![0.1; 5]);
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::UnknownSymptom { id: "S6".into() }
        );
    }

    #[test]
    fn rejects_hint_for_uncatalogued_symptom() {
        let mut spec = KnowledgeSpec::builtin();
        spec.actions.insert(sid("S7"), "Revisar".into());
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::UnknownSymptom { id: "S7".into() }
        );
    }

    #[test]
    fn rejects_remediation_for_uncatalogued_cause() {
        let mut spec = KnowledgeSpec::builtin();
        spec.remediations.insert(cid("C8"), vec!["x".into()]);
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::UnknownCause { id: "C8".into() }
        );
    }

    #[test]
    fn rejects_negative_prior() {
        let mut spec = KnowledgeSpec::builtin();
        spec.causes[0].prior_probability = -0.1;
        spec.causes[1].prior_probability = 0.65;
        assert!(matches!(
            KnowledgeBase::from_spec(spec),
            Err(KnowledgeError::PriorNegative { .. })
        ));
    }

    #[test]
    fn rejects_priors_not_summing_to_one() {
        let mut spec = KnowledgeSpec::builtin();
        spec.causes[4].prior_probability = 0.2;
        match KnowledgeBase::from_spec(spec).unwrap_err() {
            KnowledgeError::PriorSum { sum } => assert!((sum - 1.1).abs() < 1e-9),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_likelihood_out_of_range() {
        let mut spec = KnowledgeSpec::builtin();
        spec.likelihoods.insert(sid("S1"), vec![0.8, 1.2, 0.7, 0.6, 0.2]);
        match KnowledgeBase::from_spec(spec).unwrap_err() {
            KnowledgeError::ProbabilityRange { field, value } => {
                assert_eq!(field, "likelihoods.S1[1]");
                assert_eq!(value, 1.2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut spec = KnowledgeSpec::builtin();
        let dup = spec.symptoms[0].clone();
        spec.symptoms.push(dup);
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::DuplicateSymptom { id: "S1".into() }
        );
    }

    #[test]
    fn rejects_malformed_ids_from_documents() {
        let mut json = serde_json::to_value(KnowledgeSpec::builtin()).unwrap();
        json["causes"][0]["id"] = serde_json::json!("router");
        let spec: KnowledgeSpec = serde_json::from_value(json).unwrap();
        assert!(matches!(
            KnowledgeBase::from_spec(spec),
            Err(KnowledgeError::InvalidId(IdError {
                kind: IdKind::Cause,
                ..
            }))
        ));
    }

    #[test]
    fn rejects_empty_catalogs() {
        let mut spec = KnowledgeSpec::builtin();
        spec.causes.clear();
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::EmptyCatalog {
                kind: IdKind::Cause
            }
        );
    }

    #[test]
    fn rejects_rule_without_conditions() {
        let mut spec = KnowledgeSpec::builtin();
        spec.rules.push(KnowledgeRule {
            conditions: vec![],
            conclusion: "Nada".into(),
        });
        let index = spec.rules.len() - 1;
        assert_eq!(
            KnowledgeBase::from_spec(spec).unwrap_err(),
            KnowledgeError::InvalidRule { index }
        );
    }

    #[test]
    fn to_spec_roundtrips_builtin() {
        let kb = builtin();
        assert_eq!(kb.to_spec(), KnowledgeSpec::builtin());
    }

    #[test]
    fn knowledge_error_maps_to_common_error() {
        let err: netdiag_common::Error = KnowledgeError::UnknownCause { id: "C9".into() }.into();
        assert_eq!(err.code(), 21);
        let err: netdiag_common::Error = KnowledgeError::PriorSum { sum: 0.5 }.into();
        assert_eq!(err.code(), 11);
    }
}
