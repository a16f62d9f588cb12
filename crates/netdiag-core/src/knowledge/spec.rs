//! Knowledge file document types.
//!
//! A [`KnowledgeSpec`] is the serializable description of a knowledge base.
//! It is not trusted: only [`super::KnowledgeBase::from_spec`] turns it into
//! something the engine will read.

use netdiag_common::{CauseId, SymptomId, SCHEMA_VERSION};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How often a symptom shows up in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Low => write!(f, "low"),
            Frequency::Medium => write!(f, "medium"),
            Frequency::High => write!(f, "high"),
        }
    }
}

/// An observable symptom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Symptom {
    pub id: SymptomId,
    pub description: String,
    pub frequency: Frequency,
    /// How much an operator's report of this symptom can be trusted, in [0, 1].
    pub estimated_reliability: f64,
}

/// A candidate root cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Cause {
    pub id: CauseId,
    pub description: String,
    pub prior_probability: f64,
}

/// IF all `conditions` hold THEN `conclusion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeRule {
    pub conditions: Vec<String>,
    pub conclusion: String,
}

/// Complete knowledge file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeSpec {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub symptoms: Vec<Symptom>,

    pub causes: Vec<Cause>,

    /// P(symptom | cause); one row per symptom, columns in cause catalog order.
    pub likelihoods: BTreeMap<SymptomId, Vec<f64>>,

    /// One suggested action per symptom.
    #[serde(default)]
    pub actions: BTreeMap<SymptomId, String>,

    /// Ordered remediation steps per cause.
    #[serde(default)]
    pub remediations: BTreeMap<CauseId, Vec<String>>,

    #[serde(default)]
    pub rules: Vec<KnowledgeRule>,
}

fn sid(s: &str) -> SymptomId {
    SymptomId::parse(s).expect("built-in symptom id is well formed")
}

fn cid(s: &str) -> CauseId {
    CauseId::parse(s).expect("built-in cause id is well formed")
}

fn symptom(id: &str, description: &str, frequency: Frequency, reliability: f64) -> Symptom {
    Symptom {
        id: sid(id),
        description: description.to_string(),
        frequency,
        estimated_reliability: reliability,
    }
}

fn cause(id: &str, description: &str, prior: f64) -> Cause {
    Cause {
        id: cid(id),
        description: description.to_string(),
        prior_probability: prior,
    }
}

fn rule(conditions: &[&str], conclusion: &str) -> KnowledgeRule {
    KnowledgeRule {
        conditions: conditions.iter().map(|c| c.to_string()).collect(),
        conclusion: conclusion.to_string(),
    }
}

impl KnowledgeSpec {
    /// The embedded Datatech SRL office-network table.
    ///
    /// Strings are kept exactly as existing callers expect them.
    pub fn builtin() -> Self {
        let symptoms = vec![
            symptom("S1", "Pérdida de paquetes al hacer ping", Frequency::High, 0.90),
            symptom("S2", "Tiempo de respuesta inconsistente", Frequency::Medium, 0.85),
            symptom("S3", "Errores relacionados con DNS", Frequency::Medium, 0.70),
            symptom("S4", "Señal Wi-Fi débil en oficina alejada", Frequency::High, 0.95),
            symptom("S5", "Conector de red dañado", Frequency::Low, 0.90),
        ];

        let causes = vec![
            cause("C1", "Falla en el router", 0.30),
            cause("C2", "Interferencia o señal Wi-Fi débil", 0.25),
            cause("C3", "Problemas con el proveedor (ISP)", 0.20),
            cause("C4", "Problemas físicos en el cableado", 0.15),
            cause("C5", "Mal funcionamiento del DNS local", 0.10),
        ];

        let likelihoods = BTreeMap::from([
            (sid("S1"), vec![0.80, 0.40, 0.70, 0.60, 0.20]),
            (sid("S2"), vec![0.75, 0.30, 0.80, 0.40, 0.25]),
            (sid("S3"), vec![0.30, 0.20, 0.60, 0.10, 0.90]),
            (sid("S4"), vec![0.40, 0.95, 0.30, 0.20, 0.10]),
            (sid("S5"), vec![0.20, 0.10, 0.15, 0.90, 0.05]),
        ]);

        let actions = BTreeMap::from([
            (sid("S1"), "Reiniciar router, verificar cableado".to_string()),
            (sid("S2"), "Evaluar router y carga de red".to_string()),
            (sid("S3"), "Verificar DNS interno, cambiar a externo".to_string()),
            (sid("S4"), "Colocar repetidor o cambiar canal Wi-Fi".to_string()),
            (sid("S5"), "Reemplazar cable".to_string()),
        ]);

        let remediations = BTreeMap::from([
            (
                cid("C1"),
                vec![
                    "Verificar estado del router y reiniciarlo".to_string(),
                    "Comprobar configuración del router".to_string(),
                ],
            ),
            (
                cid("C2"),
                vec![
                    "Instalar repetidor Wi-Fi".to_string(),
                    "Cambiar canal de Wi-Fi para evitar interferencias".to_string(),
                ],
            ),
            (
                cid("C3"),
                vec![
                    "Contactar al proveedor de servicios (ISP)".to_string(),
                    "Verificar estado del servicio en la zona".to_string(),
                ],
            ),
            (
                cid("C4"),
                vec![
                    "Inspeccionar físicamente todos los cables de red".to_string(),
                    "Reemplazar cables dañados o defectuosos".to_string(),
                ],
            ),
            (
                cid("C5"),
                vec![
                    "Configurar DNS alternativos (8.8.8.8, 1.1.1.1)".to_string(),
                    "Verificar configuración de DNS en el router".to_string(),
                ],
            ),
        ]);

        let rules = vec![
            rule(&["no hay conexión", "router está apagado"], "Encender el router"),
            rule(
                &["no hay conexión", "router encendido", "ping falla"],
                "Revisar cable de red",
            ),
            rule(&["no hay conexión", "ping funciona"], "Verificar configuración IP"),
            rule(
                &["navegación lenta", "muchos dispositivos"],
                "Reducir uso de red simultáneo",
            ),
            rule(
                &["navegación lenta", "pocos dispositivos", "velocidad baja"],
                "Contactar ISP",
            ),
            rule(
                &["señal Wi-Fi débil"],
                "Acercar equipo al router o cambiar canal Wi-Fi",
            ),
            rule(&["conexión intermitente", "IP dinámica"], "Revisar servidor DHCP"),
            rule(
                &["conexión intermitente", "switch/router muestra errores"],
                "Reiniciar equipo de red",
            ),
            rule(&["no se puede imprimir", "impresora apagada"], "Encender impresora"),
            rule(&["impresora encendida", "IP mal configurada"], "Asignar IP correcta"),
            rule(
                &["ping a impresora falla", "impresora encendida"],
                "Revisar red de impresora",
            ),
            rule(&["todos los equipos sin conexión"], "Revisar WAN o cableado troncal"),
        ];

        KnowledgeSpec {
            schema_version: SCHEMA_VERSION.to_string(),
            description: Some("Datatech SRL office network diagnosis".to_string()),
            symptoms,
            causes,
            likelihoods,
            actions,
            remediations,
            rules,
        }
    }
}
