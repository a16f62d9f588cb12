//! Reference cases used to sanity-check a knowledge base.

use crate::diagnose::{DiagnosticResult, DiagnosticService};
use netdiag_common::StructuredError;
use serde::Serialize;

/// A named symptom combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub title: &'static str,
    pub symptoms: &'static [&'static str],
}

/// The five field cases the built-in table was authored against.
pub static REFERENCE_SCENARIOS: [Scenario; 5] = [
    Scenario {
        name: "router",
        title: "Pérdida de paquetes y tiempo de respuesta inconsistente",
        symptoms: &["S1", "S2"],
    },
    Scenario {
        name: "dns",
        title: "Errores de DNS",
        symptoms: &["S3"],
    },
    Scenario {
        name: "wifi",
        title: "Señal Wi-Fi débil",
        symptoms: &["S4"],
    },
    Scenario {
        name: "cabling",
        title: "Conector de red dañado",
        symptoms: &["S5"],
    },
    Scenario {
        name: "multiple",
        title: "Múltiples síntomas (S1, S3, S4)",
        symptoms: &["S1", "S3", "S4"],
    },
];

/// Look up a reference scenario by name.
pub fn find_scenario(name: &str) -> Option<&'static Scenario> {
    REFERENCE_SCENARIOS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

/// Outcome of running one scenario against a knowledge base.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DiagnosticResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StructuredError>,
}

impl ScenarioReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Diagnose every reference scenario, in order.
///
/// A custom knowledge base may not catalogue every symptom; such scenarios
/// carry the error instead of aborting the batch.
pub fn run_scenarios(service: &DiagnosticService) -> Vec<ScenarioReport> {
    REFERENCE_SCENARIOS
        .iter()
        .map(|scenario| match service.diagnose(scenario.symptoms) {
            Ok(result) => ScenarioReport {
                scenario: *scenario,
                result: Some(result),
                error: None,
            },
            Err(err) => {
                let err = netdiag_common::Error::from(err);
                ScenarioReport {
                    scenario: *scenario,
                    result: None,
                    error: Some(StructuredError::from(&err)),
                }
            }
        })
        .collect()
}
