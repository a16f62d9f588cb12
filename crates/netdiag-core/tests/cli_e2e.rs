//! End-to-end tests for the netdiag binary.
//!
//! Every invocation points NETDIAG_CONFIG at a fresh temp directory so the
//! developer's own configuration never leaks into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the netdiag binary with an isolated config directory.
fn netdiag(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("netdiag").expect("netdiag binary should exist");
    cmd.env("NETDIAG_CONFIG", config_dir)
        .env_remove("NETDIAG_LOG")
        .env_remove("NETDIAG_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn write_knowledge(dir: &Path, edit: impl FnOnce(&mut Value)) {
    let mut spec = serde_json::to_value(netdiag_core::KnowledgeSpec::builtin()).unwrap();
    edit(&mut spec);
    std::fs::write(
        dir.join("knowledge.json"),
        serde_json::to_string_pretty(&spec).unwrap(),
    )
    .unwrap();
}

// ============================================================================
// diagnose
// ============================================================================

mod diagnose {
    use super::*;

    #[test]
    fn json_envelope_carries_result() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["diagnose", "S1", "S2"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(0));

        let json = stdout_json(&output);
        assert_eq!(json["schema_version"], "1.0.0");
        assert_eq!(json["command"], "diagnose");
        assert!(json["run_id"].as_str().unwrap().starts_with("run-"));
        assert!(json["generated_at"].is_string());

        let data = &json["data"];
        assert_eq!(data["most_probable_cause"]["cause_id"], "C1");
        assert_eq!(data["ranked_causes"].as_array().unwrap().len(), 5);
        assert_eq!(data["observed_symptoms"], serde_json::json!(["S1", "S2"]));
        assert!(data.get("evidence").is_none());
    }

    #[test]
    fn comma_separated_ids_are_accepted() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["diagnose", "S1, S2"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(0));
        let json = stdout_json(&output);
        assert_eq!(json["data"]["observed_symptoms"], serde_json::json!(["S1", "S2"]));
    }

    #[test]
    fn explain_adds_evidence_ledger() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["diagnose", "--explain", "S4", "S1"])
            .output()
            .unwrap();
        let json = stdout_json(&output);
        let terms = json["data"]["evidence"]["evidence_terms"].as_array().unwrap();
        let features: Vec<&str> = terms.iter().map(|t| t["feature"].as_str().unwrap()).collect();
        assert_eq!(features, ["prior", "S4", "S1"]);
    }

    #[test]
    fn markdown_shows_percentages() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["-f", "md", "diagnose", "S4"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Interferencia o señal Wi-Fi débil (C2)"))
            .stdout(predicate::str::contains("51.91%"))
            .stdout(predicate::str::contains("## Recommendations"));
    }

    #[test]
    fn summary_is_single_line() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["--format", "summary", "diagnose", "S5", "S9"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("C4 "))
            .stdout(predicate::str::contains("ignored: S9"));
    }

    #[test]
    fn exitcode_format_prints_nothing() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["-f", "exitcode", "diagnose", "S3"])
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn no_valid_symptoms_exits_one_with_error_payload() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["diagnose", "S9", "X1"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let json = stdout_json(&output);
        assert_eq!(json["data"]["error"]["code"], 30);
        assert_eq!(json["data"]["exit_code"], 1);
        assert_eq!(json["data"]["exit_code_name"], "OK_NO_SYMPTOMS");
    }

    #[test]
    fn no_valid_symptoms_human_message_on_stderr() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["--no-color", "-f", "md", "diagnose", "S9"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Reason:"))
            .stderr(predicate::str::contains("Fix:"));
    }

    #[test]
    fn degenerate_table_exits_with_model_error() {
        let dir = TempDir::new().unwrap();
        write_knowledge(dir.path(), |spec| {
            spec["likelihoods"]["S5"] = serde_json::json!([0.0, 0.0, 0.0, 0.0, 0.0]);
        });
        let output = netdiag(dir.path())
            .args(["diagnose", "S5"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(22));
        assert_eq!(stdout_json(&output)["data"]["error"]["code"], 31);
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["--log-format", "jsonl", "-v", "diagnose", "S1"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(0));

        // stdout stays a single JSON document
        stdout_json(&output);

        let stderr = String::from_utf8(output.stderr).unwrap();
        let line = stderr
            .lines()
            .find(|l| l.contains("\"event\":\"infer.finished\""))
            .expect("infer.finished event");
        let event: Value = serde_json::from_str(line).unwrap();
        assert!(event["run_id"].as_str().unwrap().starts_with("run-"));
        assert_eq!(event["stage"], "infer");
        assert_eq!(event["fields"]["cause"], "C1");
    }

    #[test]
    fn default_level_keeps_stderr_quiet() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["diagnose", "S1"])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }
}

// ============================================================================
// Argument errors
// ============================================================================

mod args {
    use super::*;

    #[test]
    fn diagnose_requires_ids() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .arg("diagnose")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_command_is_args_error() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .arg("nonexistent-command")
            .assert()
            .code(10);
    }

    #[test]
    fn invalid_format_is_args_error() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["-f", "xml", "diagnose", "S1"])
            .assert()
            .code(10);
    }

    #[test]
    fn help_exits_clean() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("diagnose"));
    }

    #[test]
    fn unknown_schema_name_is_args_error() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["schema", "Nope"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Unknown schema type"));
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn check_reports_builtin_snapshot() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path()).arg("check").output().unwrap();
        assert_eq!(output.status.code(), Some(0));

        let data = &stdout_json(&output)["data"];
        assert_eq!(data["builtin"], true);
        assert_eq!(data["symptom_count"], 5);
        assert_eq!(data["cause_count"], 5);
        assert_eq!(data["rule_count"], 12);
        assert!(data["knowledge_hash"].is_null());
    }

    #[test]
    fn custom_knowledge_file_is_used() {
        let dir = TempDir::new().unwrap();
        write_knowledge(dir.path(), |spec| {
            spec["description"] = serde_json::json!("sucursal norte");
        });

        let output = netdiag(dir.path()).arg("check").output().unwrap();
        assert_eq!(output.status.code(), Some(0));
        let data = &stdout_json(&output)["data"];
        assert_eq!(data["builtin"], false);
        assert_eq!(data["knowledge_hash"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn bad_schema_version_is_config_error() {
        let dir = TempDir::new().unwrap();
        write_knowledge(dir.path(), |spec| {
            spec["schema_version"] = serde_json::json!("9.9.9");
        });
        netdiag(dir.path())
            .args(["-f", "md", "diagnose", "S1"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("9.9.9"));
    }

    #[test]
    fn invalid_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("knowledge.json"), "{ not json").unwrap();
        let output = netdiag(dir.path()).arg("check").output().unwrap();
        assert_eq!(output.status.code(), Some(11));
        assert_eq!(stdout_json(&output)["data"]["exit_code_name"], "ERR_CONFIG");
    }

    #[test]
    fn missing_explicit_knowledge_is_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        netdiag(dir.path())
            .args(["--knowledge", missing.to_str().unwrap(), "check"])
            .assert()
            .code(11);
    }

    #[test]
    fn priors_not_summing_to_one_are_rejected() {
        let dir = TempDir::new().unwrap();
        write_knowledge(dir.path(), |spec| {
            spec["causes"][0]["prior_probability"] = serde_json::json!(0.5);
        });
        netdiag(dir.path()).arg("check").assert().code(11);
    }
}

// ============================================================================
// Catalogs, rules, scenarios, schema, version
// ============================================================================

mod catalog {
    use super::*;

    #[test]
    fn symptoms_summary_lists_catalog() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["-f", "summary", "symptoms"])
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.lines().count(), 5);
        assert!(stdout.starts_with("S1 Pérdida de paquetes"));
    }

    #[test]
    fn causes_json_includes_remediations() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path()).arg("causes").output().unwrap();
        let data = &stdout_json(&output)["data"];
        assert_eq!(data[1]["id"], "C2");
        assert_eq!(data[1]["remediations"][0], "Instalar repetidor Wi-Fi");
    }

    #[test]
    fn rules_match_facts() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path())
            .args(["rules", "--fact", "  Señal Wi-Fi débil "])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(0));
        let matches = stdout_json(&output)["data"]["matches"].as_array().unwrap().clone();
        assert!(!matches.is_empty());
    }

    #[test]
    fn scenarios_run_all_reference_cases() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path()).arg("scenarios").output().unwrap();
        assert_eq!(output.status.code(), Some(0));
        let data = stdout_json(&output)["data"].as_array().unwrap().clone();
        assert_eq!(data.len(), 5);
        assert_eq!(data[3]["scenario"]["name"], "cabling");
        assert_eq!(data[3]["result"]["most_probable_cause"]["cause_id"], "C4");
    }

    #[test]
    fn schema_list_and_default() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["schema", "--list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("DiagnosticResult"))
            .stdout(predicate::str::contains("KnowledgeSpec"));

        let output = netdiag(dir.path()).arg("schema").output().unwrap();
        let schema = stdout_json(&output);
        assert!(schema["properties"]["ranked_causes"].is_object());
    }

    #[test]
    fn version_reports_schema() {
        let dir = TempDir::new().unwrap();
        let output = netdiag(dir.path()).arg("version").output().unwrap();
        let json = stdout_json(&output);
        assert_eq!(json["schema_version"], "1.0.0");
        assert!(json["netdiag_version"].is_string());
    }

    #[test]
    fn completions_generate_for_bash() {
        let dir = TempDir::new().unwrap();
        netdiag(dir.path())
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("netdiag"));
    }
}
