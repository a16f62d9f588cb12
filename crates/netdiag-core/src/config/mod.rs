//! Configuration loading for netdiag.
//!
//! This module handles:
//! - Locating the config directory (CLI > env > XDG > defaults)
//! - Loading an optional knowledge.json that replaces the embedded table
//! - Schema version and semantic validation through [`KnowledgeBase::from_spec`]
//! - Config snapshots for the `check` command

use crate::knowledge::{KnowledgeBase, KnowledgeError, KnowledgeSpec};
use netdiag_common::SCHEMA_VERSION;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable naming the config directory.
pub const CONFIG_DIR_ENV: &str = "NETDIAG_CONFIG";

/// Default XDG config directory name.
const CONFIG_DIR_NAME: &str = "netdiag";

/// Knowledge file looked up inside the config directory.
pub const KNOWLEDGE_FILE_NAME: &str = "knowledge.json";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid knowledge base: {0}")]
    Knowledge(#[from] KnowledgeError),
}

impl From<ConfigError> for netdiag_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { .. } => netdiag_common::Error::Config(err.to_string()),
            ConfigError::ParseError { .. } => {
                netdiag_common::Error::InvalidKnowledge(err.to_string())
            }
            ConfigError::IoError { source, .. } => netdiag_common::Error::Io(source),
            ConfigError::Knowledge(e) => e.into(),
        }
    }
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated knowledge base.
    pub knowledge: Arc<KnowledgeBase>,
    /// Path to the knowledge file (None if using the built-in table).
    pub knowledge_path: Option<PathBuf>,
    /// SHA-256 hex digest of the knowledge file (None if using the built-in table).
    pub knowledge_hash: Option<String>,
    /// The config directory used for resolution.
    pub config_dir: PathBuf,
}

impl ResolvedConfig {
    /// Create a config snapshot for reporting.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            knowledge_path: self.knowledge_path.clone(),
            knowledge_hash: self.knowledge_hash.clone(),
            schema_version: SCHEMA_VERSION.to_string(),
            config_dir: self.config_dir.clone(),
            builtin: self.knowledge_path.is_none(),
            symptom_count: self.knowledge.symptoms().len(),
            cause_count: self.knowledge.causes().len(),
            rule_count: self.knowledge.rules().len(),
        }
    }
}

/// Config snapshot for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    pub knowledge_path: Option<PathBuf>,
    pub knowledge_hash: Option<String>,
    pub schema_version: String,
    pub config_dir: PathBuf,
    pub builtin: bool,
    pub symptom_count: usize,
    pub cause_count: usize,
    pub rule_count: usize,
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit config directory (highest priority).
    pub config_dir: Option<PathBuf>,
    /// Explicit knowledge file path.
    pub knowledge_path: Option<PathBuf>,
}

/// Load configuration with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit CLI flags (via ConfigOptions)
/// 2. Environment variable (NETDIAG_CONFIG)
/// 3. XDG config home (~/.config/netdiag/)
/// 4. Built-in knowledge base
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let config_dir = resolve_config_dir(options);

    let (knowledge, knowledge_path, knowledge_hash) =
        load_knowledge(&config_dir, options.knowledge_path.as_deref())?;

    match &knowledge_path {
        Some(path) => tracing::info!(
            target: "config.loaded",
            path = %path.display(),
            symptoms = knowledge.symptoms().len(),
            causes = knowledge.causes().len(),
            "loaded knowledge file"
        ),
        None => tracing::debug!(
            target: "config.default_used",
            config_dir = %config_dir.display(),
            "using built-in knowledge base"
        ),
    }

    Ok(ResolvedConfig {
        knowledge,
        knowledge_path,
        knowledge_hash,
        config_dir,
    })
}

/// Resolve the config directory using the standard resolution order.
fn resolve_config_dir(options: &ConfigOptions) -> PathBuf {
    if let Some(dir) = &options.config_dir {
        return dir.clone();
    }

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
    xdg_config.join(CONFIG_DIR_NAME)
}

type LoadedKnowledge = (Arc<KnowledgeBase>, Option<PathBuf>, Option<String>);

fn load_knowledge(
    config_dir: &Path,
    explicit_path: Option<&Path>,
) -> Result<LoadedKnowledge, ConfigError> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let (kb, hash) = load_knowledge_from_file(path)?;
        return Ok((kb, Some(path.to_path_buf()), Some(hash)));
    }

    let default_path = config_dir.join(KNOWLEDGE_FILE_NAME);
    if default_path.exists() {
        let (kb, hash) = load_knowledge_from_file(&default_path)?;
        return Ok((kb, Some(default_path), Some(hash)));
    }

    Ok((KnowledgeBase::builtin()?, None, None))
}

/// Load and validate a knowledge file.
pub fn load_knowledge_from_file(path: &Path) -> Result<(Arc<KnowledgeBase>, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let hash = compute_hash(&content);
    let spec: KnowledgeSpec =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    let kb = KnowledgeBase::from_spec(spec)?;
    Ok((Arc::new(kb), hash))
}

/// SHA-256 hex digest of file content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
