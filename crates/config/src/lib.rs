//! Configuration loading, validation, and management for Hatchling.
//!
//! Loads configuration from `hatchling.toml` with environment
//! variable overrides. Validates all settings at startup.

use hatchling_core::error::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The root configuration structure.
///
/// Maps directly to `hatchling.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The agent's display name.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Session loop settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Decision source settings.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Live viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Progression persistence settings.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Archival settings.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

fn default_agent_name() -> String {
    "hatchling".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Actions per session.
    #[serde(default = "default_budget")]
    pub budget: u32,
}

fn default_budget() -> u32 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// "ollama" or "scripted".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Ollama-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name requested from the endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// Malformed-output retries before the source gives up.
    #[serde(default = "default_retries")]
    pub retry_budget: u32,
}

fn default_provider() -> String {
    "scripted".into()
}
fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.1".into()
}
fn default_retries() -> u32 {
    3
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            retry_budget: default_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub enabled: bool,

    /// host:port of the live viewer.
    #[serde(default = "default_viewer_addr")]
    pub addr: String,
}

fn default_viewer_addr() -> String {
    "127.0.0.1:9999".into()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_viewer_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// "memory" or "file".
    #[serde(default = "default_store")]
    pub store: String,

    /// Path for the file store.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store() -> String {
    "file".into()
}
fn default_store_path() -> String {
    "data/progression.json".into()
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory receiving one JSON file per session.
    #[serde(default = "default_archive_dir")]
    pub dir: String,
}

fn default_true() -> bool {
    true
}
fn default_archive_dir() -> String {
    "data/sessions".into()
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_archive_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            session: SessionConfig::default(),
            decision: DecisionConfig::default(),
            viewer: ViewerConfig::default(),
            progression: ProgressionConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, falling back to defaults when the file
    /// does not exist, then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
                message: format!("read {}: {e}", path.display()),
            })?;
            toml::from_str(&raw).map_err(|e| Error::Config {
                message: format!("parse {}: {e}", path.display()),
            })?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("HATCHLING_AGENT_NAME") {
            self.agent_name = name;
        }
        if let Ok(budget) = std::env::var("HATCHLING_BUDGET") {
            if let Ok(budget) = budget.parse() {
                self.session.budget = budget;
            }
        }
        if let Ok(provider) = std::env::var("HATCHLING_PROVIDER") {
            self.decision.provider = provider;
        }
        if let Ok(url) = std::env::var("HATCHLING_OLLAMA_URL") {
            self.decision.base_url = url;
        }
        if let Ok(model) = std::env::var("HATCHLING_MODEL") {
            self.decision.model = model;
        }
        if let Ok(addr) = std::env::var("HATCHLING_VIEWER_ADDR") {
            self.viewer.enabled = true;
            self.viewer.addr = addr;
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.session.budget == 0 {
            return Err(Error::Config {
                message: "session.budget must be at least 1".into(),
            });
        }
        if !matches!(self.decision.provider.as_str(), "ollama" | "scripted") {
            return Err(Error::Config {
                message: format!(
                    "decision.provider must be 'ollama' or 'scripted', got '{}'",
                    self.decision.provider
                ),
            });
        }
        if !matches!(self.progression.store.as_str(), "memory" | "file") {
            return Err(Error::Config {
                message: format!(
                    "progression.store must be 'memory' or 'file', got '{}'",
                    self.progression.store
                ),
            });
        }
        Ok(())
    }
}
