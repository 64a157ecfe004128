use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audit::DEFAULT_LOG_FILE;
use crate::pam::DEFAULT_TARGET_FILE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pam: PamConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PamConfig {
    /// PAM service file to edit
    #[serde(default = "default_pam_file")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Append-only outcome log
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Diagnostic level on stderr: "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_pam_file() -> String {
    DEFAULT_TARGET_FILE.to_string()
}
fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PamConfig {
    fn default() -> Self {
        Self {
            file: default_pam_file(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `path`, or fall back to built-in defaults when none is given.
    ///
    /// A path that is given but unreadable or malformed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn pam_file(&self) -> PathBuf {
        expand_path(&self.pam.file)
    }

    pub fn log_file(&self) -> PathBuf {
        expand_path(&self.audit.log_file)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
