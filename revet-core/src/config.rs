//! Configuration management for revet
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVET_*)
//! 3. Repo-local config file (.revet.toml at the repository root)
//! 4. User config file (~/.config/revet/config.toml)
//! 5. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::OutputFormat;
use crate::rules::{RuleRegistry, RuleSpec};
use crate::{Error, Result};

/// Review-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Baseline to compare against (branch, commit range, or "working-tree")
    pub baseline: String,

    /// Output format ("human" or "json")
    pub output: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            baseline: "working-tree".to_string(),
            output: "human".to_string(),
        }
    }
}

/// Rule-related configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids to remove from the registry
    pub disabled: Vec<String>,

    /// Custom rules appended to the base set
    pub custom: Vec<RuleSpec>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Review configuration
    pub review: ReviewConfig,

    /// Rule configuration
    pub rules: RulesConfig,
}

impl Config {
    /// Load configuration for a repository root.
    ///
    /// A repo-local `.revet.toml` wins over the user config file;
    /// defaults are used when neither exists.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let local = repo_root.join(".revet.toml");
        if local.exists() {
            debug!(path = %local.display(), "Loading repo-local config");
            return Self::load_from_file(&local);
        }

        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                debug!(path = %path.display(), "Loading user config");
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revet/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revet").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVET_BASELINE: Baseline to compare against
    /// - REVET_OUTPUT: Output format
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(baseline) = std::env::var("REVET_BASELINE") {
            self.review.baseline = baseline;
        }

        if let Ok(output) = std::env::var("REVET_OUTPUT") {
            self.review.output = output;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, baseline: Option<String>, output: Option<String>) -> Self {
        if let Some(b) = baseline {
            self.review.baseline = b;
        }

        if let Some(o) = output {
            self.review.output = o;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        repo_root: &Path,
        baseline: Option<String>,
        output: Option<String>,
    ) -> Result<Self> {
        Ok(Self::load(repo_root)?
            .with_env_overrides()
            .with_cli_overrides(baseline, output))
    }

    /// Parse the configured output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.review.output.parse().map_err(Error::Config)
    }

    /// Build the rule registry this configuration describes:
    /// the built-in catalogue plus custom rules, minus disabled ids.
    pub fn build_registry(&self) -> Result<RuleRegistry> {
        let registry = RuleRegistry::builtin()?
            .with_custom_rules(&self.rules.custom)?
            .without_rules(&self.rules.disabled);
        Ok(registry)
    }
}
