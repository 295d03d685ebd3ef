use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the routing configuration, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "asana-sync.toml";

/// Main configuration for asana-sync
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub asana: AsanaConfig,
    pub github: GithubConfig,
    /// Ownership routing rules, evaluated in declaration order
    pub rules: Vec<RoutingRule>,
}

/// Configuration for the Asana side of the sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsanaConfig {
    /// REST API base URL
    pub api_url: String,
    /// Prefix that marks a task reference inside free-form text
    pub reference_prefix: String,
    /// Heading rendered in front of each owner label in task notes
    pub owner_heading: String,
}

impl Default for AsanaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://app.asana.com/api/1.0".into(),
            reference_prefix: "https://app.asana.com/".into(),
            owner_heading: "Owner team".into(),
        }
    }
}

/// Configuration for the GitHub side of the sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// REST API base URL (override for GitHub Enterprise)
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
        }
    }
}

/// A single ownership rule: when any changed path matches `paths`,
/// `text` is appended to the task notes under the `team` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    #[serde(alias = "owner")]
    pub team: String,
    /// Gitignore-style glob patterns
    #[serde(default, alias = "patterns")]
    pub paths: Vec<String>,
    #[serde(default, alias = "annotation")]
    pub text: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration, falling back to defaults (and therefore zero rules)
    /// when the file is missing or unparsable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::debug!(
                    "Loaded {} routing rule(s) from {}",
                    config.rules.len(),
                    path.display()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Routing configuration unavailable, continuing without rules: {e:#}");
                Self::default()
            }
        }
    }

    /// Resolve the config path from an explicit flag or the default file name
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf)
    }
}
