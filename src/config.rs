use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ChangelogError, Result};
use crate::timestamp::DEFAULT_CHANGELOG_START;

/// Environment variable consulted when no private token is configured
pub const PRIVATE_TOKEN_ENV: &str = "GITLAB_PRIVATE_TOKEN";

/// Represents the complete configuration for gitlab-changelog.
///
/// Contains the GitLab connection, the changelog window settings and the label names
/// used for classification.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub labels: LabelsConfig,
}

fn default_host() -> String {
    "https://gitlab.com".to_string()
}

/// Connection and project selection for the GitLab instance.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub private_token: Option<String>,

    /// Namespace (group) name that owns the project
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub project: Option<String>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        GitLabConfig {
            host: default_host(),
            private_token: None,
            group: None,
            project: None,
        }
    }
}

fn default_start() -> String {
    DEFAULT_CHANGELOG_START.to_string()
}

fn default_output() -> String {
    "CHANGELOG.md".to_string()
}

/// Settings for the generated document.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    /// Lower bound of the oldest release window, in GitLab timestamp format
    #[serde(default = "default_start")]
    pub start: String,

    #[serde(default = "default_output")]
    pub output: String,

    /// Only list merge requests merged into this branch when set
    #[serde(default)]
    pub target_branch: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            start: default_start(),
            output: default_output(),
            target_branch: None,
        }
    }
}

fn default_feature_label() -> String {
    "feature".to_string()
}

fn default_bug_label() -> String {
    "bug".to_string()
}

/// Label names that select the Features and Bug Fixes sections.
///
/// The feature label takes precedence when a merge request carries both.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabelsConfig {
    #[serde(default = "default_feature_label")]
    pub feature: String,

    #[serde(default = "default_bug_label")]
    pub bug: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            feature: default_feature_label(),
            bug: default_bug_label(),
        }
    }
}

impl Config {
    /// Project group, or a configuration error when it is not set
    pub fn group(&self) -> Result<&str> {
        self.gitlab
            .group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| ChangelogError::config("gitlab.group is not set"))
    }

    /// Project name, or a configuration error when it is not set
    pub fn project(&self) -> Result<&str> {
        self.gitlab
            .project
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ChangelogError::config("gitlab.project is not set"))
    }

    /// Check that everything needed for a run is present.
    pub fn validate(&self) -> Result<()> {
        self.group()?;
        self.project()?;
        if self.gitlab.host.trim().is_empty() {
            return Err(ChangelogError::config("gitlab.host is empty"));
        }
        if self.changelog.output.trim().is_empty() {
            return Err(ChangelogError::config("changelog.output is empty"));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changelog.toml` in current directory
/// 3. `.changelog.toml` in user config directory
/// 4. Default configuration if no file found
///
/// A missing private token is taken from `GITLAB_PRIVATE_TOKEN`.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        Some(fs::read_to_string(path)?)
    } else if Path::new("./changelog.toml").exists() {
        Some(fs::read_to_string("./changelog.toml")?)
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".changelog.toml");
        if config_path.exists() {
            Some(fs::read_to_string(config_path)?)
        } else {
            None
        }
    } else {
        None
    };

    let mut config: Config = match config_str {
        Some(content) => toml::from_str(&content)?,
        None => Config::default(),
    };

    if config.gitlab.private_token.is_none() {
        config.gitlab.private_token = env::var(PRIVATE_TOKEN_ENV).ok().filter(|t| !t.is_empty());
    }

    Ok(config)
}
