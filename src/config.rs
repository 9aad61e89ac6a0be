//! Configuration loaded from `.tfreport.yaml`
//!
//! Lookup order: an explicit `--config` path, `.tfreport.yaml` in the working
//! directory, then `~/.config/tfreport/config.yaml`. Without any file the
//! defaults apply.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ci::{CiInfo, CiPlatform};

pub const CONFIG_FILE_NAME: &str = ".tfreport.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CI platform name, overrides detection (e.g. "github-actions")
    pub ci: Option<String>,

    /// Timeout for the wrapped command in seconds, 0 disables it
    pub timeout_seconds: u64,

    /// Plan/apply command lines used when none is given on the command line
    pub commands: CommandsConfig,

    pub templates: TemplatesConfig,

    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub plan: String,
    pub apply: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            plan: "terraform plan".to_string(),
            apply: "terraform apply".to_string(),
        }
    }
}

/// Handlebars templates overriding the built-in messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub plan: Option<String>,
    pub apply: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Also write the rendered message to this file
    pub file: Option<PathBuf>,

    /// Append to `file` instead of replacing it
    pub append: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unsupported output format: {}", s),
        }
    }
}

impl Config {
    /// Load configuration following the lookup order
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = working_dir.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(global) = dirs::config_dir().map(|d| d.join("tfreport").join("config.yaml"))
            && global.exists()
        {
            return Self::from_file(&global);
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Some(ci) = &self.ci {
            CiPlatform::from_name(ci).context("Invalid 'ci' in configuration")?;
        }

        if self.commands.plan.split_whitespace().next().is_none() {
            anyhow::bail!("'commands.plan' must not be empty");
        }

        if self.commands.apply.split_whitespace().next().is_none() {
            anyhow::bail!("'commands.apply' must not be empty");
        }

        if let Some(template) = &self.templates.plan {
            handlebars::Template::compile(template)
                .context("Invalid 'templates.plan' in configuration")?;
        }

        if let Some(template) = &self.templates.apply {
            handlebars::Template::compile(template)
                .context("Invalid 'templates.apply' in configuration")?;
        }

        Ok(())
    }

    /// Resolve CI metadata, the configured platform taking precedence
    pub fn complement(&self) -> Result<CiInfo> {
        CiInfo::from_env(self.ci.as_deref())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}
