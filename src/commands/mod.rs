pub mod apply;
pub mod parse;
pub mod plan;
mod run;

pub use apply::ApplyCommand;
pub use parse::ParseCommand;
pub use plan::PlanCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};

/// Flags shared by every subcommand, overriding the configuration file
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub ci: Option<String>,
    pub format: Option<OutputFormat>,
    /// Directory the wrapped command runs in, also searched for the config file
    pub working_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load, override and validate the configuration
    pub fn load_config(&self) -> Result<Config> {
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let mut config = Config::load(self.config.as_deref(), &working_dir)?;

        if let Some(ci) = &self.ci {
            config.ci = Some(ci.clone());
        }

        if let Some(format) = self.format {
            config.output.format = format;
        }

        config.validate()?;
        Ok(config)
    }
}
