use anyhow::Result;

use super::GlobalOptions;
use super::run::run_operation;
use crate::executor::ProcessRunner;
use crate::notifier::{Operation, build_notifiers};

/// Handles the 'apply' command - runs the apply command and reports its result
pub struct ApplyCommand;

impl ApplyCommand {
    pub fn execute(options: &GlobalOptions, command: &[String]) -> Result<()> {
        let config = options.load_config()?;
        let ci = config.complement()?;
        let notifiers = build_notifiers(&config)?;

        run_operation(
            Operation::Apply,
            &config,
            ci,
            options.working_dir.clone(),
            command,
            &ProcessRunner::new(),
            &notifiers,
        )
    }
}
