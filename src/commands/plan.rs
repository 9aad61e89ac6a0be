use anyhow::Result;

use super::GlobalOptions;
use super::run::run_operation;
use crate::executor::ProcessRunner;
use crate::notifier::{Operation, build_notifiers};

/// Handles the 'plan' command - runs the plan command and reports its result
pub struct PlanCommand;

impl PlanCommand {
    /// Execute the plan command, `command` overriding the configured one
    pub fn execute(options: &GlobalOptions, command: &[String]) -> Result<()> {
        let config = options.load_config()?;
        let ci = config.complement()?;
        let notifiers = build_notifiers(&config)?;

        run_operation(
            Operation::Plan,
            &config,
            ci,
            options.working_dir.clone(),
            command,
            &ProcessRunner::new(),
            &notifiers,
        )
    }
}
