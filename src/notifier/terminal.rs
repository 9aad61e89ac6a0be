use anyhow::{Context, Result};
use std::sync::Arc;

use super::{MessageRenderer, Notifier, NotifyParams, Operation};
use crate::config::OutputFormat;
use crate::output;
use crate::terraform::ParseResult;

/// Prints the rendered message, or the raw result as JSON, to stdout
pub struct TerminalNotifier {
    renderer: Arc<MessageRenderer>,
    format: OutputFormat,
}

impl TerminalNotifier {
    pub fn new(renderer: Arc<MessageRenderer>, format: OutputFormat) -> Self {
        Self { renderer, format }
    }

    fn print_status(operation: Operation, result: &ParseResult) {
        if let Some(error) = &result.error {
            output::warning(&format!("{} output not recognized: {}", operation.title(), error));
        } else if result.has_plan_error || !result.exit_code.is_pass() {
            output::error(&format!("{} reports an error", operation.title()));
        } else if result.has_destroy {
            output::warning(&result.result);
        } else {
            output::success(&result.result);
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(
        &self,
        operation: Operation,
        params: &NotifyParams,
        result: &ParseResult,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(result)
                    .context("Failed to serialize parse result")?;
                println!("{}", json);
            }
            OutputFormat::Text => {
                let message = self.renderer.render(operation, params, result)?;

                output::section(operation.title());
                Self::print_status(operation, result);
                output::blank();
                println!("{}", message.trim_end());
            }
        }

        Ok(())
    }
}
