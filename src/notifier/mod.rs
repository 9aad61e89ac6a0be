//! Notification of parsed plan/apply results
//!
//! A notifier receives the [`ParseResult`] of a command together with the
//! run metadata and delivers a message somewhere: the terminal, a file used
//! as a pull request comment body, or stdout as JSON.

mod file;
mod template;
mod terminal;

use anyhow::Result;
use std::sync::Arc;

use crate::ci::CiInfo;
use crate::config::Config;
use crate::executor::CapturedOutput;
use crate::terraform::ParseResult;

pub use file::FileNotifier;
pub use template::MessageRenderer;
pub use terminal::TerminalNotifier;

/// The command whose result is being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Plan,
    Apply,
}

impl Operation {
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Plan => "Plan Result",
            Operation::Apply => "Apply Result",
        }
    }
}

/// Run metadata passed along with the parse result
#[derive(Debug, Clone)]
pub struct NotifyParams {
    pub stdout: String,
    pub stderr: String,
    pub combined_output: String,
    pub ci: CiInfo,
    /// Exit code of the wrapped command
    pub exit_code: i32,
}

impl NotifyParams {
    pub fn from_output(output: &CapturedOutput, ci: CiInfo) -> Self {
        Self {
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
            combined_output: output.combined_output.clone(),
            ci,
            exit_code: output.exit_code,
        }
    }
}

/// Delivers a parse result
pub trait Notifier: Send + Sync {
    fn notify(&self, operation: Operation, params: &NotifyParams, result: &ParseResult)
    -> Result<()>;
}

/// Notifiers enabled by the configuration; the terminal one is always present
pub fn build_notifiers(config: &Config) -> Result<Vec<Box<dyn Notifier>>> {
    let renderer = Arc::new(MessageRenderer::new(&config.templates)?);

    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(TerminalNotifier::new(
        Arc::clone(&renderer),
        config.output.format,
    ))];

    if let Some(path) = &config.output.file {
        notifiers.push(Box::new(FileNotifier::new(
            renderer,
            path.clone(),
            config.output.append,
        )));
    }

    Ok(notifiers)
}

/// Notifier capturing everything it is given, for testing
#[cfg(test)]
#[derive(Default)]
pub struct CapturingNotifier {
    pub received: std::sync::Mutex<Vec<(Operation, i32, ParseResult)>>,
    pub fail: bool,
}

#[cfg(test)]
impl Notifier for CapturingNotifier {
    fn notify(
        &self,
        operation: Operation,
        params: &NotifyParams,
        result: &ParseResult,
    ) -> Result<()> {
        self.received
            .lock()
            .unwrap()
            .push((operation, params.exit_code, result.clone()));

        if self.fail {
            anyhow::bail!("notification rejected");
        }

        Ok(())
    }
}
