use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use super::{MessageRenderer, Notifier, NotifyParams, Operation};
use crate::terraform::ParseResult;

/// Writes the rendered message to a file, e.g. a PR comment body or
/// `$GITHUB_STEP_SUMMARY`
pub struct FileNotifier {
    renderer: Arc<MessageRenderer>,
    path: PathBuf,
    append: bool,
}

impl FileNotifier {
    pub fn new(renderer: Arc<MessageRenderer>, path: PathBuf, append: bool) -> Self {
        Self {
            renderer,
            path,
            append,
        }
    }
}

impl Notifier for FileNotifier {
    fn notify(
        &self,
        operation: Operation,
        params: &NotifyParams,
        result: &ParseResult,
    ) -> Result<()> {
        let message = self.renderer.render(operation, params, result)?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file: {}", self.path.display()))?;

        writeln!(file, "{}", message.trim_end())
            .with_context(|| format!("Failed to write output file: {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "wrote notification");
        Ok(())
    }
}
