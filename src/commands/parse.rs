use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::ansi::strip_ansi;
use crate::error::ExitError;
use crate::terraform::{ParseResult, ParserKind};

/// Handles the 'parse' command - parses saved output and prints it as JSON
pub struct ParseCommand;

impl ParseCommand {
    /// Parse `file`, or stdin when absent. Exits 1 unless the result passes.
    pub fn execute(kind: ParserKind, file: Option<&Path>) -> Result<()> {
        let text = Self::read_input(file)?;
        let result = Self::parse(kind, &text);

        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize parse result")?;
        println!("{}", json);

        if !result.exit_code.is_pass() {
            return Err(ExitError::silent(1).into());
        }

        Ok(())
    }

    fn read_input(file: Option<&Path>) -> Result<String> {
        match file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                Ok(text)
            }
        }
    }

    fn parse(kind: ParserKind, text: &str) -> ParseResult {
        let result = kind.build().parse(&strip_ansi(text));
        tracing::debug!(%kind, exit_code = result.exit_code.code(), "parsed input");
        result
    }
}
