//! Parsers for Terraform/OpenTofu command output
//!
//! Each parser turns the captured (color-stripped) text of one command into a
//! [`ParseResult`]. Parsers only hold compiled patterns, so a single instance
//! can be shared across threads and reused for any number of inputs.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use super::blocks::{error_lines, extract_blocks, join_trimmed};
use super::constants::{CHANGE_BLOCK, OUTSIDE_BLOCK, WARNING_BLOCK};
use super::summary::{Classification, aggregate_plan_lines};
use super::types::{ExitCode, ParseError, ParseResult};

/// Turns captured command output into a [`ParseResult`]
pub trait Parser: Send + Sync {
    fn parse(&self, body: &str) -> ParseResult;
}

/// Which parser to use, chosen by the operation that produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Default,
    Plan,
    Apply,
}

impl ParserKind {
    pub fn build(&self) -> Box<dyn Parser> {
        match self {
            ParserKind::Default => Box::new(DefaultParser::new()),
            ParserKind::Plan => Box::new(PlanParser::new()),
            ParserKind::Apply => Box::new(ApplyParser::new()),
        }
    }
}

impl FromStr for ParserKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "plan" => Ok(Self::Plan),
            "apply" => Ok(Self::Apply),
            _ => anyhow::bail!("Unknown parser kind: {}", s),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserKind::Default => "default",
            ParserKind::Plan => "plan",
            ParserKind::Apply => "apply",
        };
        write!(f, "{}", name)
    }
}

/// Passes the output through untouched
#[derive(Debug, Default)]
pub struct DefaultParser;

impl DefaultParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for DefaultParser {
    fn parse(&self, body: &str) -> ParseResult {
        ParseResult {
            result: body.to_string(),
            exit_code: ExitCode::Pass,
            ..Default::default()
        }
    }
}

/// Parser for `terraform plan` output
pub struct PlanParser {
    pass_pattern: Regex,
    fail_pattern: Regex,
    create_pattern: Regex,
    update_pattern: Regex,
    delete_pattern: Regex,
    replace_pattern: Regex,
    replace_requested_pattern: Regex,
}

impl Default for PlanParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanParser {
    /// Create a new plan parser with compiled regex patterns
    pub fn new() -> Self {
        Self {
            // Plan: 1 to add, ... / No changes. Your infrastructure matches ...
            pass_pattern: Regex::new(r"(?m)^(Plan: \d|No changes.)")
                .expect("Invalid pass pattern regex"),

            fail_pattern: Regex::new(r"(?m)^(Error: )").expect("Invalid fail pattern regex"),

            // # aws_instance.example will be created
            create_pattern: Regex::new(r"(?m)^ *# (.*) will be created$")
                .expect("Invalid create pattern regex"),

            update_pattern: Regex::new(r"(?m)^ *# (.*) will be updated in-place$")
                .expect("Invalid update pattern regex"),

            delete_pattern: Regex::new(r"(?m)^ *# (.*) will be destroyed$")
                .expect("Invalid delete pattern regex"),

            // # aws_instance.web must be replaced
            // # aws_instance.web is tainted, so must be replaced
            replace_pattern: Regex::new(r"(?m)^ *# (.*?)(?: is tainted, so)? must be replaced$")
                .expect("Invalid replace pattern regex"),

            // terraform plan -replace=aws_instance.web
            replace_requested_pattern: Regex::new(
                r"(?m)^ *# (.*?) will be replaced, as requested$",
            )
            .expect("Invalid replace requested pattern regex"),
        }
    }
}

impl Parser for PlanParser {
    fn parse(&self, body: &str) -> ParseResult {
        let has_plan_error = if self.pass_pattern.is_match(body) {
            false
        } else if self.fail_pattern.is_match(body) {
            true
        } else {
            tracing::debug!("plan output matches neither pass nor fail pattern");
            return ParseResult::parse_error(ParseError::UnrecognizedPlan);
        };

        let lines: Vec<&str> = body.split('\n').collect();

        let outside_blocks = extract_blocks(&lines, OUTSIDE_BLOCK);
        let change_blocks = extract_blocks(&lines, CHANGE_BLOCK);
        let warning_blocks = extract_blocks(&lines, WARNING_BLOCK);

        let created_resources = extract_resources(&self.create_pattern, body);
        let updated_resources = extract_resources(&self.update_pattern, body);
        let deleted_resources = extract_resources(&self.delete_pattern, body);
        let mut replaced_resources = extract_resources(&self.replace_pattern, body);
        replaced_resources.extend(extract_resources(&self.replace_requested_pattern, body));

        let (result, exit_code, flags) = if has_plan_error {
            (
                error_lines(&lines).join("\n"),
                ExitCode::Fail,
                Classification::default(),
            )
        } else {
            let summary = aggregate_plan_lines(&lines);
            let flags = Classification::from_summary(&summary);
            (summary, ExitCode::Pass, flags)
        };

        let changed_result = if change_blocks.is_empty() {
            String::new()
        } else {
            format!("{}\n\n{}", change_blocks.join("\n"), result)
        };

        tracing::debug!(
            has_plan_error,
            outside_blocks = outside_blocks.len(),
            change_blocks = change_blocks.len(),
            warning_blocks = warning_blocks.len(),
            summary = %result,
            "parsed plan output"
        );

        ParseResult {
            result,
            outside_terraform: outside_blocks.join("\n"),
            changed_result,
            warning: warning_blocks.join("\n"),
            has_add_or_update_only: flags.has_add_or_update_only,
            has_destroy: flags.has_destroy,
            has_no_changes: flags.has_no_changes,
            has_plan_error,
            has_parse_error: false,
            exit_code,
            error: None,
            created_resources,
            updated_resources,
            deleted_resources,
            replaced_resources,
        }
    }
}

/// Every phrase matching `pattern` across the whole text, duplicates included
fn extract_resources(pattern: &Regex, body: &str) -> Vec<String> {
    pattern
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parser for `terraform apply` output
pub struct ApplyParser {
    pass_pattern: Regex,
    fail_pattern: Regex,
}

impl Default for ApplyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplyParser {
    pub fn new() -> Self {
        Self {
            pass_pattern: Regex::new(r"(?m)^(Apply complete!)")
                .expect("Invalid pass pattern regex"),
            fail_pattern: Regex::new(r"(?m)^(Error: )").expect("Invalid fail pattern regex"),
        }
    }
}

impl Parser for ApplyParser {
    fn parse(&self, body: &str) -> ParseResult {
        let exit_code = if self.pass_pattern.is_match(body) {
            ExitCode::Pass
        } else if self.fail_pattern.is_match(body) {
            ExitCode::Fail
        } else {
            tracing::debug!("apply output matches neither pass nor fail pattern");
            return ParseResult::parse_error(ParseError::UnrecognizedApply);
        };

        let lines: Vec<&str> = body.split('\n').collect();

        let first_match = lines.iter().position(|line| {
            self.pass_pattern.is_match(line) || self.fail_pattern.is_match(line)
        });

        let result = match first_match {
            Some(index) if self.pass_pattern.is_match(lines[index]) => lines[index].to_string(),
            Some(index) => join_trimmed(&lines[index..]),
            None => String::new(),
        };

        tracing::debug!(?exit_code, "parsed apply output");

        ParseResult {
            result,
            exit_code,
            ..Default::default()
        }
    }
}
