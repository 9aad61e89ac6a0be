//! Data types produced by the plan and apply parsers

use serde::{Serialize, Serializer};
use std::fmt;

/// Outcome of the parsed operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitCode {
    #[default]
    Pass,
    Fail,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        match self {
            ExitCode::Pass => 0,
            ExitCode::Fail => 1,
        }
    }

    pub fn is_pass(&self) -> bool {
        *self == ExitCode::Pass
    }
}

impl Serialize for ExitCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// Raised when the output matches neither the success nor the failure shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnrecognizedPlan,
    UnrecognizedApply,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnrecognizedPlan => write!(f, "cannot parse plan result"),
            ParseError::UnrecognizedApply => write!(f, "cannot parse apply result"),
        }
    }
}

impl std::error::Error for ParseError {}

impl Serialize for ParseError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Structured result of parsing one captured command output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Aggregated plan summary, joined error lines, or the apply message
    pub result: String,

    /// Drift detected outside of Terraform
    pub outside_terraform: String,

    /// Planned actions followed by the summary
    pub changed_result: String,

    pub warning: String,

    pub has_add_or_update_only: bool,
    pub has_destroy: bool,
    pub has_no_changes: bool,
    pub has_plan_error: bool,
    pub has_parse_error: bool,

    pub exit_code: ExitCode,

    /// Set only together with `has_parse_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseError>,

    pub created_resources: Vec<String>,
    pub updated_resources: Vec<String>,
    pub deleted_resources: Vec<String>,
    pub replaced_resources: Vec<String>,
}

impl ParseResult {
    /// Result for output that could not be recognized
    pub fn parse_error(error: ParseError) -> Self {
        Self {
            has_parse_error: true,
            exit_code: ExitCode::Fail,
            error: Some(error),
            ..Default::default()
        }
    }
}

const ACTION_SUFFIXES: &[&str] = &[
    " will be created",
    " will be updated in-place",
    " will be destroyed",
    " is tainted, so must be replaced",
    " must be replaced",
    " will be replaced, as requested",
];

/// Bare resource address of a resource-action phrase
///
/// `  # module.vpc.aws_subnet.a will be created` yields `module.vpc.aws_subnet.a`.
pub fn resource_address(phrase: &str) -> &str {
    let trimmed = phrase.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed).trim_start();

    ACTION_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed)
}
