//! Terraform/OpenTofu output parsing
//!
//! This module turns the plain-text output of `plan` and `apply` into a
//! structured [`ParseResult`]: pass/fail classification, the summary line,
//! the drift/change/warning blocks and the resources touched per action.

mod blocks;
mod constants;
mod parser;
mod summary;
mod types;

pub use parser::ParserKind;
pub use types::{ParseResult, resource_address};

#[cfg(test)]
pub use parser::{ApplyParser, Parser, PlanParser};
#[cfg(test)]
pub use types::ExitCode;
