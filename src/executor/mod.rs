pub mod process;
pub mod runner;

pub use process::ProcessRunner;
pub use runner::{CapturedOutput, CommandRunner, CommandSpec};

#[cfg(test)]
pub use runner::MockCommandRunner;
