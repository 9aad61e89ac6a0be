use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// A command to run on behalf of the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    /// Copy the child's output to our own stdout/stderr while it runs
    pub echo: bool,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            working_dir: None,
            timeout: None,
            echo: true,
        }
    }

    /// Build from a whitespace separated command line such as `terraform plan -no-color`
    pub fn from_command_line(command: &str) -> Result<Self> {
        let parts: Vec<String> = command.split_whitespace().map(String::from).collect();

        let Some((program, args)) = parts.split_first() else {
            anyhow::bail!("Empty command provided");
        };

        Ok(Self::new(program, args))
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Human readable command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a finished command, escape sequences already stripped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Both streams interleaved in arrival order
    pub combined_output: String,
    /// The child's exit code, -1 when it was killed or ended by a signal
    pub exit_code: i32,
    pub timed_out: bool,
}

/// Runs commands, allowing for mocking in tests
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput>;
}

/// Mock command runner for testing
#[cfg(test)]
pub struct MockCommandRunner {
    output: CapturedOutput,
    calls: std::sync::Mutex<Vec<CommandSpec>>,
}

#[cfg(test)]
impl MockCommandRunner {
    pub fn with_output(output: CapturedOutput) -> Self {
        Self {
            output,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Mock whose stdout and combined output are `text`
    pub fn with_text(text: &str, exit_code: i32) -> Self {
        Self::with_output(CapturedOutput {
            stdout: text.to_string(),
            stderr: String::new(),
            combined_output: text.to_string(),
            exit_code,
            timed_out: false,
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CommandRunner for MockCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self.output.clone())
    }
}
