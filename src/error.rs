use std::fmt;

/// Error carrying the exit code the process should terminate with
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitError {
    /// Exit with `code` without printing anything more
    pub fn silent(code: i32) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} (exit code {})", message, self.code),
            None => write!(f, "exit code {}", self.code),
        }
    }
}

impl std::error::Error for ExitError {}

/// Exit code for the outcome of a command run.
///
/// Zero when everything succeeded, otherwise the `ExitError` code, or 1 for
/// any other error.
pub fn exit_code_of(result: &anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1),
    }
}
