use anyhow::{Context, Result};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::runner::{CapturedOutput, CommandRunner, CommandSpec};
use crate::ansi::strip_ansi;

/// Runs the command as a child process, teeing its output
///
/// Each stream is copied as it arrives to the terminal (escape sequences
/// intact), to its own buffer and to the shared combined buffer.
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        runtime.block_on(run_process(spec))
    }
}

/// How long to keep draining output once the child is gone, descendants that
/// outlive it may hold the pipes open
const DRAIN_GRACE: Duration = Duration::from_secs(2);

async fn run_process(spec: &CommandSpec) -> Result<CapturedOutput> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &spec.working_dir {
        command.current_dir(dir);
    }

    // Untimed runs stay in our group so Ctrl-C reaches the child
    if spec.timeout.is_some() {
        own_process_group(&mut command);
    }

    tracing::info!(command = %spec.display(), "running command");

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to execute command: {}", spec.program))?;

    let stdout = child.stdout.take().context("Child stdout was not captured")?;
    let stderr = child.stderr.take().context("Child stderr was not captured")?;

    let stdout_buffer = Arc::new(Mutex::new(Vec::new()));
    let stderr_buffer = Arc::new(Mutex::new(Vec::new()));
    let combined = Arc::new(Mutex::new(Vec::new()));

    let stdout_task = tokio::spawn(tee(
        stdout,
        spec.echo.then(tokio::io::stdout),
        Arc::clone(&stdout_buffer),
        Arc::clone(&combined),
    ));
    let stderr_task = tokio::spawn(tee(
        stderr,
        spec.echo.then(tokio::io::stderr),
        Arc::clone(&stderr_buffer),
        Arc::clone(&combined),
    ));

    let (exit_code, timed_out) = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => (status.context("Failed to wait for command")?.code(), false),
            Err(_) => {
                tracing::warn!(timeout = ?limit, command = %spec.display(), "command timed out, killing it");
                kill_process_group(&child)?;
                child.kill().await.context("Failed to kill timed out command")?;
                (None, true)
            }
        },
        None => (
            child.wait().await.context("Failed to wait for command")?.code(),
            false,
        ),
    };

    let (stdout_drained, stderr_drained) =
        tokio::join!(drain(stdout_task, "stdout"), drain(stderr_task, "stderr"));
    stdout_drained?;
    stderr_drained?;

    let exit_code = exit_code.unwrap_or(-1);
    tracing::info!(exit_code, timed_out, "command finished");

    let stdout = stdout_buffer.lock().await;
    let stderr = stderr_buffer.lock().await;
    let combined = combined.lock().await;

    Ok(CapturedOutput {
        stdout: strip_ansi(&String::from_utf8_lossy(&stdout)),
        stderr: strip_ansi(&String::from_utf8_lossy(&stderr)),
        combined_output: strip_ansi(&String::from_utf8_lossy(&combined)),
        exit_code,
        timed_out,
    })
}

/// Wait for a reader to hit end of stream, abandoning it after [`DRAIN_GRACE`]
async fn drain(mut task: JoinHandle<std::io::Result<()>>, stream: &str) -> Result<()> {
    match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
        Ok(joined) => joined
            .with_context(|| format!("{} reader stopped unexpectedly", stream))?
            .with_context(|| format!("Failed to read command {}", stream)),
        Err(_) => {
            tracing::warn!(stream, "output still open after the command exited, not waiting for it");
            task.abort();
            Ok(())
        }
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kill every process in the child's group, descendants included
#[cfg(unix)]
fn kill_process_group(child: &Child) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        // Already gone
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(err) => Err(err).context("Failed to kill command process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) -> Result<()> {
    Ok(())
}

/// Copy `reader` into `terminal` (when given) and into the buffers
async fn tee<R, W>(
    mut reader: R,
    mut terminal: Option<W>,
    own: Arc<Mutex<Vec<u8>>>,
    combined: Arc<Mutex<Vec<u8>>>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; 8192];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }

        if let Some(terminal) = terminal.as_mut() {
            terminal.write_all(&chunk[..read]).await?;
            terminal.flush().await?;
        }

        own.lock().await.extend_from_slice(&chunk[..read]);
        combined.lock().await.extend_from_slice(&chunk[..read]);
    }

    Ok(())
}
