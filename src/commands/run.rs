use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::ci::CiInfo;
use crate::config::{Config, OutputFormat};
use crate::error::ExitError;
use crate::executor::{CommandRunner, CommandSpec};
use crate::notifier::{Notifier, NotifyParams, Operation};
use crate::output;
use crate::terraform::ParserKind;

fn parser_kind(operation: Operation) -> ParserKind {
    match operation {
        Operation::Plan => ParserKind::Plan,
        Operation::Apply => ParserKind::Apply,
    }
}

/// Command line to run: the one given after `--`, or the configured one
fn command_spec(
    operation: Operation,
    config: &Config,
    working_dir: Option<PathBuf>,
    command: &[String],
) -> Result<CommandSpec> {
    let spec = match command.split_first() {
        Some((program, args)) => CommandSpec::new(program, args),
        None => {
            let configured = match operation {
                Operation::Plan => &config.commands.plan,
                Operation::Apply => &config.commands.apply,
            };
            CommandSpec::from_command_line(configured)?
        }
    };

    Ok(spec
        .with_working_dir(working_dir)
        .with_timeout(config.timeout())
        .with_echo(config.output.format == OutputFormat::Text))
}

/// Run the wrapped command, parse its output and hand the result to every
/// notifier.
///
/// The returned error carries the exit code the process should end with.
pub(crate) fn run_operation(
    operation: Operation,
    config: &Config,
    ci: CiInfo,
    working_dir: Option<PathBuf>,
    command: &[String],
    runner: &dyn CommandRunner,
    notifiers: &[Box<dyn Notifier>],
) -> Result<()> {
    let spec = command_spec(operation, config, working_dir, command)?;

    output::info(&format!("Running {}", spec.display()));
    tracing::debug!(ci = %ci.name, operation = ?operation, "resolved CI platform");

    let captured = runner
        .run(&spec)
        .with_context(|| format!("Failed to run {}", spec.display()))?;

    let parser = parser_kind(operation).build();
    let result = parser.parse(&captured.combined_output);

    if let Some(error) = &result.error {
        tracing::warn!(%error, "unrecognized command output");
    }

    let params = NotifyParams::from_output(&captured, ci);

    let failures: Vec<String> = notifiers
        .iter()
        .filter_map(|notifier| notifier.notify(operation, &params, &result).err())
        .map(|err| format!("{:#}", err))
        .collect();

    if !failures.is_empty() {
        return Err(ExitError::with_message(
            1,
            format!("Failed to notify: {}", failures.join("; ")),
        )
        .into());
    }

    if captured.timed_out {
        return Err(ExitError::with_message(1, format!("{} timed out", spec.display())).into());
    }

    match captured.exit_code {
        0 => Ok(()),
        code if code > 0 => Err(ExitError::silent(code).into()),
        // Killed by a signal
        _ => Err(ExitError::silent(1).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_of;
    use crate::executor::{CapturedOutput, MockCommandRunner};
    use crate::notifier::CapturingNotifier;
    use crate::terraform::ExitCode;
    use std::sync::Arc;

    const PLAN_OUTPUT: &str = r#"Terraform will perform the following actions:

  # aws_instance.web will be destroyed

Plan: 0 to add, 0 to change, 1 to destroy.
"#;

    fn local_ci() -> CiInfo {
        CiInfo::resolve(Some("local"), |_| None).unwrap()
    }

    /// Box a shared notifier so the test keeps a handle on what it received
    struct Shared(Arc<CapturingNotifier>);

    impl Notifier for Shared {
        fn notify(
            &self,
            operation: Operation,
            params: &NotifyParams,
            result: &crate::terraform::ParseResult,
        ) -> Result<()> {
            self.0.notify(operation, params, result)
        }
    }

    fn run(
        operation: Operation,
        config: &Config,
        command: &[String],
        runner: &MockCommandRunner,
        capture: &Arc<CapturingNotifier>,
    ) -> Result<()> {
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(Shared(Arc::clone(capture)))];
        run_operation(operation, config, local_ci(), None, command, runner, &notifiers)
    }

    #[test]
    fn test_plan_uses_configured_command() {
        let runner = MockCommandRunner::with_text(PLAN_OUTPUT, 0);
        let capture = Arc::new(CapturingNotifier::default());
        let mut config = Config::default();
        config.commands.plan = "tofu plan -no-color".to_string();
        config.timeout_seconds = 30;

        let result = run(Operation::Plan, &config, &[], &runner, &capture);
        assert!(result.is_ok());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "tofu");
        assert_eq!(calls[0].args, vec!["plan", "-no-color"]);
        assert_eq!(calls[0].timeout, Some(std::time::Duration::from_secs(30)));
        assert!(calls[0].echo);

        let received = capture.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (operation, exit_code, parsed) = &received[0];
        assert_eq!(*operation, Operation::Plan);
        assert_eq!(*exit_code, 0);
        assert!(parsed.has_destroy);
        assert_eq!(parsed.result, "Plan: 0 to add, 0 to change, 1 to destroy.");
        assert_eq!(parsed.deleted_resources, vec!["  # aws_instance.web will be destroyed"]);
    }

    #[test]
    fn test_explicit_command_overrides_config() {
        let runner = MockCommandRunner::with_text("Apply complete! Resources: 0 added.\n", 0);
        let capture = Arc::new(CapturingNotifier::default());
        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        let command = vec![
            "terragrunt".to_string(),
            "apply".to_string(),
            "-auto-approve".to_string(),
        ];

        run(Operation::Apply, &config, &command, &runner, &capture).unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, "terragrunt");
        assert_eq!(calls[0].args, vec!["apply", "-auto-approve"]);
        assert!(!calls[0].echo);

        let received = capture.received.lock().unwrap();
        assert_eq!(received[0].2.exit_code, ExitCode::Pass);
        assert_eq!(received[0].2.result, "Apply complete! Resources: 0 added.");
    }

    #[test]
    fn test_child_exit_code_propagates() {
        let runner = MockCommandRunner::with_text("Error: Invalid provider\n", 2);
        let capture = Arc::new(CapturingNotifier::default());

        let result = run(Operation::Plan, &Config::default(), &[], &runner, &capture);
        assert_eq!(exit_code_of(&result), 2);

        let received = capture.received.lock().unwrap();
        assert_eq!(received[0].1, 2);
        assert!(received[0].2.has_plan_error);
    }

    #[test]
    fn test_parse_error_does_not_change_exit_code() {
        let runner = MockCommandRunner::with_text("Acquiring state lock...\n", 0);
        let capture = Arc::new(CapturingNotifier::default());

        let result = run(Operation::Plan, &Config::default(), &[], &runner, &capture);
        assert!(result.is_ok());
        assert!(capture.received.lock().unwrap()[0].2.has_parse_error);
    }

    #[test]
    fn test_notifier_failure_exits_one() {
        let runner = MockCommandRunner::with_text(PLAN_OUTPUT, 0);
        let capture = Arc::new(CapturingNotifier {
            fail: true,
            ..Default::default()
        });

        let result = run(Operation::Plan, &Config::default(), &[], &runner, &capture);
        assert_eq!(exit_code_of(&result), 1);

        let message = result.unwrap_err().to_string();
        assert!(message.contains("notification rejected"));
    }

    #[test]
    fn test_timeout_exits_one() {
        let runner = MockCommandRunner::with_output(CapturedOutput {
            exit_code: -1,
            timed_out: true,
            ..Default::default()
        });
        let capture = Arc::new(CapturingNotifier::default());

        let result = run(Operation::Apply, &Config::default(), &[], &runner, &capture);
        assert_eq!(exit_code_of(&result), 1);
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[test]
    fn test_signal_exit_maps_to_one() {
        let runner = MockCommandRunner::with_text("Apply complete!\n", -1);
        let capture = Arc::new(CapturingNotifier::default());

        let result = run(Operation::Apply, &Config::default(), &[], &runner, &capture);
        assert_eq!(exit_code_of(&result), 1);
    }
}
