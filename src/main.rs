mod ansi;
mod ci;
mod commands;
mod config;
mod error;
mod executor;
mod logging;
mod notifier;
mod output;
mod terraform;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ApplyCommand, GlobalOptions, ParseCommand, PlanCommand};
use config::OutputFormat;
use error::{ExitError, exit_code_of};
use std::path::PathBuf;
use terraform::ParserKind;

#[derive(Parser)]
#[command(name = "tfreport")]
#[command(about = "Run Terraform/OpenTofu plan and apply, and report their results", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./.tfreport.yaml)
    #[arg(long, global = true, env = "TFREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// CI platform, overriding detection (github-actions, gitlab-ci, jenkins, circleci, local)
    #[arg(long, global = true)]
    ci: Option<String>,

    /// Output format: text or json
    #[arg(long, global = true, value_parser = OutputFormat::from_name)]
    format: Option<OutputFormat>,

    /// Run in this directory instead of the current one
    #[arg(short = 'C', long = "chdir", global = true)]
    working_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a plan and report its result
    Plan {
        /// Command to run instead of the configured one
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Run an apply and report its result
    Apply {
        /// Command to run instead of the configured one
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Parse saved plan or apply output and print the result as JSON
    Parse {
        /// Parser to use: plan, apply or default
        #[arg(short, long, default_value = "plan")]
        kind: ParserKind,

        /// File to parse (defaults to stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<()> {
    let options = GlobalOptions {
        config: cli.config,
        ci: cli.ci,
        format: cli.format,
        working_dir: cli.working_dir,
    };

    match cli.command {
        Commands::Plan { command } => PlanCommand::execute(&options, &command),
        Commands::Apply { command } => ApplyCommand::execute(&options, &command),
        Commands::Parse { kind, file } => ParseCommand::execute(kind, file.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::initialize(cli.verbose);

    let result = run(cli);

    if let Err(err) = &result {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                if let Some(message) = &exit.message {
                    output::error(message);
                }
            }
            None => output::error(&format!("{:#}", err)),
        }
    }

    std::process::exit(exit_code_of(&result));
}
