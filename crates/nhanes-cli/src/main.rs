//! `nhanes`: convert NHANES transport files to CSV and text descriptions.

use std::process::ExitCode;

use clap::Parser;
use nhanes_cli::cli::{Cli, Command};
use nhanes_cli::commands::{run_batch_command, run_inspect};
use nhanes_cli::logging::init_logging;
use nhanes_cli::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    if run(&cli.command) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// True when every file went through without a failed step.
fn run(command: &Command) -> bool {
    if let Command::Inspect(args) = command {
        return !run_inspect(&args.file).is_failed();
    }
    let Some(request) = command.batch_request() else {
        return false;
    };
    match run_batch_command(&request) {
        Ok(report) => {
            print_summary(&report);
            !report.has_errors()
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            false
        }
    }
}
