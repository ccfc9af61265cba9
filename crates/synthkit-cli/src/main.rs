//! synthkit CLI.

use clap::Parser;
use synthkit_cli::cli::{Cli, Command};
use synthkit_cli::commands::{run_check, run_synth};
use synthkit_cli::logging::init_logging;
use synthkit_cli::summary::{print_check, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Synth(args) => match run_synth(&args) {
            Ok(result) => {
                print_summary(&result);
                i32::from(result.has_errors)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Check(args) => match run_check(&args) {
            Ok(report) => {
                print_check(&report);
                i32::from(!report.installed())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}
