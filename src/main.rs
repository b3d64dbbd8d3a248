use clap::Parser;
use screenshot_organizer::cli::{Cli, run_cli};
use screenshot_organizer::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}
