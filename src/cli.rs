//! Command-line interface module.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Settings and logging setup
//! - The interactive watch loop
//! - One-shot and dry-run organization

use crate::access::{AccessGrant, DenyAccess, PromptAccess};
use crate::activity::TracingLog;
use crate::classifier::classify;
use crate::config::Settings;
use crate::controller::{ControlEvent, ControlOutcome, Controller};
use crate::logging::init_logging;
use crate::organizer::Organizer;
use crate::output::OutputFormatter;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Files new screenshots and screen recordings into year/month folders.
#[derive(Debug, Parser)]
#[command(name = "screenshot-organizer", version, about)]
pub struct Cli {
    /// Settings file to use instead of the default lookup.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Monitor a directory and organize captures as they appear.
    Watch {
        /// Directory to monitor (defaults to the configured one).
        directory: Option<PathBuf>,
        /// Organize what is already there before waiting for changes.
        #[arg(long)]
        organize_first: bool,
        /// Don't read control commands from stdin; run until killed.
        #[arg(long)]
        detached: bool,
    },
    /// Organize a directory once and exit.
    Organize {
        /// Directory to organize (defaults to the configured one).
        directory: Option<PathBuf>,
        /// Show where files would go without moving anything.
        #[arg(long)]
        dry_run: bool,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show how file names would be classified.
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Runs the CLI application: loads settings, sets up logging and executes
/// the requested command.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let settings = Settings::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {e}"))?;
    let _log_guard = init_logging(&settings.log_directory);
    run_command(cli.command, &settings)
}

/// Executes `command` with already-loaded settings.
pub fn run_command(command: Command, settings: &Settings) -> Result<(), String> {
    match command {
        Command::Watch {
            directory,
            organize_first,
            detached,
        } => watch(settings, directory, organize_first, detached),
        Command::Organize {
            directory,
            dry_run,
            json,
        } => {
            let directory = directory.unwrap_or_else(|| settings.monitored_directory.clone());
            organize(settings, &directory, dry_run, json)
        }
        Command::Classify { names } => {
            for name in &names {
                OutputFormatter::classification(name, classify(name).as_ref());
            }
            Ok(())
        }
    }
}

fn access_grant() -> Arc<dyn AccessGrant> {
    if io::stdin().is_terminal() {
        Arc::new(PromptAccess)
    } else {
        Arc::new(DenyAccess)
    }
}

/// Organizes `directory` once, or prints the plan when `dry_run` is set.
fn organize(
    settings: &Settings,
    directory: &Path,
    dry_run: bool,
    json: bool,
) -> Result<(), String> {
    let organizer = Organizer::new(directory, Arc::new(TracingLog))
        .with_access(access_grant())
        .with_options(settings.organizer_options());

    if dry_run {
        let plan = organizer.plan(None).map_err(|e| e.to_string())?;
        if json {
            let rendered = serde_json::to_string_pretty(&plan).map_err(|e| e.to_string())?;
            println!("{rendered}");
        } else {
            OutputFormatter::plan(directory, &plan);
        }
        return Ok(());
    }

    let report = organizer.organize_now(None).map_err(|e| e.to_string())?;
    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{rendered}");
    } else {
        OutputFormatter::report(&report);
    }

    if !report.failed.is_empty() {
        return Err(format!(
            "{} {} could not be organized; they were left in place",
            report.failed.len(),
            if report.failed.len() == 1 { "file" } else { "files" }
        ));
    }
    Ok(())
}

/// Runs the watch loop until `quit`, end of input, or (when detached) the
/// process is killed.
fn watch(
    settings: &Settings,
    directory: Option<PathBuf>,
    organize_first: bool,
    detached: bool,
) -> Result<(), String> {
    let explicit = directory.is_some();
    let directory = directory.unwrap_or_else(|| settings.monitored_directory.clone());
    let mut controller = Controller::new(
        directory,
        Arc::new(TracingLog),
        access_grant(),
        settings.organizer_options(),
    );

    if settings.monitor_on_start || explicit {
        apply(&mut controller, ControlEvent::StartMonitoring);
    }
    if organize_first {
        apply(&mut controller, ControlEvent::OrganizeNow { directory: None });
    }

    if detached {
        if !controller.is_monitoring() {
            return Err(format!(
                "Not monitoring {}; nothing to do",
                controller.directory().display()
            ));
        }
        loop {
            std::thread::park();
        }
    }

    OutputFormatter::info(
        "Commands: status, organize [DIR], switch DIR [--now], start, stop, quit",
    );
    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("Error reading input: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ControlEvent>() {
            Ok(event) => {
                if !apply(&mut controller, event) {
                    return Ok(());
                }
            }
            Err(e) => OutputFormatter::error(&e.to_string()),
        }
    }

    apply(&mut controller, ControlEvent::Shutdown);
    Ok(())
}

/// Applies one event and prints its outcome. Returns false once the loop
/// should end.
fn apply(controller: &mut Controller, event: ControlEvent) -> bool {
    match controller.handle(event) {
        Ok(ControlOutcome::Done) => {
            print_status(controller.directory(), controller.is_monitoring());
            true
        }
        Ok(ControlOutcome::Organized(report)) => {
            OutputFormatter::report(&report);
            true
        }
        Ok(ControlOutcome::Status {
            directory,
            monitoring,
        }) => {
            print_status(&directory, monitoring);
            true
        }
        Ok(ControlOutcome::Exit) => false,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            true
        }
    }
}

fn print_status(directory: &Path, monitoring: bool) {
    if monitoring {
        OutputFormatter::success(&format!("Monitoring {}", directory.display()));
    } else {
        OutputFormatter::warning(&format!("Not monitoring {}", directory.display()));
    }
}
