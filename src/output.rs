//! Output formatting and styling module.
//!
//! Centralizes everything the command-line front end prints: colored status
//! lines, organize reports, dry-run plans and classification results.

use crate::classifier::Classification;
use crate::organizer::{OrganizeReport, PlannedMove};
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Prints CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {message}").yellow());
    }

    /// Prints what an organize pass did, followed by a per-folder summary.
    pub fn report(report: &OrganizeReport) {
        Self::header(&format!("Organized {}", report.directory.display()));

        for moved in &report.moved {
            Self::success(&format!(
                "{} → {}",
                file_name(&moved.original_path),
                relative(&report.directory, &moved.new_path)
            ));
        }
        for failed in &report.failed {
            Self::error(&format!("{}: {}", file_name(&failed.path), failed.message));
        }
        for deferred in &report.deferred {
            Self::warning(&format!(
                "{} is still being written; left for a later pass",
                file_name(deferred)
            ));
        }

        let mut folder_counts: BTreeMap<String, usize> = BTreeMap::new();
        for moved in &report.moved {
            let folder = moved
                .new_path
                .parent()
                .map(|p| relative(&report.directory, p))
                .unwrap_or_default();
            *folder_counts.entry(folder).or_insert(0) += 1;
        }
        Self::summary_table(&folder_counts, report.moved.len());

        if report.skipped > 0 {
            Self::info(&format!(
                "{} other {} left in place",
                report.skipped,
                if report.skipped == 1 { "file" } else { "files" }
            ));
        }
    }

    /// Prints the moves a pass would perform.
    pub fn plan(directory: &Path, plan: &[PlannedMove]) {
        if plan.is_empty() {
            Self::dry_run_notice("No screenshots or screen recordings to organize.");
            return;
        }

        Self::dry_run_notice(&format!(
            "Files in {} would be organized as follows:",
            directory.display()
        ));
        for planned in plan {
            println!(
                " - {}\n   → {}",
                file_name(&planned.source),
                relative(directory, &planned.destination)
            );
        }
        Self::dry_run_notice("No files were modified.");
    }

    /// Prints the classification of a single name.
    pub fn classification(name: &str, classification: Option<&Classification>) {
        match classification {
            Some(c) => println!(
                "{} {} → {}/",
                name,
                format!("[{}]", c.category.description()).green(),
                c.relative_dir().display()
            ),
            None => println!("{} {}", name, "[not organizable]".dimmed()),
        }
    }

    /// Prints a summary table with file counts by destination folder.
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        if folder_counts.is_empty() {
            Self::info("Nothing to organize.");
            return;
        }

        let max_folder_len = folder_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "\n{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));
        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {}",
                folder,
                count.to_string().green(),
                width = max_folder_len
            );
        }
        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_folder_len
        );
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
