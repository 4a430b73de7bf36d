//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! Functions returning `String` are side-effect free; `display_*` functions print them.

use console::style;

use crate::cli::orchestration::ChangelogReport;
use crate::diagnostics::ChangelogWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a changelog warning to the user.
pub fn display_warning(warning: &ChangelogWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary lines for a finished run.
///
/// # Arguments
/// * `report` - The run to summarize
/// * `destination` - Where the document went
pub fn format_summary(report: &ChangelogReport, destination: &str) -> Vec<String> {
    let mut lines = vec![
        format!("Changelog for {} written to {}", report.project, destination),
        format!(
            "  {} releases, {} of {} merged merge requests listed",
            report.releases, report.classified, report.merge_requests
        ),
    ];
    if report.unmatched > 0 {
        lines.push(format!(
            "  {} outside every release window",
            report.unmatched
        ));
    }
    lines
}

/// Print the run summary with a green checkmark on the first line.
pub fn display_summary(report: &ChangelogReport, destination: &str) {
    let mut lines = format_summary(report, destination).into_iter();
    if let Some(first) = lines.next() {
        display_success(&first);
    }
    for line in lines {
        println!("{}", line);
    }
}
