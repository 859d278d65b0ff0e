// Terminal reporting for batch results

use std::io::IsTerminal;
use std::time::Duration;

use colored::*;

use crate::executor::batch::BatchReport;

/// Renders batch results for a human terminal.
pub struct TerminalReport {
    quiet: bool,
}

impl TerminalReport {
    pub fn new(quiet: bool) -> Self {
        // Respect NO_COLOR (https://no-color.org/) and disable colors when
        // stdout is not a TTY.
        if std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal() {
            colored::control::set_override(false);
        }

        TerminalReport { quiet }
    }

    /// Print a header before a batch runs.
    pub fn print_batch_header(&self, command: &str, host_count: usize) {
        if self.quiet {
            return;
        }

        println!();
        println!(
            "{} {} ({} hosts)",
            "BATCH".green().bold(),
            command.cyan(),
            host_count
        );
        println!("{}", "─".repeat(60).dimmed());
    }

    /// Print per-host outcomes and a recap line.
    pub fn print_report(&self, report: &BatchReport, elapsed: Duration) {
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(()) => {
                    if !self.quiet {
                        println!("{} {}", "ok:".green(), outcome.host);
                    }
                }
                Err(e) => {
                    println!("{} {} - {}", "failed:".red().bold(), outcome.host.bold(), e);
                }
            }
        }

        if self.quiet && report.is_success() {
            return;
        }

        println!();
        println!(
            "{}: {} hosts, {} ok, {} failed in {:.1}s",
            "recap".bold(),
            report.outcomes.len(),
            report.ok_count().to_string().green(),
            if report.failed_count() > 0 {
                report.failed_count().to_string().red().to_string()
            } else {
                report.failed_count().to_string()
            },
            elapsed.as_secs_f64()
        );
    }
}
