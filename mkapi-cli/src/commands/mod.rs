//! CLI command implementations

pub mod controller;
pub mod model;

pub use controller::ControllerCommand;
pub use model::ModelCommand;

use anyhow::{Context, Result};
use console::style;
use mkapi::batch::{self, BatchJob, BatchReport, Severity};
use mkapi::schema::MySqlSnapshotProvider;
use mkapi::MkApiConfig;

/// Run `job` against a fresh snapshot of the configured database and print the report
async fn run_batch(config: &MkApiConfig, job: &BatchJob) -> Result<BatchReport> {
    let mut provider = MySqlSnapshotProvider::new(config);
    let generated_at = chrono::Local::now().naive_local();

    let report = batch::run(&mut provider, job, generated_at)
        .await
        .context("Schema snapshot failed")?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for diagnostic in report.diagnostics() {
        let table = diagnostic
            .table
            .as_deref()
            .map(|t| format!("{} ", style(t).bold()))
            .unwrap_or_default();

        match diagnostic.severity {
            Severity::Info => {
                println!("  {} {table}{}", style("✓").green(), style(&diagnostic.message).dim());
            }
            Severity::Warning => {
                println!("  {} {table}{}", style("!").yellow(), style(&diagnostic.message).yellow());
            }
            Severity::Error => {
                eprintln!("  {} {table}{}", style("✗").red(), style(&diagnostic.message).red());
            }
        }
    }

    println!(
        "\n{} {} written, {} skipped, {} missing, {} failed",
        style("Done:").cyan().bold(),
        style(report.written).green(),
        report.skipped,
        style(report.missing).yellow(),
        style(report.failed).red()
    );
}
