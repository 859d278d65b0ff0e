// JSON reporting for machine-readable batch results

use std::time::Duration;

use serde_json::json;

use crate::executor::batch::BatchReport;

/// Render one batch as a JSON document.
pub fn render_report(command: &str, report: &BatchReport, elapsed: Duration) -> serde_json::Value {
    let hosts: Vec<_> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(()) => json!({
                "host": outcome.host,
                "status": "ok",
            }),
            Err(e) => json!({
                "host": outcome.host,
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();

    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "hosts": hosts,
        "ok": report.ok_count(),
        "failed": report.failed_count(),
        "elapsed_secs": elapsed.as_secs_f64(),
    })
}

/// Print the batch report to stdout as pretty JSON.
pub fn print_report(command: &str, report: &BatchReport, elapsed: Duration) {
    let value = render_report(command, report, elapsed);
    println!(
        "{}",
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    );
}
