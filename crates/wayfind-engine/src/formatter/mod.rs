use crate::scenario::{Status, SuiteReport};

pub fn format_report(report: &SuiteReport) -> String {
    let mut output = format!("Suite: {}", report.suite);

    for scenario in &report.scenarios {
        let mark = match scenario.status {
            Status::Verified => "ok",
            Status::Skipped => "skip",
            Status::Failed => "FAIL",
        };
        output.push_str(&format!(
            "\n[{:>4}] {} ({} ms)",
            mark, scenario.name, scenario.elapsed_ms
        ));
        if let Some(detail) = &scenario.detail {
            output.push_str(&format!("\n       {}", detail));
        }
    }

    output.push_str(&format!(
        "\n\n{} verified, {} skipped, {} failed",
        report.count(Status::Verified),
        report.count(Status::Skipped),
        report.count(Status::Failed)
    ));

    if let Some(err) = &report.teardown_error {
        output.push_str(&format!("\nTeardown error: {}", err));
    }

    output
}

pub fn format_report_json(report: &SuiteReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
