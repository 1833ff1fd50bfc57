//! Shared output formatting for validation reports.

use anyhow::Result;
use openapi_lint_core::{Severity, ValidationReport};
use std::fmt::Write;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    print!("{}", render(report, format)?);
    Ok(())
}

/// Render a report in the specified format.
pub fn render(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
        OutputFormat::Compact => render_compact(report),
    })
}

fn render_text(report: &ValidationReport) -> String {
    let (errors, warnings, _) = report.count_by_severity();
    let mut out = String::new();

    for message in &report.messages {
        let severity_indicator = match message.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        let _ = writeln!(
            out,
            "{} {} at {}#{}",
            message.rule_id,
            message.rule_name,
            message.file.display(),
            message.path,
        );
        let _ = writeln!(out, "  {}: {}", severity_indicator, message.message);
        if let Some(internal) = message.internal {
            let _ = writeln!(out, "  = note: reported by the engine ({internal})");
        }
        let _ = writeln!(out);
    }

    for failure in &report.failures {
        let _ = writeln!(out, "\x1b[31mfailed\x1b[0m {failure}\n");
    }

    let summary_color = if errors > 0 || !report.failures.is_empty() {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    let _ = writeln!(out, "{summary_color}{}\x1b[0m", report.summary());
    out
}

fn render_compact(report: &ValidationReport) -> String {
    let mut out = String::new();
    for message in &report.messages {
        let _ = writeln!(out, "{message}");
    }
    for failure in &report.failures {
        let _ = writeln!(out, "{}: failed [{}] {}", failure.unit.display(), failure.stage, failure.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_lint_core::{
        Category, FailureStage, ObjectPath, UnitFailure, ValidationMessage,
    };
    use std::path::PathBuf;

    fn report() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.documents_checked = 2;
        report.messages.push(ValidationMessage {
            rule_id: "R1001".into(),
            rule_name: "OperationIdNounVerb".into(),
            severity: Severity::Warning,
            category: Category::None,
            file: PathBuf::from("pets.json"),
            path: ["paths", "/pets", "get", "operationId"].into_iter().collect::<ObjectPath>(),
            message: "OperationId 'GetPets' should be of the form 'Noun_Verb'".into(),
            internal: None,
        });
        report.failures.push(UnitFailure {
            unit: PathBuf::from("broken.json"),
            stage: FailureStage::Load,
            message: "expected value at line 1 column 1".into(),
        });
        report
    }

    #[test]
    fn compact_output() {
        insta::assert_snapshot!(render(&report(), OutputFormat::Compact).unwrap(), @r"
        pets.json#/paths/~1pets/get/operationId: warning [R1001] OperationId 'GetPets' should be of the form 'Noun_Verb'
        broken.json: failed [load] expected value at line 1 column 1
        ");
    }

    #[test]
    fn json_output_is_camel_case() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&report(), OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["documentsChecked"], 2);
        assert_eq!(json["messages"][0]["ruleId"], "R1001");
        assert_eq!(json["failures"][0]["stage"], "load");
    }

    #[test]
    fn text_output_ends_with_summary() {
        let text = render(&report(), OutputFormat::Text).unwrap();
        assert!(text.contains("R1001 OperationIdNounVerb at pets.json#/paths/~1pets/get/operationId"));
        assert!(text.contains("Found 0 error(s), 1 warning(s), 0 info(s) in 2 document(s); 1 unit(s) failed"));
    }
}
