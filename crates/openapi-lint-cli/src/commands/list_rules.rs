//! List rules command implementation.

use openapi_lint_rules::{all_rules, naming_rules, RuleBinding};
use std::fmt::Write;

/// Runs the list-rules command.
pub fn run() {
    print!("{}", render(&all_rules()));
}

fn render(rules: &[RuleBinding]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available rules:\n");
    let _ = writeln!(
        out,
        "{:<7} {:<36} {:<20} {:<11} Description",
        "Id", "Name", "Target", "Merge"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for binding in rules {
        let rule = binding.rule();
        let target = match binding.key() {
            Some(key) => format!("{} {key}", binding.target()),
            None => binding.target().to_string(),
        };
        let _ = writeln!(
            out,
            "{:<7} {:<36} {:<20} {:<11} {}",
            rule.id(),
            rule.name(),
            target,
            rule.merge_state().to_string(),
            rule.description()
        );
    }

    let naming: Vec<&str> = naming_rules().iter().map(|r| r.rule().id()).collect();
    let _ = writeln!(out, "\nPresets:");
    let _ = writeln!(out, "  recommended  - all rules (default)");
    let _ = writeln!(out, "  naming       - {}", naming.join(", "));

    let _ = writeln!(out, "\nUse --rules to filter specific rules, e.g.:");
    let _ = writeln!(out, "  openapi-lint check --rules R1005,R2017 ./specification");
    out
}
