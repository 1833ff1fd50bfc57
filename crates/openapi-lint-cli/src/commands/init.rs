//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# openapi-lint configuration

# Rule preset: "recommended" (all rules) or "naming" (operation id rules)
preset = "recommended"

# Lowest severity that makes `openapi-lint check` exit with status 1
fail_on = "error"

# Kind of the documents: "default", "arm" or "data-plane"
document_kind = "default"

[validator]
# Glob patterns to exclude when walking directories
exclude = [
    "**/node_modules/**",
    "**/examples/**",
]

# Validate documents of a group in parallel
parallel = true

# Report dangling and cyclic $refs
check_references = true

# Rule metadata (severity, category, document kinds) overrides.
# A missing or unreachable source leaves compiled-in defaults in place.
[metadata]
# url = "https://example.com/rules-metadata.json"
# file = "rules-metadata.json"
# timeout_secs = 10

# Rule configurations, keyed by rule id or name.
# Each rule can be disabled or have its severity overridden.

[rules.R2055]
enabled = true
# severity = "warning"

# [rules.ValidFormats]
# extra_formats = ["arm-id"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("openapi-lint.toml"), force)?;

    println!("Created openapi-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit openapi-lint.toml to configure rules");
    println!("  2. Run: openapi-lint check ./specification");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
