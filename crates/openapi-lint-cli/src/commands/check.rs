//! Check command implementation.

use anyhow::{Context, Result};
use openapi_lint_core::{global_store, Config, DocumentKind, MetadataTable, Validator};
use openapi_lint_rules::Preset;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line options of `check`.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Document kind override.
    pub kind: Option<DocumentKind>,
    /// Report format.
    pub format: OutputFormat,
    /// Comma-separated rule ids or names to run.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Disable parallel individual passes.
    pub sequential: bool,
    /// Disable `$ref` checks.
    pub no_references: bool,
}

/// Runs the check command.
pub fn run(paths: &[PathBuf], options: CheckOptions, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    let fail_on = config.fail_on();

    let validator = build_validator(config, &options)?;
    tracing::info!("Checking {:?} with {} rules", paths, validator.rule_count());

    let report = validator
        .validate_paths(paths)
        .context("Failed to collect documents")?;

    super::output::print(&report, options.format)?;

    // Exit with error code when the report reaches the configured threshold
    if report.fails_at(fail_on) {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Builds the validator for `config` and the command-line overrides.
pub(crate) fn build_validator(config: Config, options: &CheckOptions) -> Result<Validator> {
    let preset = match config.preset.as_deref() {
        Some(name) => name.parse::<Preset>().unwrap_or_else(|e| {
            tracing::warn!("{e}, using {}", Preset::default());
            Preset::default()
        }),
        None => Preset::default(),
    };

    let mut builder = Validator::builder().rules(preset.configured_rules(&config));

    if let Some(table) = load_metadata(&config) {
        builder = builder.metadata(table);
    }
    if let Some(filter) = &options.rules {
        let selection = filter
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        builder = builder.only(selection);
    }
    for pattern in &options.exclude {
        builder = builder.exclude(pattern.clone());
    }
    if let Some(kind) = options.kind {
        builder = builder.document_kind(kind);
    }
    if options.sequential {
        builder = builder.parallel(false);
    }
    if options.no_references {
        builder = builder.check_references(false);
    }

    builder
        .config(config)
        .build()
        .context("Failed to build validator")
}

/// Initializes the process-wide metadata store from the configured source.
fn load_metadata(config: &Config) -> Option<MetadataTable> {
    let source = config.metadata.source()?;
    let table = global_store().initialize(source.as_ref());
    tracing::debug!("Loaded metadata for {} rule(s)", table.len());
    Some(table.clone())
}

/// Resolves the directory config is looked up in.
#[must_use]
pub fn project_dir(paths: &[PathBuf]) -> &Path {
    match paths {
        [single] if single.is_dir() => single,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_lint_core::{Document, Severity};
    use serde_json::json;

    #[test]
    fn rule_filter_limits_registry() {
        let options = CheckOptions {
            rules: Some("R1005, OneUnderscoreInOperationId".into()),
            ..CheckOptions::default()
        };
        let validator = build_validator(Config::default(), &options).unwrap();
        let ids: Vec<_> = validator.registry().descriptors().map(|d| d.id).collect();
        assert_eq!(ids, vec!["R1005", "R2055"]);
    }

    #[test]
    fn naming_preset_from_config() {
        let config = Config::parse("preset = \"naming\"").unwrap();
        let validator = build_validator(config, &CheckOptions::default()).unwrap();
        assert_eq!(validator.rule_count(), 6);
    }

    #[test]
    fn config_severity_applies() {
        let config = Config::parse(
            r#"
[rules.OperationIdNounVerb]
severity = "error"
"#,
        )
        .unwrap();
        let validator = build_validator(config, &CheckOptions::default()).unwrap();
        let document = Document::from_value(
            "pets.json",
            &json!({ "paths": { "/pets": { "get": { "operationId": "GetPets" } } } }),
        )
        .unwrap();
        let report = validator.validate(&[document]);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].severity, Severity::Error);
        assert!(report.fails_at(Severity::Error));
    }

    #[test]
    fn project_dir_uses_single_directory_argument() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = vec![tmp.path().to_path_buf()];
        assert_eq!(project_dir(&paths), tmp.path());
        assert_eq!(project_dir(&[PathBuf::from("a.json")]), Path::new("."));
    }
}
