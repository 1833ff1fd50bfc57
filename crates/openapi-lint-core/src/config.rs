//! Configuration types for openapi-lint.

use crate::metadata::{FileSource, HttpSource, MetadataSource};
use crate::types::{DocumentKind, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for openapi-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "naming").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: "error").
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Declared kind of the documents being checked.
    #[serde(default)]
    pub document_kind: Option<DocumentKind>,

    /// Validator configuration.
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Where rule metadata comes from.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Per-rule configurations, keyed by rule id or name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Configuration for a rule, looked up by id first, then by name.
    #[must_use]
    pub fn rule_config(&self, id: &str, name: &str) -> Option<&RuleConfig> {
        self.rules.get(id).or_else(|| self.rules.get(name))
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, id: &str, name: &str) -> bool {
        self.rule_config(id, name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, id: &str, name: &str) -> Option<Severity> {
        self.rule_config(id, name).and_then(|c| c.severity)
    }

    /// Threshold at which a report fails.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Declared document kind, `default` when unset.
    #[must_use]
    pub fn document_kind(&self) -> DocumentKind {
        self.document_kind.unwrap_or_default()
    }
}

/// Validator-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Glob patterns to exclude from discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Run individual passes in parallel.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Report dangling and cyclic `$ref`s.
    #[serde(default = "default_true")]
    pub check_references: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["**/node_modules/**".to_string()],
            parallel: true,
            check_references: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Rule metadata source configuration. `file` wins over `url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// URL of a metadata JSON list.
    #[serde(default)]
    pub url: Option<String>,

    /// Local metadata JSON list.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Request timeout for `url`, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl MetadataConfig {
    /// Builds the configured source, if any.
    #[must_use]
    pub fn source(&self) -> Option<Box<dyn MetadataSource>> {
        if let Some(file) = &self.file {
            return Some(Box::new(FileSource::new(file.clone())));
        }
        self.url.as_ref().map(|url| {
            let mut source = HttpSource::new(url.clone());
            if let Some(secs) = self.timeout_secs {
                source = source.with_timeout(Duration::from_secs(secs));
            }
            Box::new(source) as Box<dyn MetadataSource>
        })
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::parse(
            r#"
            preset = "recommended"
            fail_on = "warning"
            document_kind = "arm"

            [validator]
            exclude = ["**/examples/**"]
            parallel = false

            [metadata]
            url = "https://example.invalid/metadata.json"
            timeout_secs = 3

            [rules.R1005]
            severity = "error"

            [rules.ValidFormats]
            extra_formats = ["uuid-v7"]

            [rules.R2055]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.fail_on(), Severity::Warning);
        assert_eq!(config.document_kind(), DocumentKind::Arm);
        assert!(!config.validator.parallel);
        assert!(config.validator.check_references);
        assert_eq!(config.validator.exclude, vec!["**/examples/**"]);
        assert_eq!(config.rule_severity("R1005", "GetInOperationName"), Some(Severity::Error));
        assert!(!config.is_rule_enabled("R2055", "OneUnderscoreInOperationId"));
        assert!(config.is_rule_enabled("R1001", "OperationIdNounVerb"));
        assert_eq!(
            config
                .rule_config("R2003", "ValidFormats")
                .unwrap()
                .get_str_array("extra_formats"),
            vec!["uuid-v7"]
        );
        assert!(config.metadata.source().is_some());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fail_on(), Severity::Error);
        assert_eq!(config.document_kind(), DocumentKind::Default);
        assert!(config.validator.parallel);
        assert!(config.metadata.source().is_none());
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("preset = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
