//! Loading specification documents from disk.

use crate::model::{MalformedDocument, ServiceDefinition};
use miette::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors that make a single document unusable.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(openapi_lint::io))]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    #[diagnostic(code(openapi_lint::json), help("specification documents must be JSON"))]
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The JSON is not shaped like a specification document.
    #[error("{path}: {source}")]
    #[diagnostic(
        code(openapi_lint::malformed_document),
        help("check the member named by the pointer against the Swagger 2.0 schema")
    )]
    Malformed {
        /// Offending file.
        path: PathBuf,
        /// Where and why.
        source: MalformedDocument,
    },

    /// Directory walk failed.
    #[error("failed to walk {path}: {message}")]
    #[diagnostic(code(openapi_lint::discovery))]
    Walk {
        /// Root being walked.
        path: PathBuf,
        /// Walk error message.
        message: String,
    },
}

/// One loaded specification document.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    definition: ServiceDefinition,
}

impl Document {
    /// Wraps an already built model.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, definition: ServiceDefinition) -> Self {
        Self {
            path: path.into(),
            definition,
        }
    }

    /// Builds a document from a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the value is not shaped like a
    /// specification document.
    pub fn from_value(
        path: impl Into<PathBuf>,
        value: &serde_json::Value,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        match ServiceDefinition::from_value(value) {
            Ok(definition) => Ok(Self { path, definition }),
            Err(source) => Err(DocumentError::Malformed { path, source }),
        }
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a Swagger document.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, DocumentError> {
        let path = path.into();
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(source) => return Err(DocumentError::Json { path, source }),
        };
        Self::from_value(path, &value)
    }

    /// Reads and parses a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        debug!("Loading: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// The file this document was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document model.
    #[must_use]
    pub fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }
}

/// Collects `*.json` files under `root`, skipping paths that match any of
/// the `exclude` glob patterns. The result is sorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked.
pub fn discover_documents(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>, DocumentError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| DocumentError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("json")
        {
            continue;
        }
        if should_exclude(path, exclude) {
            debug!("Excluding: {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Checks a path against exclude globs.
///
/// Patterns such as `**/generated/**` also match as a plain substring so that
/// absolute and relative paths behave the same.
#[must_use]
pub fn should_exclude(path: &Path, exclude: &[String]) -> bool {
    let path_str = path.to_string_lossy();

    exclude.iter().any(|pattern| {
        if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
            if glob_pattern.matches(&path_str) {
                return true;
            }
        }
        let normalized = pattern.replace("**", "");
        !normalized.is_empty() && normalized != "/" && path_str.contains(&normalized)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_reports_json_errors() {
        let err = Document::parse("broken.json", "{ not json").unwrap_err();
        assert!(matches!(err, DocumentError::Json { .. }));
    }

    #[test]
    fn parse_reports_malformed_structure() {
        let err = Document::parse("a.json", r#"{ "paths": [] }"#).unwrap_err();
        match err {
            DocumentError::Malformed { path, source } => {
                assert_eq!(path, PathBuf::from("a.json"));
                assert_eq!(source.pointer, "/paths");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_error_carries_diagnostic_code() {
        let err = Document::parse("a.json", "[]").unwrap_err();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("openapi_lint::malformed_document"));
    }

    #[test]
    fn discovers_json_files_and_applies_excludes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("specs/generated")).unwrap();
        fs::write(tmp.path().join("specs/b.json"), "{}").unwrap();
        fs::write(tmp.path().join("specs/a.json"), "{}").unwrap();
        fs::write(tmp.path().join("specs/readme.md"), "").unwrap();
        fs::write(tmp.path().join("specs/generated/c.json"), "{}").unwrap();

        let files = discover_documents(tmp.path(), &["**/generated/**".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("specs/a.json"), PathBuf::from("specs/b.json")]
        );
    }

    #[test]
    fn exclude_matches_glob_and_substring() {
        let exclude = vec!["**/generated/**".to_string()];
        assert!(should_exclude(Path::new("/repo/specs/generated/x.json"), &exclude));
        assert!(should_exclude(Path::new("specs/generated/x.json"), &exclude));
        assert!(!should_exclude(Path::new("/repo/specs/x.json"), &exclude));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = Document::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
