//! Locating the configuration file.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config <path>`, trusted as given
//! 2. `openapi-lint.toml`, then `.openapi-lint.toml`, in the project directory
//! 3. `config.toml` in `$OPENAPI_LINT_CONFIG_DIR`, else in `~/.openapi-lint/`
//! 4. built-in defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the documents.
    Project(PathBuf),
    /// Found in the user-wide config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// The file to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// True for [`ConfigSource::Global`].
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_FILES: [&str; 2] = ["openapi-lint.toml", ".openapi-lint.toml"];
const GLOBAL_FILE: &str = "config.toml";
const CONFIG_DIR_VAR: &str = "OPENAPI_LINT_CONFIG_DIR";

/// Resolves the configuration for documents under `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    lookup(project_dir, explicit, global_config_dir().as_deref())
}

fn lookup(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = PROJECT_FILES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_FILE)) {
        Some(found) if found.is_file() => {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        }
        _ => ConfigSource::Default,
    }
}

/// The user-wide config directory: `$OPENAPI_LINT_CONFIG_DIR`, else
/// `~/.openapi-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_VAR) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|home| home.join(".openapi-lint")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn explicit_path_wins_even_if_missing() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "openapi-lint.toml");

        let explicit = Path::new("/nonexistent/openapi-lint.toml");
        assert_eq!(
            lookup(project.path(), Some(explicit), None),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn plain_name_is_preferred_over_dotfile() {
        let project = TempDir::new().unwrap();
        touch(project.path(), ".openapi-lint.toml");
        assert_eq!(
            lookup(project.path(), None, None),
            ConfigSource::Project(project.path().join(".openapi-lint.toml"))
        );

        let plain = touch(project.path(), "openapi-lint.toml");
        assert_eq!(lookup(project.path(), None, None), ConfigSource::Project(plain));
    }

    #[test]
    fn global_config_is_a_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            lookup(project.path(), None, Some(global.path())),
            ConfigSource::Default
        );

        let global_file = touch(global.path(), "config.toml");
        let found = lookup(project.path(), None, Some(global.path()));
        assert!(found.is_global());
        assert_eq!(found.path(), Some(global_file.as_path()));

        touch(project.path(), "openapi-lint.toml");
        assert!(matches!(
            lookup(project.path(), None, Some(global.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn default_has_no_path() {
        assert!(ConfigSource::Default.path().is_none());
        assert!(!ConfigSource::Default.is_global());
    }
}
