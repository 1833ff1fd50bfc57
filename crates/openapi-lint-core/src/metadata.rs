//! Per-rule metadata overrides, fetched once per process.
//!
//! Metadata is a JSON list of entries:
//!
//! ```json
//! [{ "id": "R1005", "severity": "warning", "validationCategory": "sdkviolation",
//!    "serviceDefinitionDocumentType": ["arm"], "serviceDefinitionDocumentState": "individual",
//!    "validationChangesImpact": "sdkimpactingchanges" }]
//! ```
//!
//! A [`MetadataStore`] is initialized once from a [`MetadataSource`]. Fetch
//! failures are logged and leave the store empty, so every rule keeps its
//! compiled-in defaults.

use crate::types::{Category, DocumentKinds, Impact, MergeState, Severity};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for [`HttpSource`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One raw metadata entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataEntry {
    /// Rule id.
    #[serde(alias = "Id")]
    pub id: String,
    /// Category name.
    #[serde(default, rename = "validationCategory", alias = "ValidationCategory")]
    pub validation_category: Option<String>,
    /// Severity name.
    #[serde(default, alias = "Severity")]
    pub severity: Option<String>,
    /// Document kind names.
    #[serde(
        default,
        rename = "serviceDefinitionDocumentType",
        alias = "ServiceDefinitionDocumentType"
    )]
    pub document_types: Option<Vec<String>>,
    /// Merge state name.
    #[serde(
        default,
        rename = "serviceDefinitionDocumentState",
        alias = "ServiceDefinitionDocumentState"
    )]
    pub document_state: Option<String>,
    /// Impact name.
    #[serde(default, rename = "validationChangesImpact", alias = "ValidationChangesImpact")]
    pub changes_impact: Option<String>,
}

/// Parsed overrides for one rule. `None` keeps the rule's own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleMetadata {
    /// Severity override.
    pub severity: Option<Severity>,
    /// Category override.
    pub category: Option<Category>,
    /// Document kinds override.
    pub document_kinds: Option<DocumentKinds>,
    /// Merge state override.
    pub merge_state: Option<MergeState>,
    /// Impact override.
    pub impact: Option<Impact>,
}

impl From<&MetadataEntry> for RuleMetadata {
    fn from(entry: &MetadataEntry) -> Self {
        // Listed kinds widen the default applicability, they never narrow it.
        let document_kinds = entry.document_types.as_deref().map(|types| {
            types.iter().fold(DocumentKinds::DEFAULT, |kinds, name| {
                kinds | DocumentKinds::from_metadata(name).unwrap_or(DocumentKinds::DEFAULT)
            })
        });

        Self {
            severity: entry.severity.as_deref().and_then(Severity::from_metadata),
            category: entry
                .validation_category
                .as_deref()
                .and_then(Category::from_metadata),
            document_kinds,
            merge_state: entry
                .document_state
                .as_deref()
                .and_then(MergeState::from_metadata),
            impact: entry.changes_impact.as_deref().and_then(Impact::from_metadata),
        }
    }
}

/// Metadata keyed by rule id.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: HashMap<String, RuleMetadata>,
}

impl MetadataTable {
    /// Builds a table. The first entry for an id wins.
    #[must_use]
    pub fn from_entries(entries: &[MetadataEntry]) -> Self {
        let mut table = HashMap::with_capacity(entries.len());
        for entry in entries {
            if table.contains_key(&entry.id) {
                debug!("Ignoring duplicate metadata entry for {}", entry.id);
                continue;
            }
            table.insert(entry.id.clone(), RuleMetadata::from(entry));
        }
        Self { entries: table }
    }

    /// Parses a JSON entry list.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON list of entries.
    pub fn parse(json: &str) -> Result<Self, MetadataError> {
        let entries: Vec<MetadataEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(&entries))
    }

    /// Overrides for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RuleMetadata> {
        self.entries.get(id)
    }

    /// Number of rules with metadata.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no rule has metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors fetching metadata. Never fatal to validation.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// HTTP request failed or timed out.
    #[error("failed to fetch rule metadata from {url}: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying error.
        source: reqwest::Error,
    },

    /// Metadata file could not be read.
    #[error("failed to read rule metadata {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Payload is not a JSON entry list.
    #[error("invalid rule metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Somewhere metadata can be fetched from.
pub trait MetadataSource: Send + Sync {
    /// Human-readable origin for logs.
    fn describe(&self) -> String;

    /// Fetches the whole table.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable or the payload invalid.
    fn fetch(&self) -> Result<MetadataTable, MetadataError>;
}

/// Fetches metadata over HTTP with a timeout.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    /// Source for `url` with [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl MetadataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<MetadataTable, MetadataError> {
        let http = |source: reqwest::Error| MetadataError::Http {
            url: self.url.clone(),
            source,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(http)?;
        let body = client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(http)?;
        MetadataTable::parse(&body)
    }
}

/// Reads metadata from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file read by this source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<MetadataTable, MetadataError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })?;
        MetadataTable::parse(&text)
    }
}

/// A fixed table, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    table: MetadataTable,
}

impl StaticSource {
    /// Source that always yields `table`.
    #[must_use]
    pub fn new(table: MetadataTable) -> Self {
        Self { table }
    }

    /// Source with no metadata.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl MetadataSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    fn fetch(&self) -> Result<MetadataTable, MetadataError> {
        Ok(self.table.clone())
    }
}

/// Once-initialized metadata table.
///
/// The first [`MetadataStore::initialize`] performs the fetch; concurrent
/// callers block until it finishes and later calls return the same table.
#[derive(Debug, Default)]
pub struct MetadataStore {
    table: OnceLock<MetadataTable>,
}

impl MetadataStore {
    /// An uninitialized store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: OnceLock::new(),
        }
    }

    /// Fetches metadata from `source` unless already initialized.
    ///
    /// Never fails: an unreachable or invalid source leaves the table empty.
    pub fn initialize(&self, source: &dyn MetadataSource) -> &MetadataTable {
        self.table.get_or_init(|| match source.fetch() {
            Ok(table) => {
                info!("Loaded metadata for {} rule(s) from {}", table.len(), source.describe());
                table
            }
            Err(e) => {
                warn!("Rule metadata unavailable, using defaults: {e}");
                MetadataTable::default()
            }
        })
    }

    /// True once [`MetadataStore::initialize`] has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.table.get().is_some()
    }

    /// Overrides for `id`; empty before initialization or when absent.
    #[must_use]
    pub fn lookup(&self, id: &str) -> RuleMetadata {
        self.table
            .get()
            .and_then(|table| table.get(id))
            .copied()
            .unwrap_or_default()
    }
}

/// The process-wide store used by the CLI.
#[must_use]
pub fn global_store() -> &'static MetadataStore {
    static STORE: MetadataStore = MetadataStore::new();
    &STORE
}
