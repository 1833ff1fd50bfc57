//! Orchestrates individual and composed validation passes.

use crate::config::{Config, ConfigError};
use crate::context::PassScope;
use crate::dispatch::{Collector, Dispatcher};
use crate::document::{discover_documents, Document, DocumentError};
use crate::merge::merge;
use crate::metadata::MetadataTable;
use crate::reference::Source;
use crate::registry::{RegistryError, RuleRegistry};
use crate::rule::RuleBinding;
use crate::types::{
    DocumentKind, DocumentKinds, FailureStage, MergeState, UnitFailure, ValidationMessage,
    ValidationReport,
};
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that prevent validation from starting.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Two rules share an id.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An input path could not be discovered.
    #[error(transparent)]
    Discovery(#[from] DocumentError),
}

/// Builder for configuring a [`Validator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    rules: Vec<RuleBinding>,
    config: Option<Config>,
    metadata: Option<MetadataTable>,
    document_kind: Option<DocumentKind>,
    selection: Option<Vec<String>>,
    exclude_patterns: Vec<String>,
    parallel: Option<bool>,
    check_references: Option<bool>,
}

impl ValidatorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, binding: RuleBinding) -> Self {
        self.rules.push(binding);
        self
    }

    /// Adds several rules.
    #[must_use]
    pub fn rules<I: IntoIterator<Item = RuleBinding>>(mut self, bindings: I) -> Self {
        self.rules.extend(bindings);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets rule metadata overrides.
    #[must_use]
    pub fn metadata(mut self, table: MetadataTable) -> Self {
        self.metadata = Some(table);
        self
    }

    /// Declares the kind of the documents, overriding configuration.
    #[must_use]
    pub fn document_kind(mut self, kind: DocumentKind) -> Self {
        self.document_kind = Some(kind);
        self
    }

    /// Runs only the listed rules (ids or names).
    #[must_use]
    pub fn only(mut self, selection: Vec<String>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Adds an exclude glob pattern for directory discovery.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets whether individual passes run in parallel, overriding configuration.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Sets whether `$ref`s are checked, overriding configuration.
    #[must_use]
    pub fn check_references(mut self, check: bool) -> Self {
        self.check_references = Some(check);
        self
    }

    /// Builds the validator, resolving every rule's effective descriptor.
    ///
    /// Precedence: compiled-in default, then metadata, then configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share an id.
    pub fn build(self) -> Result<Validator, ValidatorError> {
        let config = self.config.unwrap_or_default();

        let mut registry = RuleRegistry::new();
        for binding in self.rules {
            registry.register(binding)?;
        }
        if let Some(table) = &self.metadata {
            registry.apply_metadata(|id| table.get(id).copied().unwrap_or_default());
        }
        registry.apply_config(&config);
        if let Some(selection) = &self.selection {
            registry.retain_only(selection);
        }

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.validator.exclude.iter().cloned());

        let kind = self.document_kind.unwrap_or_else(|| config.document_kind());
        debug!("Built validator with {} rule(s) for {kind:?} documents", registry.len());

        Ok(Validator {
            registry,
            kinds: kind.kinds(),
            exclude_patterns,
            parallel: self.parallel.unwrap_or(config.validator.parallel),
            check_references: self
                .check_references
                .unwrap_or(config.validator.check_references),
        })
    }
}

/// Runs registered rules over documents.
///
/// Use [`Validator::builder()`] to construct an instance.
pub struct Validator {
    registry: RuleRegistry,
    kinds: DocumentKinds,
    exclude_patterns: Vec<String>,
    parallel: bool,
    check_references: bool,
}

impl Validator {
    /// Creates a new builder for configuring a validator.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// The registered rules with their effective descriptors.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Validates already loaded documents as one merge group.
    ///
    /// Individual-pass messages come first, in document order, followed by
    /// the composed pass's messages.
    #[must_use]
    pub fn validate(&self, documents: &[Document]) -> ValidationReport {
        info!("Validating {} document(s) with {} rule(s)", documents.len(), self.registry.len());

        let mut report = ValidationReport::new();
        report.documents_checked = documents.len();
        report.messages = self.individual_passes(documents);

        if !documents.is_empty() {
            match self.composed_pass(documents) {
                Ok(messages) => report.messages.extend(messages),
                Err(failure) => {
                    warn!("Composed pass skipped: {}", failure.message);
                    report.failures.push(failure);
                }
            }
        }

        info!("Validation complete: {}", report.summary());
        report
    }

    /// Loads and validates files. Files that fail to load are recorded as
    /// unit failures; the rest are still validated.
    #[must_use]
    pub fn validate_files(&self, files: &[PathBuf]) -> ValidationReport {
        let loaded: Vec<Result<Document, DocumentError>> = if self.parallel {
            files.par_iter().map(|f| Document::from_file(f)).collect()
        } else {
            files.iter().map(|f| Document::from_file(f)).collect()
        };

        let mut documents = Vec::with_capacity(loaded.len());
        let mut failures = Vec::new();
        for (file, result) in files.iter().zip(loaded) {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Failed to load {}: {e}", file.display());
                    failures.push(UnitFailure {
                        unit: file.clone(),
                        stage: FailureStage::Load,
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut report = self.validate(&documents);
        failures.append(&mut report.failures);
        report.failures = failures;
        report
    }

    /// Expands directories into their `*.json` files (applying excludes),
    /// keeps explicit files as given, and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be walked.
    pub fn validate_paths(&self, inputs: &[PathBuf]) -> Result<ValidationReport, ValidatorError> {
        let files = self.collect_files(inputs)?;
        info!("Found {} document(s) to validate", files.len());
        Ok(self.validate_files(&files))
    }

    fn collect_files(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ValidatorError> {
        let mut files = Vec::new();
        for input in inputs {
            if input.is_dir() {
                files.extend(discover_documents(input, &self.exclude_patterns)?);
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }

    fn individual_passes(&self, documents: &[Document]) -> Vec<ValidationMessage> {
        let dispatcher = Dispatcher::new(&self.registry, MergeState::Individual, self.kinds)
            .check_references(self.check_references);
        let group = sources(documents);

        let run = |document: &Document| {
            debug!("Individual pass: {}", document.path().display());
            let scope =
                PassScope::individual(document.path(), document.definition(), self.kinds, &group);
            let mut collector = Collector::new();
            dispatcher.run(&scope, &mut collector);
            collector.into_messages()
        };

        let per_document: Vec<Vec<ValidationMessage>> = if self.parallel {
            documents.par_iter().map(run).collect()
        } else {
            documents.iter().map(run).collect()
        };
        per_document.into_iter().flatten().collect()
    }

    fn composed_pass(&self, documents: &[Document]) -> Result<Vec<ValidationMessage>, UnitFailure> {
        let dispatcher = Dispatcher::new(&self.registry, MergeState::Composed, self.kinds);
        if dispatcher.rule_count() == 0 {
            debug!("No composed rules selected, skipping merge");
            return Ok(Vec::new());
        }

        let view = merge(documents).map_err(|e| UnitFailure {
            unit: documents
                .first()
                .map(|d| d.path().to_path_buf())
                .unwrap_or_default(),
            stage: FailureStage::Merge,
            message: e.to_string(),
        })?;
        debug!("Composed pass over {} document(s)", view.files().len());

        let group = sources(documents);
        let scope = PassScope::composed(&view, self.kinds, &group);

        let mut collector = Collector::new();
        dispatcher.run(&scope, &mut collector);
        Ok(collector
            .into_messages()
            .into_iter()
            .map(|mut message| {
                message.file = view.origin_of(&message.path).to_path_buf();
                message
            })
            .collect())
    }

    /// Directory-walk exclude patterns in effect.
    #[must_use]
    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Kinds the documents are validated as.
    #[must_use]
    pub fn document_kinds(&self) -> DocumentKinds {
        self.kinds
    }
}

fn sources(documents: &[Document]) -> Vec<Source<'_>> {
    documents
        .iter()
        .map(|d| Source {
            file: d.path(),
            definition: d.definition(),
        })
        .collect()
}
