//! # openapi-lint-core
//!
//! Core framework for convention linting of Swagger 2.0 / OpenAPI documents.
//!
//! This crate provides the foundational traits and types for building
//! convention rules. It includes:
//!
//! - [`ServiceDefinition`] and [`Node`], the read-only document model
//! - [`Resolver`] for cycle-safe `$ref` resolution across documents
//! - [`RuleContext`] tracking the path and ancestors of the current node
//! - [`PredicateRule`], [`GeneratorRule`] and [`ExtensionRule`] capability traits
//! - [`Validator`] running individual passes and the composed pass
//! - [`MetadataStore`] for once-per-process rule metadata overrides
//!
//! ## Example
//!
//! ```ignore
//! use openapi_lint_core::{RuleBinding, Validator};
//!
//! let validator = Validator::builder()
//!     .rule(RuleBinding::predicate(MyRule))
//!     .build()?;
//!
//! let report = validator.validate_paths(&["./specification".into()])?;
//! println!("{}", report.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod dispatch;
mod document;
mod merge;
mod metadata;
mod registry;
mod rule;
mod types;
mod validator;

/// Normalized document model.
pub mod model;
/// Node variants and rule targets.
pub mod node;
/// Object paths and JSON pointers.
pub mod path;
/// `$ref` parsing and resolution.
pub mod reference;

pub use config::{Config, ConfigError, MetadataConfig, RuleConfig, ValidatorConfig};
pub use context::{PassScope, RuleContext};
pub use dispatch::{Collector, Dispatcher};
pub use document::{discover_documents, should_exclude, Document, DocumentError};
pub use merge::{merge, MergeError, MergedView};
pub use metadata::{
    global_store, FileSource, HttpSource, MetadataEntry, MetadataError, MetadataSource,
    MetadataStore, MetadataTable, RuleMetadata, StaticSource,
};
pub use model::{
    MalformedDocument, Operation, OrderedMap, Parameter, ParameterLocation, Response, Schema,
    SecurityDefinition, ServiceDefinition,
};
pub use node::{Extension, ExtensionValue, Node, NodeKind, PathsMap, PropertiesMap, Scalar, Target};
pub use path::{ObjectPath, Segment};
pub use reference::{Reference, ReferenceFailure, Resolved, Resolver};
pub use registry::{RegisteredRule, RegistryError, RuleDescriptor, RuleRegistry};
pub use rule::{
    findings_from, ExtensionRule, Finding, Findings, GeneratorRule, PredicateRule, Rule,
    RuleBinding, RuleError, RuleShape, Verdict,
};
pub use types::{
    render_template, Category, DocumentKind, DocumentKinds, FailureStage, Impact, InternalKind,
    MergeState, Severity, UnitFailure, ValidationMessage, ValidationReport,
};
pub use validator::{Validator, ValidatorBuilder, ValidatorError};
