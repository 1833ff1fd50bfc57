//! End-to-end behavior of the validation engine with test-only rules.

use openapi_lint_core::{
    findings_from, Category, Document, DocumentKind, Finding, Findings, GeneratorRule, HttpSource,
    InternalKind, MergeState, MetadataStore, MetadataTable, Operation, PredicateRule, Rule,
    RuleBinding, RuleContext, RuleError, Scalar, Schema, Severity, StaticSource, ValidationReport,
    Validator, Verdict,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Flags every definition named `Shared`.
struct SharedDefinition(MergeState);

impl Rule for SharedDefinition {
    fn id(&self) -> &'static str {
        "T100"
    }
    fn name(&self) -> &'static str {
        "SharedDefinition"
    }
    fn message_template(&self) -> &'static str {
        "definition '{0}' found"
    }
    fn merge_state(&self) -> MergeState {
        self.0
    }
}

impl GeneratorRule for SharedDefinition {
    type Target = Schema;

    fn findings<'a>(&'a self, _: &'a Schema, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let segments = ctx.path().segments();
        let is_definition =
            segments.len() == 2 && segments[0].as_property() == Some("definitions");
        if is_definition && ctx.key_str() == Some("Shared") {
            findings_from(vec![Finding::at(ctx, ["Shared"])])
        } else {
            findings_from(Vec::new())
        }
    }
}

/// Flags every operation id, always.
struct EveryOperationId;

impl Rule for EveryOperationId {
    fn id(&self) -> &'static str {
        "T101"
    }
    fn name(&self) -> &'static str {
        "EveryOperationId"
    }
    fn message_template(&self) -> &'static str {
        "operation id '{0}'"
    }
    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for EveryOperationId {
    type Target = Scalar;

    fn is_valid<'a>(&self, value: &'a str, _: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Ok(Verdict::invalid([value]))
    }
}

/// Panics on every operation.
struct AlwaysPanics;

impl Rule for AlwaysPanics {
    fn id(&self) -> &'static str {
        "T102"
    }
    fn name(&self) -> &'static str {
        "AlwaysPanics"
    }
    fn message_template(&self) -> &'static str {
        "never rendered"
    }
}

impl PredicateRule for AlwaysPanics {
    type Target = Operation;

    fn is_valid<'a>(&self, _: &'a Operation, _: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        panic!("rule bug")
    }
}

/// Returns an error on every operation.
struct AlwaysErrors;

impl Rule for AlwaysErrors {
    fn id(&self) -> &'static str {
        "T103"
    }
    fn name(&self) -> &'static str {
        "AlwaysErrors"
    }
    fn message_template(&self) -> &'static str {
        "never rendered"
    }
}

impl PredicateRule for AlwaysErrors {
    type Target = Operation;

    fn is_valid<'a>(&self, _: &'a Operation, _: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Err(RuleError::Failed("cannot decide".into()))
    }
}

/// Flags top-level definitions whose `$ref` chain does not resolve.
struct UnresolvedDefinition(MergeState);

impl Rule for UnresolvedDefinition {
    fn id(&self) -> &'static str {
        "T104"
    }
    fn name(&self) -> &'static str {
        "UnresolvedDefinition"
    }
    fn message_template(&self) -> &'static str {
        "definition '{0}' does not resolve"
    }
    fn merge_state(&self) -> MergeState {
        self.0
    }
}

impl GeneratorRule for UnresolvedDefinition {
    type Target = Schema;

    fn findings<'a>(&'a self, schema: &'a Schema, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let segments = ctx.path().segments();
        let top_level = segments.len() == 2 && segments[0].as_property() == Some("definitions");
        if top_level && ctx.resolver().unwrap_schema(schema).is_err() {
            findings_from(vec![Finding::at(ctx, [ctx.key_str().unwrap_or_default()])])
        } else {
            findings_from(Vec::new())
        }
    }
}

fn pets_document(name: &str, operation_id: &str) -> Value {
    json!({
        "swagger": "2.0",
        "paths": {
            format!("/{name}"): {
                "get": {
                    "operationId": operation_id,
                    "responses": { "200": { "schema": { "$ref": "#/definitions/Shared" } } }
                }
            }
        },
        "definitions": {
            "Shared": { "type": "object", "properties": { "id": { "type": "string" } } }
        }
    })
}

fn load(raw: &[(&str, Value)]) -> Vec<Document> {
    raw.iter()
        .map(|(path, value)| Document::from_value(*path, value).unwrap())
        .collect()
}

fn assert_paths_resolve(report: &ValidationReport, raw: &[(&str, Value)]) {
    let by_file: HashMap<PathBuf, &Value> =
        raw.iter().map(|(p, v)| (PathBuf::from(p), v)).collect();
    for message in &report.messages {
        let document = by_file[&message.file];
        assert!(
            message.path.resolve(document).is_some(),
            "{} does not resolve in {}",
            message.path,
            message.file.display()
        );
    }
}

#[test]
fn composed_rule_fires_once_per_shared_definition() {
    let raw = vec![
        ("a.json", pets_document("cats", "Cats_List")),
        ("b.json", pets_document("dogs", "Dogs_List")),
        ("c.json", pets_document("birds", "Birds_List")),
    ];
    let documents = load(&raw);

    let composed = Validator::builder()
        .rule(RuleBinding::generator(SharedDefinition(MergeState::Composed)))
        .build()
        .unwrap();
    let report = composed.validate(&documents);
    assert_eq!(report.by_rule("T100").len(), 1);
    assert_eq!(report.messages[0].file, PathBuf::from("c.json"));
    assert_paths_resolve(&report, &raw);

    let individual = Validator::builder()
        .rule(RuleBinding::generator(SharedDefinition(MergeState::Individual)))
        .build()
        .unwrap();
    assert_eq!(individual.validate(&documents).by_rule("T100").len(), 3);
}

#[test]
fn validation_is_deterministic_across_runs() {
    let raw: Vec<(&str, Value)> = vec![
        ("a.json", pets_document("cats", "Cats_List")),
        ("b.json", pets_document("dogs", "Dogs_List")),
        ("c.json", pets_document("birds", "Birds_List")),
        ("d.json", pets_document("fish", "Fish_List")),
    ];
    let documents = load(&raw);
    let build = |parallel| {
        Validator::builder()
            .rule(RuleBinding::predicate(EveryOperationId))
            .rule(RuleBinding::generator(SharedDefinition(MergeState::Composed)))
            .parallel(parallel)
            .build()
            .unwrap()
    };

    let first = build(true).validate(&documents);
    let second = build(true).validate(&documents);
    let sequential = build(false).validate(&documents);
    assert_eq!(first.messages, second.messages);
    assert_eq!(first.messages, sequential.messages);

    let files: Vec<_> = first
        .by_rule("T101")
        .iter()
        .map(|m| m.file.display().to_string())
        .collect();
    assert_eq!(files, vec!["a.json", "b.json", "c.json", "d.json"]);
    assert_eq!(first.messages.last().unwrap().rule_id, "T100");
    assert_paths_resolve(&first, &raw);
}

#[test]
fn failing_rules_are_isolated() {
    let raw = vec![
        ("a.json", pets_document("cats", "Cats_List")),
        ("b.json", pets_document("dogs", "Dogs_List")),
    ];
    let documents = load(&raw);
    let validator = Validator::builder()
        .rule(RuleBinding::predicate(AlwaysPanics))
        .rule(RuleBinding::predicate(AlwaysErrors))
        .rule(RuleBinding::predicate(EveryOperationId))
        .build()
        .unwrap();
    let report = validator.validate(&documents);

    for id in ["T102", "T103"] {
        let failures = report.by_rule(id);
        assert_eq!(failures.len(), 2, "one failure per invocation of {id}");
        assert!(failures
            .iter()
            .all(|m| m.internal == Some(InternalKind::RuleInvocationFailure)
                && m.severity == Severity::Error));
    }
    assert_eq!(report.by_rule("T101").len(), 2);
    assert_paths_resolve(&report, &raw);
}

#[test]
fn cyclic_references_terminate_and_are_reported() {
    let raw = vec![(
        "cycle.json",
        json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/A" },
                "C": { "$ref": "#/definitions/Missing" }
            }
        }),
    )];
    let documents = load(&raw);
    let report = Validator::builder().build().unwrap().validate(&documents);

    let kinds: Vec<_> = report.messages.iter().map(|m| m.internal).collect();
    assert_eq!(
        kinds,
        vec![
            Some(InternalKind::CyclicReference),
            Some(InternalKind::CyclicReference),
            Some(InternalKind::DanglingReference),
        ]
    );
    assert_paths_resolve(&report, &raw);

    let unchecked = Validator::builder()
        .check_references(false)
        .build()
        .unwrap()
        .validate(&documents);
    assert!(unchecked.messages.is_empty());
}

#[test]
fn unreachable_metadata_falls_back_to_defaults() {
    let store = MetadataStore::new();
    let source = HttpSource::new("http://127.0.0.1:9/metadata.json")
        .with_timeout(Duration::from_millis(200));
    let table = store.initialize(&source).clone();
    assert!(table.is_empty());

    let validator = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .metadata(table)
        .build()
        .unwrap();
    let descriptor = validator.registry().get("T101").unwrap();
    assert_eq!(descriptor.severity, Severity::Info);
    assert_eq!(descriptor.category, Category::None);

    let raw = vec![("a.json", pets_document("cats", "Cats_List"))];
    let report = validator.validate(&load(&raw));
    assert_eq!(report.messages[0].severity, Severity::Info);
}

#[test]
fn metadata_overrides_apply_at_build_time() {
    let store = MetadataStore::new();
    let table = store
        .initialize(&StaticSource::new(
            MetadataTable::parse(
                r#"[{ "id": "T101", "severity": "warning", "validationCategory": "sdkviolation",
                      "serviceDefinitionDocumentType": ["arm"] }]"#,
            )
            .unwrap(),
        ))
        .clone();

    let build = |kind| {
        Validator::builder()
            .rule(RuleBinding::predicate(EveryOperationId))
            .metadata(table.clone())
            .document_kind(kind)
            .build()
            .unwrap()
    };
    let raw = vec![("a.json", pets_document("cats", "Cats_List"))];
    let documents = load(&raw);

    let arm = build(DocumentKind::Arm).validate(&documents);
    assert_eq!(arm.messages.len(), 1);
    assert_eq!(arm.messages[0].severity, Severity::Warning);
    assert_eq!(arm.messages[0].category, Category::SdkViolation);

    // Listed kinds are added to Default, so plain documents are still checked.
    let plain = build(DocumentKind::Default).validate(&documents);
    assert_eq!(plain.messages.len(), 1);
    assert_eq!(plain.messages[0].severity, Severity::Warning);
}

#[test]
fn load_failures_do_not_stop_siblings() {
    let tmp = tempfile::TempDir::new().unwrap();
    let good = tmp.path().join("good.json");
    let bad = tmp.path().join("bad.json");
    std::fs::write(&good, pets_document("cats", "Cats_List").to_string()).unwrap();
    std::fs::write(&bad, r#"{ "paths": [] }"#).unwrap();

    let validator = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .build()
        .unwrap();
    let report = validator.validate_paths(&[tmp.path().to_path_buf()]).unwrap();

    assert_eq!(report.documents_checked, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].unit, bad);
    assert_eq!(report.by_rule("T101").len(), 1);
    assert!(report.has_errors());
}

#[test]
fn merge_collision_keeps_individual_results() {
    let raw = vec![
        ("a.json", pets_document("pets", "Pets_List")),
        ("b.json", pets_document("pets", "Pets_Other")),
    ];
    let validator = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .rule(RuleBinding::generator(SharedDefinition(MergeState::Composed)))
        .build()
        .unwrap();
    let report = validator.validate(&load(&raw));

    assert_eq!(report.by_rule("T101").len(), 2);
    assert!(report.by_rule("T100").is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("GET /pets"));
}

#[test]
fn duplicate_rule_ids_fail_the_build() {
    let result = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .rule(RuleBinding::predicate(EveryOperationId))
        .build();
    assert!(result.is_err());
}

#[test]
fn sibling_files_resolve_in_individual_passes() {
    let raw = vec![
        (
            "specs/main.json",
            json!({ "definitions": { "Pet": { "$ref": "common.json#/definitions/Resource" } } }),
        ),
        (
            "specs/common.json",
            json!({ "definitions": { "Resource": { "type": "object" } } }),
        ),
    ];
    let validator = Validator::builder()
        .rule(RuleBinding::generator(UnresolvedDefinition(MergeState::Individual)))
        .build()
        .unwrap();

    let report = validator.validate(&load(&raw));
    assert!(report.messages.is_empty(), "{}", report.format_test_report(Severity::Info));

    let alone = validator.validate(&load(&raw[..1]));
    let kinds: Vec<_> = alone.messages.iter().map(|m| m.internal).collect();
    assert_eq!(kinds, vec![Some(InternalKind::DanglingReference), None]);
    assert_eq!(alone.by_rule("T104").len(), 1);
    assert_paths_resolve(&alone, &raw);
}

#[test]
fn composed_references_resolve_from_the_contributing_file() {
    let raw = vec![
        ("specs/a/main.json", pets_document("pets", "Pets_List")),
        (
            "specs/a/types.json",
            json!({ "definitions": { "Other": { "type": "string" } } }),
        ),
        (
            "specs/b/extra.json",
            json!({ "definitions": { "Extra": { "$ref": "types.json#/definitions/Base" } } }),
        ),
        (
            "specs/b/types.json",
            json!({ "definitions": { "Base": { "type": "object" } } }),
        ),
    ];
    let report = Validator::builder()
        .rule(RuleBinding::generator(UnresolvedDefinition(MergeState::Composed)))
        .build()
        .unwrap()
        .validate(&load(&raw));

    assert!(report.failures.is_empty());
    assert!(report.messages.is_empty(), "{}", report.format_test_report(Severity::Info));
}

#[test]
fn nested_pointer_references_are_not_dangling() {
    let raw = vec![(
        "nested.json",
        json!({
            "definitions": {
                "Foo": { "properties": { "bar": { "type": "string" } } },
                "Baz": { "$ref": "#/definitions/Foo/properties/bar" },
                "Qux": { "$ref": "#/definitions/Foo/properties/missing" },
                "Err": { "$ref": "#/responses/NotFound" }
            }
        }),
    )];
    let report = Validator::builder().build().unwrap().validate(&load(&raw));

    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].internal, Some(InternalKind::DanglingReference));
    assert_eq!(report.messages[0].path.to_pointer(), "/definitions/Qux");
}

#[test]
fn upper_case_methods_report_paths_that_exist() {
    let raw = vec![(
        "pets.json",
        json!({ "paths": { "/pets": { "GET": { "operationId": "GetPets" } } } }),
    )];
    let report = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .build()
        .unwrap()
        .validate(&load(&raw));

    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].path.to_pointer(), "/paths/~1pets/GET/operationId");
    assert_paths_resolve(&report, &raw);
}

#[test]
fn merge_is_skipped_without_composed_rules() {
    let raw = vec![
        ("v1.json", pets_document("pets", "Pets_List")),
        ("v2.json", pets_document("pets", "Pets_Other")),
    ];
    let documents = load(&raw);

    let empty = Validator::builder().build().unwrap().validate(&documents);
    assert!(empty.failures.is_empty());

    let individual_only = Validator::builder()
        .rule(RuleBinding::predicate(EveryOperationId))
        .build()
        .unwrap()
        .validate(&documents);
    assert!(individual_only.failures.is_empty());
    assert!(!individual_only.fails_at(Severity::Error));
    assert_eq!(individual_only.by_rule("T101").len(), 2);
}
