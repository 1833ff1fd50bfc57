//! Rule requiring PUT operations to accept and return the same model.
//!
//! # Rationale
//!
//! A PUT creates or replaces a resource, so the model sent in the body should
//! be the model returned in the `200` response.
//!
//! # Detected Patterns
//!
//! A PUT whose body parameter references `#/definitions/Foo` while its `200`
//! response references `#/definitions/Bar` (or has no model at all).
//!
//! Operations without parameters, without a `200` response, or whose body
//! model is not declared in `definitions` are skipped.

use openapi_lint_core::model::PathItem;
use openapi_lint_core::reference::{Reference, Section};
use openapi_lint_core::{
    findings_from, Finding, Findings, GeneratorRule, Operation, OrderedMap, Parameter,
    ParameterLocation, PathsMap, Rule, RuleContext,
};
use tracing::debug;

/// Flags PUT operations whose request and `200` response models differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutRequestResponseScheme;

impl PutRequestResponseScheme {
    /// Name of the model the operation's body parameter references.
    ///
    /// Inline body parameters win; otherwise the first referenced global
    /// parameter that is a body parameter is used.
    fn request_model(operation: &Operation, ctx: &RuleContext<'_>) -> Option<String> {
        let body = |p: &Parameter| p.location == Some(ParameterLocation::Body);
        let model_of = |p: &Parameter| {
            p.schema
                .as_ref()
                .and_then(|s| s.reference.as_deref())
                .and_then(Reference::definition_name)
        };

        if let Some(inline) = operation.parameters.iter().find(|p| body(p)) {
            return model_of(inline);
        }

        let globals = &ctx.service_definition().parameters;
        operation
            .parameters
            .iter()
            .filter_map(|p| p.reference.as_deref())
            .filter_map(Reference::parse)
            .filter(|r| r.file.is_none() && r.section == Section::Parameters)
            .filter_map(|r| globals.get(&r.name))
            .find(|p| body(p))
            .and_then(model_of)
    }

    fn response_model(operation: &Operation) -> String {
        operation
            .responses
            .get("200")
            .and_then(|r| r.schema.as_ref())
            .and_then(|s| s.reference.as_deref())
            .and_then(Reference::definition_name)
            .unwrap_or_default()
    }
}

impl Rule for PutRequestResponseScheme {
    fn id(&self) -> &'static str {
        "R2017"
    }

    fn name(&self) -> &'static str {
        "PutRequestResponseScheme"
    }

    fn description(&self) -> &'static str {
        "PUT request body and 200 response must use the same model"
    }

    fn message_template(&self) -> &'static str {
        "A PUT operation request body schema should be the same as its 200 response schema, to allow reusing the same entity between GET and PUT. \
         If the schema of the PUT request body is a superset of the GET response body, make sure you have a PATCH operation to make the resource updatable. \
         Operation: '{0}' Request Model: '{1}' Response Model: '{2}'"
    }
}

impl GeneratorRule for PutRequestResponseScheme {
    type Target = PathsMap;

    fn findings<'a>(
        &'a self,
        paths: &'a OrderedMap<PathItem>,
        ctx: &'a RuleContext<'a>,
    ) -> Findings<'a> {
        let definitions = &ctx.service_definition().definitions;
        if definitions.is_empty() {
            return findings_from(Vec::new());
        }

        let mut findings = Vec::new();
        for (path, item) in paths.iter() {
            for (method, operation) in item.iter() {
                if !method.eq_ignore_ascii_case("put")
                    || operation.parameters.is_empty()
                    || !operation.responses.contains_key("200")
                {
                    continue;
                }
                let Some(request) = Self::request_model(operation, ctx) else {
                    continue;
                };
                if !definitions.contains_key(&request) {
                    debug!("PUT {path}: body model {request} is not a local definition");
                    continue;
                }
                let response = Self::response_model(operation);
                if response != request {
                    let at = ctx.path().append_property(path).append_property(method);
                    let operation_id = operation.operation_id.as_deref().unwrap_or_default();
                    let params = [operation_id, request.as_str(), response.as_str()];
                    findings.push(Finding::new(at, params));
                }
            }
        }
        findings_from(findings)
    }
}
