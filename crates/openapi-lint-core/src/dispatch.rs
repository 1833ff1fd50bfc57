//! Depth-first traversal invoking matching rules on every node.

use crate::context::{PassScope, RuleContext};
use crate::model::{Extensions, Operation, Parameter, Schema};
use crate::node::{Extension, Node, NodeKind};
use crate::path::{ObjectPath, Segment};
use crate::reference::ReferenceFailure;
use crate::registry::{RegisteredRule, RuleRegistry};
use crate::rule::{Invocation, Verdict};
use crate::types::{
    render_template, Category, DocumentKinds, InternalKind, MergeState, Severity, ValidationMessage,
};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Ordered, append-only diagnostics sink.
#[derive(Debug, Default)]
pub struct Collector {
    messages: Vec<ValidationMessage>,
}

impl Collector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn add(&mut self, message: ValidationMessage) {
        self.messages.push(message);
    }

    /// Messages in insertion order.
    #[must_use]
    pub fn all(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the collector.
    #[must_use]
    pub fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }
}

/// Rules selected for one kind of pass, grouped by target.
#[derive(Debug)]
pub struct Dispatcher<'r> {
    by_kind: HashMap<NodeKind, Vec<&'r RegisteredRule>>,
    check_references: bool,
}

impl<'r> Dispatcher<'r> {
    /// Selects the rules of `registry` that run in a `state` pass over
    /// documents of `kinds`, keeping registration order.
    #[must_use]
    pub fn new(registry: &'r RuleRegistry, state: MergeState, kinds: DocumentKinds) -> Self {
        let mut by_kind: HashMap<NodeKind, Vec<&'r RegisteredRule>> = HashMap::new();
        for rule in registry.rules() {
            if rule.descriptor.applies_to(state, kinds) {
                by_kind.entry(rule.descriptor.target).or_default().push(rule);
            } else {
                debug!("Skipping {} for {state} pass over {kinds}", rule.descriptor.id);
            }
        }
        Self {
            by_kind,
            check_references: state == MergeState::Individual,
        }
    }

    /// Whether `$ref`s are checked for dangling and cyclic targets.
    /// Only honored in individual passes.
    #[must_use]
    pub fn check_references(mut self, enabled: bool) -> Self {
        self.check_references &= enabled;
        self
    }

    /// Number of rules selected for this pass.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    /// Walks the document of `scope`, appending diagnostics to `out`.
    pub fn run(&self, scope: &PassScope<'_>, out: &mut Collector) {
        let root = RuleContext::root_context(scope);
        self.visit(&root, out);
    }

    fn visit(&self, ctx: &RuleContext<'_>, out: &mut Collector) {
        if self.check_references {
            self.check_reference(ctx, out);
        }
        self.apply(ctx, out);

        match ctx.node() {
            Node::ServiceRoot(def) => {
                if !def.paths.is_empty() {
                    self.visit(&ctx.descend("paths", Node::PathsMap(&def.paths)), out);
                }
                for (name, schema) in def.definitions.iter() {
                    self.visit(&ctx.descend_path(["definitions", name], Node::Schema(schema)), out);
                }
                for (name, parameter) in def.parameters.iter() {
                    self.visit(
                        &ctx.descend_path(["parameters", name], Node::Parameter(parameter)),
                        out,
                    );
                }
                for (code, response) in def.responses.iter() {
                    if let Some(schema) = &response.schema {
                        self.visit(
                            &ctx.descend_path(["responses", code, "schema"], Node::Schema(schema)),
                            out,
                        );
                    }
                }
                for (name, security) in def.security_definitions.iter() {
                    self.visit(
                        &ctx.descend_path(
                            ["securityDefinitions", name],
                            Node::SecurityDefinition(security),
                        ),
                        out,
                    );
                }
                self.visit_extensions(ctx, &def.extensions, out);
            }
            Node::PathsMap(paths) => {
                for (path, item) in paths.iter() {
                    for (method, operation) in item.iter() {
                        self.visit(
                            &ctx.descend_path([path, method], Node::Operation(operation)),
                            out,
                        );
                    }
                }
            }
            Node::Operation(operation) => self.visit_operation(ctx, operation, out),
            Node::Parameter(parameter) => self.visit_parameter(ctx, parameter, out),
            Node::Schema(schema) => self.visit_schema(ctx, schema, out),
            Node::PropertiesMap(properties) => {
                for (name, schema) in properties.iter() {
                    self.visit(&ctx.descend(name, Node::Schema(schema)), out);
                }
            }
            Node::SecurityDefinition(security) => {
                self.visit_extensions(ctx, &security.extensions, out);
            }
            Node::ExtensionValue(_) | Node::Scalar(_) => {}
        }
    }

    fn visit_operation<'a>(&self, ctx: &RuleContext<'a>, op: &'a Operation, out: &mut Collector) {
        self.visit_scalar(ctx, "operationId", op.operation_id.as_deref(), out);
        self.visit_scalar(ctx, "summary", op.summary.as_deref(), out);
        self.visit_scalar(ctx, "description", op.description.as_deref(), out);

        for (index, parameter) in op.parameters.iter().enumerate() {
            let segments = [Segment::from("parameters"), Segment::Index(index)];
            self.visit(&ctx.descend_path(segments, Node::Parameter(parameter)), out);
        }
        for (code, response) in op.responses.iter() {
            if let Some(schema) = &response.schema {
                self.visit(
                    &ctx.descend_path(["responses", code, "schema"], Node::Schema(schema)),
                    out,
                );
            }
            let response_ctx = ctx.descend_path(["responses", code], ctx.node());
            self.visit_extensions(&response_ctx, &response.extensions, out);
        }
        self.visit_extensions(ctx, &op.extensions, out);
    }

    fn visit_parameter<'a>(
        &self,
        ctx: &RuleContext<'a>,
        parameter: &'a Parameter,
        out: &mut Collector,
    ) {
        self.visit_scalar(ctx, "name", parameter.name.as_deref(), out);
        self.visit_scalar(ctx, "description", parameter.description.as_deref(), out);
        self.visit_scalar(ctx, "format", parameter.format.as_deref(), out);
        if let Some(schema) = &parameter.schema {
            self.visit(&ctx.descend("schema", Node::Schema(schema)), out);
        }
        if let Some(items) = &parameter.items {
            self.visit(&ctx.descend("items", Node::Schema(items)), out);
        }
        self.visit_extensions(ctx, &parameter.extensions, out);
    }

    fn visit_schema<'a>(&self, ctx: &RuleContext<'a>, schema: &'a Schema, out: &mut Collector) {
        self.visit_scalar(ctx, "description", schema.description.as_deref(), out);
        self.visit_scalar(ctx, "format", schema.format.as_deref(), out);
        if !schema.properties.is_empty() {
            self.visit(
                &ctx.descend("properties", Node::PropertiesMap(&schema.properties)),
                out,
            );
        }
        if let Some(items) = &schema.items {
            self.visit(&ctx.descend("items", Node::Schema(items)), out);
        }
        if let Some(additional) = &schema.additional_properties {
            self.visit(
                &ctx.descend("additionalProperties", Node::Schema(additional)),
                out,
            );
        }
        for (index, part) in schema.all_of.iter().enumerate() {
            let segments = [Segment::from("allOf"), Segment::Index(index)];
            self.visit(&ctx.descend_path(segments, Node::Schema(part)), out);
        }
        self.visit_extensions(ctx, &schema.extensions, out);
    }

    fn visit_scalar<'a>(
        &self,
        ctx: &RuleContext<'a>,
        field: &'static str,
        value: Option<&'a str>,
        out: &mut Collector,
    ) {
        if let Some(value) = value {
            self.visit(&ctx.descend(field, Node::Scalar(value)), out);
        }
    }

    fn visit_extensions<'a>(
        &self,
        ctx: &RuleContext<'a>,
        extensions: &'a Extensions,
        out: &mut Collector,
    ) {
        for (name, value) in extensions.iter() {
            let node = Node::ExtensionValue(Extension { name, value });
            self.visit(&ctx.descend(name, node), out);
        }
    }

    /// Invokes every matching rule on the context's node, in registration order.
    fn apply(&self, ctx: &RuleContext<'_>, out: &mut Collector) {
        let node = ctx.node();
        let Some(rules) = self.by_kind.get(&node.kind()) else {
            return;
        };
        for rule in rules {
            if let Some(key) = rule.descriptor.key {
                if ctx.key_str() != Some(key) {
                    continue;
                }
            }
            self.invoke(rule, node, ctx, out);
        }
    }

    fn invoke<'a>(
        &self,
        rule: &RegisteredRule,
        node: Node<'a>,
        ctx: &RuleContext<'a>,
        out: &mut Collector,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.binding.invoke(node, ctx)));
        match outcome {
            Err(payload) => out.add(invocation_failure(rule, ctx, &panic_reason(&*payload))),
            Ok(Invocation::Skipped | Invocation::Verdict(Ok(Verdict::Valid))) => {}
            Ok(Invocation::Verdict(Ok(Verdict::Invalid(params)))) => {
                out.add(rule_message(rule, ctx, ctx.path().clone(), &params));
            }
            Ok(Invocation::Verdict(Err(e))) => {
                out.add(invocation_failure(rule, ctx, &e.to_string()));
            }
            Ok(Invocation::Findings(mut findings)) => loop {
                match panic::catch_unwind(AssertUnwindSafe(|| findings.next())) {
                    Ok(None) => break,
                    Ok(Some(Ok(finding))) => {
                        out.add(rule_message(rule, ctx, finding.path, &finding.params));
                    }
                    Ok(Some(Err(e))) => {
                        out.add(invocation_failure(rule, ctx, &e.to_string()));
                        break;
                    }
                    Err(payload) => {
                        out.add(invocation_failure(rule, ctx, &panic_reason(&*payload)));
                        break;
                    }
                }
            },
        }
    }

    fn check_reference(&self, ctx: &RuleContext<'_>, out: &mut Collector) {
        let reference = match ctx.node() {
            Node::Schema(schema) => schema.reference.as_deref(),
            Node::Parameter(parameter) => parameter.reference.as_deref(),
            _ => None,
        };
        let Some(reference) = reference else {
            return;
        };
        if let Err(failure) = ctx.resolver().resolve(reference) {
            debug!("{}#{}: {failure}", ctx.file().display(), ctx.path());
            let internal = match failure {
                ReferenceFailure::Dangling { .. } => InternalKind::DanglingReference,
                ReferenceFailure::Cyclic { .. } => InternalKind::CyclicReference,
                ReferenceFailure::Unsupported { .. } => return,
            };
            out.add(ValidationMessage {
                rule_id: internal.to_string(),
                rule_name: internal.to_string(),
                severity: Severity::Error,
                category: Category::None,
                file: ctx.file().to_path_buf(),
                path: ctx.path().clone(),
                message: failure.to_string(),
                internal: Some(internal),
            });
        }
    }
}

fn rule_message(
    rule: &RegisteredRule,
    ctx: &RuleContext<'_>,
    path: ObjectPath,
    params: &[String],
) -> ValidationMessage {
    let d = &rule.descriptor;
    ValidationMessage {
        rule_id: d.id.to_string(),
        rule_name: d.name.to_string(),
        severity: d.severity,
        category: d.category,
        file: ctx.file().to_path_buf(),
        path,
        message: render_template(d.message_template, params),
        internal: None,
    }
}

fn invocation_failure(rule: &RegisteredRule, ctx: &RuleContext<'_>, reason: &str) -> ValidationMessage {
    let d = &rule.descriptor;
    warn!("Rule {} failed at {}#{}: {reason}", d.id, ctx.file().display(), ctx.path());
    ValidationMessage {
        rule_id: d.id.to_string(),
        rule_name: d.name.to_string(),
        severity: Severity::Error,
        category: Category::None,
        file: ctx.file().to_path_buf(),
        path: ctx.path().clone(),
        message: format!("rule {} failed: {reason}", d.id),
        internal: Some(InternalKind::RuleInvocationFailure),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
