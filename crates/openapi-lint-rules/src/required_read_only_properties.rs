//! Rule forbidding read-only properties in a model's `required` list.
//!
//! Runs over the composed view, so a model shared by several documents of a
//! group is reported once.

use openapi_lint_core::{
    Finding, Findings, GeneratorRule, MergeState, Rule, RuleContext, RuleError, Schema,
};

/// Flags properties that are both `readOnly` and `required`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredReadOnlyProperties;

impl Rule for RequiredReadOnlyProperties {
    fn id(&self) -> &'static str {
        "R2056"
    }

    fn name(&self) -> &'static str {
        "RequiredReadOnlyProperties"
    }

    fn description(&self) -> &'static str {
        "Read-only properties must not be required"
    }

    fn message_template(&self) -> &'static str {
        "Property '{0}' is a required property. It should not be marked as 'readonly'"
    }

    fn merge_state(&self) -> MergeState {
        MergeState::Composed
    }
}

impl GeneratorRule for RequiredReadOnlyProperties {
    type Target = Schema;

    fn findings<'a>(&'a self, schema: &'a Schema, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let properties = ctx.path().append_property("properties");
        Box::new(
            schema
                .properties
                .iter()
                .filter(|(name, property)| {
                    property.read_only && schema.required.iter().any(|r| r == name)
                })
                .map(move |(name, _)| {
                    Ok::<_, RuleError>(Finding::new(properties.append_property(name), [name]))
                }),
        )
    }
}
