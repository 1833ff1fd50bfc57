//! Rule suggesting `x-ms-client-flatten` for nested inline models.

use openapi_lint_core::{NodeKind, PredicateRule, Rule, RuleContext, RuleError, Schema, Verdict};

const CLIENT_FLATTEN: &str = "x-ms-client-flatten";

/// Flags properties declared as inline objects with their own properties,
/// unless they are marked `x-ms-client-flatten`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvoidNestedProperties;

impl Rule for AvoidNestedProperties {
    fn id(&self) -> &'static str {
        "R2001"
    }

    fn name(&self) -> &'static str {
        "AvoidNestedProperties"
    }

    fn description(&self) -> &'static str {
        "Nested inline properties should be flattened"
    }

    fn message_template(&self) -> &'static str {
        "Consider using x-ms-client-flatten on property '{0}' to provide a better end user experience"
    }
}

impl PredicateRule for AvoidNestedProperties {
    type Target = Schema;

    fn is_valid<'a>(&self, schema: &'a Schema, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        let is_property = ctx
            .parent()
            .is_some_and(|parent| parent.node().kind() == NodeKind::PropertiesMap);
        if !is_property || schema.reference.is_some() || schema.properties.is_empty() {
            return Ok(Verdict::Valid);
        }
        let flattened = schema
            .extensions
            .get(CLIENT_FLATTEN)
            .is_some_and(serde_json::Value::is_boolean);
        Ok(Verdict::check(flattened, [ctx.key_str().unwrap_or_default()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, pointers};
    use openapi_lint_core::RuleBinding;
    use serde_json::json;

    #[test]
    fn flags_nested_inline_objects() {
        let value = json!({
            "definitions": {
                "Pet": {
                    "properties": {
                        "owner": { "properties": { "name": { "type": "string" } } },
                        "flat": {
                            "x-ms-client-flatten": true,
                            "properties": { "name": { "type": "string" } }
                        },
                        "tag": { "$ref": "#/definitions/Tag" }
                    }
                },
                "Tag": { "properties": { "name": { "type": "string" } } }
            }
        });
        let report = check(RuleBinding::predicate(AvoidNestedProperties), &value);
        assert_eq!(pointers(&report), vec!["/definitions/Pet/properties/owner"]);
        assert!(report.messages[0].message.contains("'owner'"));
    }
}
