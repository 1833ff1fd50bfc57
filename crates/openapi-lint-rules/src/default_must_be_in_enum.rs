//! Rule requiring a schema's `default` to be one of its `enum` values.

use openapi_lint_core::{PredicateRule, Rule, RuleContext, RuleError, Schema, Verdict};
use serde_json::Value;

/// Flags schemas whose default is missing from their enum.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMustBeInEnum;

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Rule for DefaultMustBeInEnum {
    fn id(&self) -> &'static str {
        "R2027"
    }

    fn name(&self) -> &'static str {
        "DefaultMustBeInEnum"
    }

    fn description(&self) -> &'static str {
        "Default values must be among the enumerated values"
    }

    fn message_template(&self) -> &'static str {
        "The default value '{0}' is not one of the values enumerated as valid for this element"
    }
}

impl PredicateRule for DefaultMustBeInEnum {
    type Target = Schema;

    fn is_valid<'a>(&self, schema: &'a Schema, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        match &schema.default {
            Some(default) if !schema.enum_values.is_empty() => Ok(Verdict::check(
                schema.enum_values.contains(default),
                [display(default)],
            )),
            _ => Ok(Verdict::Valid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, pointers};
    use openapi_lint_core::RuleBinding;
    use serde_json::json;

    #[test]
    fn flags_default_outside_enum() {
        let value = json!({
            "definitions": {
                "Good": { "type": "string", "enum": ["a", "b"], "default": "a" },
                "Bad": { "type": "string", "enum": ["a", "b"], "default": "c" },
                "NoEnum": { "type": "string", "default": "c" }
            }
        });
        let report = check(RuleBinding::predicate(DefaultMustBeInEnum), &value);
        assert_eq!(pointers(&report), vec!["/definitions/Bad"]);
        assert!(report.messages[0].message.contains("'c'"));
    }

    #[test]
    fn compares_non_string_values() {
        let value = json!({
            "definitions": { "Level": { "type": "integer", "enum": [1, 2], "default": 3 } }
        });
        let report = check(RuleBinding::predicate(DefaultMustBeInEnum), &value);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].message.contains("'3'"));
    }
}
