//! Rule requiring `x-ms-client-name` to carry a name.
//!
//! Accepts either a non-empty string or an object with a non-empty `name`
//! member.

use openapi_lint_core::{Extension, ExtensionRule, Rule, RuleContext, RuleError, Verdict};
use serde_json::Value;

/// Flags empty `x-ms-client-name` extensions wherever they appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyClientName;

impl Rule for NonEmptyClientName {
    fn id(&self) -> &'static str {
        "R2028"
    }

    fn name(&self) -> &'static str {
        "NonEmptyClientName"
    }

    fn description(&self) -> &'static str {
        "x-ms-client-name must not be empty"
    }

    fn message_template(&self) -> &'static str {
        "Empty x-ms-client-name property"
    }
}

impl ExtensionRule for NonEmptyClientName {
    fn extension_name(&self) -> &'static str {
        "x-ms-client-name"
    }

    fn is_valid<'a>(&self, extension: Extension<'a>, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        let name = match extension.value {
            Value::Object(object) => object.get("name").and_then(Value::as_str),
            other => other.as_str(),
        };
        Ok(Verdict::check(
            name.is_some_and(|n| !n.is_empty()),
            std::iter::empty::<&str>(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, pointers};
    use openapi_lint_core::RuleBinding;
    use serde_json::json;

    #[test]
    fn accepts_strings_and_named_objects() {
        let value = json!({
            "definitions": {
                "Pet": {
                    "properties": {
                        "a": { "type": "string", "x-ms-client-name": "alpha" },
                        "b": { "type": "string", "x-ms-client-name": { "name": "beta" } },
                        "c": { "type": "string", "x-ms-client-name": "" },
                        "d": { "type": "string", "x-ms-client-name": { "name": "" } },
                        "e": { "type": "string", "x-ms-client-name": 5 }
                    }
                }
            }
        });
        let report = check(RuleBinding::extension(NonEmptyClientName), &value);
        assert_eq!(
            pointers(&report),
            vec![
                "/definitions/Pet/properties/c/x-ms-client-name",
                "/definitions/Pet/properties/d/x-ms-client-name",
                "/definitions/Pet/properties/e/x-ms-client-name",
            ]
        );
    }
}
