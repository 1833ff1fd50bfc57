//! Rule checking the responses of long-running operations.
//!
//! | Method | Needs one of |
//! |--------|--------------|
//! | DELETE | 200, 204 |
//! | POST | 200, 201, 204 |
//! | PUT, PATCH | 200, 201 |
//!
//! Applies to `x-ms-long-running-operation` set on an operation. A value of
//! `false` turns the check off.

use openapi_lint_core::model::is_http_method;
use openapi_lint_core::{
    Extension, ExtensionRule, Operation, Rule, RuleContext, RuleError, Verdict,
};
use serde_json::Value;

const DELETE_CODES: &[&str] = &["200", "204"];
const POST_CODES: &[&str] = &["200", "201", "204"];
const PUT_PATCH_CODES: &[&str] = &["200", "201"];

/// Flags long-running operations without a valid final status code.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongRunningResponseStatusCode;

impl LongRunningResponseStatusCode {
    fn allowed_codes(method: &str) -> Option<&'static [&'static str]> {
        match method.to_ascii_lowercase().as_str() {
            "delete" => Some(DELETE_CODES),
            "post" => Some(POST_CODES),
            "put" | "patch" => Some(PUT_PATCH_CODES),
            _ => None,
        }
    }
}

impl Rule for LongRunningResponseStatusCode {
    fn id(&self) -> &'static str {
        "R2005"
    }

    fn name(&self) -> &'static str {
        "LongRunningResponseStatusCode"
    }

    fn description(&self) -> &'static str {
        "Long-running operations must return a valid final status code"
    }

    fn message_template(&self) -> &'static str {
        "A '{0}' operation '{1}' with x-ms-long-running-operation extension must have a valid terminal success status code {2}"
    }
}

impl ExtensionRule for LongRunningResponseStatusCode {
    fn extension_name(&self) -> &'static str {
        "x-ms-long-running-operation"
    }

    fn is_valid<'a>(&self, extension: Extension<'a>, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        if extension.value == &Value::Bool(false) {
            return Ok(Verdict::Valid);
        }
        let Some(parent) = ctx.parent() else {
            return Ok(Verdict::Valid);
        };
        let Some(method) = parent
            .key_str()
            .filter(|m| is_http_method(m))
            .map(str::to_owned)
        else {
            return Ok(Verdict::Valid);
        };
        let Some(operation) = ctx.first_ancestor::<Operation>() else {
            return Ok(Verdict::Valid);
        };
        let Some(codes) = Self::allowed_codes(&method) else {
            return Ok(Verdict::Valid);
        };

        let valid = codes.iter().any(|code| operation.responses.contains_key(code));
        Ok(Verdict::check(
            valid,
            [
                method.to_uppercase(),
                operation.operation_id.clone().unwrap_or_default(),
                codes.join(" or "),
            ],
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
    fn checks_codes_per_method() {
        let value = json!({
            "paths": {
                "/pets/{id}": {
                    "delete": {
                        "operationId": "Pets_Delete",
                        "x-ms-long-running-operation": true,
                        "responses": { "202": {}, "204": {} }
                    },
                    "put": {
                        "operationId": "Pets_Create",
                        "x-ms-long-running-operation": true,
                        "responses": { "202": {} }
                    },
                    "patch": {
                        "operationId": "Pets_Update",
                        "x-ms-long-running-operation": false,
                        "responses": { "202": {} }
                    }
                }
            }
        });
        let report = check(RuleBinding::extension(LongRunningResponseStatusCode), &value);
        assert_eq!(
            pointers(&report),
            vec!["/paths/~1pets~1{id}/put/x-ms-long-running-operation"]
        );
        let message = &report.messages[0].message;
        assert!(message.contains("'PUT' operation 'Pets_Create'"));
        assert!(message.contains("200 or 201"));
    }

    #[test]
    fn ignores_extension_outside_operations() {
        let value = json!({
            "definitions": { "Pet": { "x-ms-long-running-operation": true } }
        });
        let report = check(RuleBinding::extension(LongRunningResponseStatusCode), &value);
        assert!(report.messages.is_empty());
    }
}
