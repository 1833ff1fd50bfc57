//! Rule limiting operation ids to a single underscore.

use openapi_lint_core::{PredicateRule, Rule, RuleContext, RuleError, Scalar, Verdict};

/// Allows at most one `_` in an operation id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneUnderscoreInOperationId;

impl Rule for OneUnderscoreInOperationId {
    fn id(&self) -> &'static str {
        "R2055"
    }

    fn name(&self) -> &'static str {
        "OneUnderscoreInOperationId"
    }

    fn description(&self) -> &'static str {
        "Operation ids may contain at most one underscore"
    }

    fn message_template(&self) -> &'static str {
        "Only 1 underscore is permitted in the operation id '{0}', following Noun_Verb conventions"
    }

    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for OneUnderscoreInOperationId {
    type Target = Scalar;

    fn is_valid<'a>(&self, operation_id: &'a str, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        let underscores = operation_id.matches('_').count();
        Ok(Verdict::check(underscores <= 1, [operation_id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use openapi_lint_core::RuleBinding;
    use serde_json::json;

    #[test]
    fn counts_underscores() {
        let value = json!({
            "paths": {
                "/a": { "get": { "operationId": "Pets_Get" } },
                "/b": { "get": { "operationId": "PetsGet" } },
                "/c": { "get": { "operationId": "Pets_Get_All" } }
            }
        });
        let report = check(RuleBinding::predicate(OneUnderscoreInOperationId), &value);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].message.contains("'Pets_Get_All'"));
    }
}
