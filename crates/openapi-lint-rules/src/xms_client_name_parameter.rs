//! Rule flagging `x-ms-client-name` values that repeat the parameter name.

use openapi_lint_core::{
    findings_from, Finding, Findings, GeneratorRule, Parameter, Rule, RuleContext,
};

const CLIENT_NAME: &str = "x-ms-client-name";

/// An `x-ms-client-name` equal to the wire name has no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmsClientNameParameter;

impl Rule for XmsClientNameParameter {
    fn id(&self) -> &'static str {
        "R2012"
    }

    fn name(&self) -> &'static str {
        "XmsClientNameParameter"
    }

    fn description(&self) -> &'static str {
        "x-ms-client-name must differ from the parameter name"
    }

    fn message_template(&self) -> &'static str {
        "Value of 'x-ms-client-name' cannot be the same as '{0}' Property/Model"
    }
}

impl GeneratorRule for XmsClientNameParameter {
    type Target = Parameter;

    fn findings<'a>(&'a self, parameter: &'a Parameter, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let client_name = parameter
            .extensions
            .get(CLIENT_NAME)
            .and_then(serde_json::Value::as_str);
        let finding = match (client_name, parameter.name.as_deref()) {
            (Some(client), Some(name)) if client == name => Some(Finding::at(ctx, [name])),
            _ => None,
        };
        findings_from(finding.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, pointers};
    use openapi_lint_core::RuleBinding;
    use serde_json::json;

    #[test]
    fn flags_redundant_client_names() {
        let value = json!({
            "parameters": {
                "Same": { "name": "top", "in": "query", "type": "integer", "x-ms-client-name": "top" },
                "Renamed": { "name": "$top", "in": "query", "type": "integer", "x-ms-client-name": "top" }
            }
        });
        let report = check(RuleBinding::generator(XmsClientNameParameter), &value);
        assert_eq!(pointers(&report), vec!["/parameters/Same"]);
    }
}
