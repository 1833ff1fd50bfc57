//! Rule enforcing the ARM security definition shape.
//!
//! An ARM document declares exactly one security definition, `azure_auth`:
//!
//! ```json
//! "securityDefinitions": {
//!   "azure_auth": {
//!     "type": "oauth2",
//!     "authorizationUrl": "https://login.microsoftonline.com/common/oauth2/authorize",
//!     "flow": "implicit",
//!     "description": "Azure Active Directory OAuth2 Flow",
//!     "scopes": { "user_impersonation": "impersonate your user account" }
//!   }
//! }
//! ```
//!
//! Documents without security definitions are not checked.

use openapi_lint_core::{
    findings_from, DocumentKinds, Finding, Findings, GeneratorRule, Rule, RuleContext,
    SecurityDefinition, ServiceDefinition,
};

const AUTH_NAME: &str = "azure_auth";
const AUTHORIZATION_URL: &str = "https://login.microsoftonline.com/common/oauth2/authorize";
const SCOPE: &str = "user_impersonation";

/// Checks the `securityDefinitions` of ARM documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityDefinitionsStructure;

fn is_non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn is_azure_auth(definition: &SecurityDefinition) -> bool {
    let scopes_valid = definition.scopes.len() == 1
        && definition
            .scopes
            .iter()
            .any(|(scope, text)| scope.eq_ignore_ascii_case(SCOPE) && !text.is_empty());

    definition.scheme_type.as_deref() == Some("oauth2")
        && definition
            .authorization_url
            .as_deref()
            .is_some_and(|url| url.eq_ignore_ascii_case(AUTHORIZATION_URL))
        && definition.flow.as_deref() == Some("implicit")
        && is_non_empty(definition.description.as_deref())
        && scopes_valid
}

impl Rule for SecurityDefinitionsStructure {
    fn id(&self) -> &'static str {
        "R2054"
    }

    fn name(&self) -> &'static str {
        "SecurityDefinitionsStructure"
    }

    fn description(&self) -> &'static str {
        "ARM documents declare a single azure_auth OAuth2 security definition"
    }

    fn message_template(&self) -> &'static str {
        "Each OpenAPI json document must contain a security definitions section and the section must adhere to the azure_auth oauth2 implicit flow structure"
    }

    fn document_kinds(&self) -> DocumentKinds {
        DocumentKinds::ARM
    }
}

impl GeneratorRule for SecurityDefinitionsStructure {
    type Target = ServiceDefinition;

    fn findings<'a>(&'a self, root: &'a ServiceDefinition, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let definitions = &root.security_definitions;
        let finding = if definitions.is_empty() {
            None
        } else if definitions.len() != 1 {
            Some(Finding::at(ctx, std::iter::empty::<&str>()))
        } else if !definitions
            .iter()
            .any(|(name, definition)| name.eq_ignore_ascii_case(AUTH_NAME) && is_azure_auth(definition))
        {
            let at = ctx.path().append_property("securityDefinitions");
            Some(Finding::new(at, std::iter::empty::<&str>()))
        } else {
            None
        };
        findings_from(finding.into_iter().collect())
    }
}
