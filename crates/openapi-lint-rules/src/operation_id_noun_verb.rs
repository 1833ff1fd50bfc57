//! Rule requiring operation ids of the form `Noun_Verb`.
//!
//! # Detected Patterns
//!
//! - `GetPets`: no underscore separating noun and verb
//! - `_Get` or `Pets_`: an empty noun or verb
//!
//! # Good Patterns
//!
//! ```json
//! { "get": { "operationId": "Pets_Get" } }
//! ```
//!
//! Ids with more than one underscore are left to `OneUnderscoreInOperationId`.

use openapi_lint_core::{
    findings_from, Finding, Findings, GeneratorRule, Operation, Rule, RuleContext,
};

/// Rule id for OperationIdNounVerb.
pub const ID: &str = "R1001";

/// Rule name for OperationIdNounVerb.
pub const NAME: &str = "OperationIdNounVerb";

/// Requires an underscore between the noun and the verb of an operation id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationIdNounVerb;

impl OperationIdNounVerb {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_noun_verb(operation_id: &str) -> bool {
        match operation_id.split_once('_') {
            Some((noun, verb)) => !noun.is_empty() && !verb.is_empty(),
            None => false,
        }
    }
}

impl Rule for OperationIdNounVerb {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Operation ids must be of the form 'Noun_Verb'"
    }

    fn message_template(&self) -> &'static str {
        "OperationId '{0}' should be of the form 'Noun_Verb', with one underscore separating the noun and the verb"
    }
}

impl GeneratorRule for OperationIdNounVerb {
    type Target = Operation;

    fn findings<'a>(&'a self, operation: &'a Operation, ctx: &'a RuleContext<'a>) -> Findings<'a> {
        let finding = operation
            .operation_id
            .as_deref()
            .filter(|id| !Self::is_noun_verb(id))
            .map(|id| Finding::new(ctx.path().append_property("operationId"), [id]));
        findings_from(finding.into_iter().collect())
    }
}
