//! Rule requiring an operation's summary and description to differ.

use openapi_lint_core::{Operation, PredicateRule, Rule, RuleContext, RuleError, Verdict};

/// Flags operations whose summary repeats the description.
///
/// Comparison ignores surrounding whitespace and ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAndDescriptionMustNotBeSame;

impl Rule for SummaryAndDescriptionMustNotBeSame {
    fn id(&self) -> &'static str {
        "R2023"
    }

    fn name(&self) -> &'static str {
        "SummaryAndDescriptionMustNotBeSame"
    }

    fn description(&self) -> &'static str {
        "Operation summary and description must not be the same"
    }

    fn message_template(&self) -> &'static str {
        "The summary and description values should not be same"
    }
}

impl PredicateRule for SummaryAndDescriptionMustNotBeSame {
    type Target = Operation;

    fn is_valid<'a>(&self, operation: &'a Operation, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        let same = match (&operation.summary, &operation.description) {
            (Some(summary), Some(description)) => {
                summary.trim().eq_ignore_ascii_case(description.trim())
            }
            _ => false,
        };
        Ok(Verdict::check(!same, std::iter::empty::<&str>()))
    }
}
