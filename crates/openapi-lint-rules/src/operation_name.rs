//! Rules tying operation id verbs to the HTTP method.
//!
//! | Method | Accepted ids |
//! |--------|--------------|
//! | GET | `Noun_Get`, `Noun_List`, `Get...`, `List...` |
//! | PUT | `Noun_Create`, `Create...` |
//! | PATCH | `Noun_Update`, `Update...` |
//! | DELETE | `Noun_Delete`, `Delete...` |
//!
//! Matching is case-insensitive. An empty id never satisfies a convention.
//! Each rule targets `operationId` scalars and reads the method from the
//! enclosing operation's key.

use openapi_lint_core::{PredicateRule, Rule, RuleContext, RuleError, Scalar, Verdict};
use regex::Regex;
use std::sync::LazyLock;

static GET: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\w+_)?(?:Get|List)"));
static PUT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\w+_)?Create"));
static PATCH: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\w+_)?Update"));
static DELETE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\w+_)?Delete"));

/// The HTTP method a convention applies to, and its pattern.
#[derive(Debug, Clone, Copy)]
enum Convention {
    Get,
    Put,
    Patch,
    Delete,
}

impl Convention {
    fn method(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    fn pattern(self) -> Result<&'static Regex, RuleError> {
        let compiled = match self {
            Self::Get => &*GET,
            Self::Put => &*PUT,
            Self::Patch => &*PATCH,
            Self::Delete => &*DELETE,
        };
        compiled
            .as_ref()
            .map_err(|e| RuleError::Failed(format!("invalid naming pattern: {e}")))
    }

    fn check(self, operation_id: &str, ctx: &RuleContext<'_>) -> Result<Verdict, RuleError> {
        let applies = ctx
            .parent()
            .is_some_and(|op| op.key_str().is_some_and(|m| m.eq_ignore_ascii_case(self.method())));
        if !applies {
            return Ok(Verdict::Valid);
        }
        let valid = !operation_id.is_empty() && self.pattern()?.is_match(operation_id);
        Ok(Verdict::check(valid, [operation_id]))
    }
}

/// GET operation ids must use `Get` or `List`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetInOperationName;

impl Rule for GetInOperationName {
    fn id(&self) -> &'static str {
        "R1005"
    }

    fn name(&self) -> &'static str {
        "GetInOperationName"
    }

    fn description(&self) -> &'static str {
        "GET operation ids must be 'Noun_Get', 'Noun_List' or start with 'Get' or 'List'"
    }

    fn message_template(&self) -> &'static str {
        "'GET' operation '{0}' should use method name 'Get' or method name start with 'List'"
    }

    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for GetInOperationName {
    type Target = Scalar;

    fn is_valid<'a>(&self, operation_id: &'a str, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Convention::Get.check(operation_id, ctx)
    }
}

/// PUT operation ids must use `Create`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutInOperationName;

impl Rule for PutInOperationName {
    fn id(&self) -> &'static str {
        "R1006"
    }

    fn name(&self) -> &'static str {
        "PutInOperationName"
    }

    fn description(&self) -> &'static str {
        "PUT operation ids must be 'Noun_Create' or start with 'Create'"
    }

    fn message_template(&self) -> &'static str {
        "'PUT' operation '{0}' should use method name 'Create'"
    }

    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for PutInOperationName {
    type Target = Scalar;

    fn is_valid<'a>(&self, operation_id: &'a str, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Convention::Put.check(operation_id, ctx)
    }
}

/// PATCH operation ids must use `Update`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchInOperationName;

impl Rule for PatchInOperationName {
    fn id(&self) -> &'static str {
        "R1007"
    }

    fn name(&self) -> &'static str {
        "PatchInOperationName"
    }

    fn description(&self) -> &'static str {
        "PATCH operation ids must be 'Noun_Update' or start with 'Update'"
    }

    fn message_template(&self) -> &'static str {
        "'PATCH' operation '{0}' should use method name 'Update'"
    }

    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for PatchInOperationName {
    type Target = Scalar;

    fn is_valid<'a>(&self, operation_id: &'a str, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Convention::Patch.check(operation_id, ctx)
    }
}

/// DELETE operation ids must use `Delete`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteInOperationName;

impl Rule for DeleteInOperationName {
    fn id(&self) -> &'static str {
        "R1009"
    }

    fn name(&self) -> &'static str {
        "DeleteInOperationName"
    }

    fn description(&self) -> &'static str {
        "DELETE operation ids must be 'Noun_Delete' or start with 'Delete'"
    }

    fn message_template(&self) -> &'static str {
        "'DELETE' operation '{0}' should use method name 'Delete'"
    }

    fn key(&self) -> Option<&'static str> {
        Some("operationId")
    }
}

impl PredicateRule for DeleteInOperationName {
    type Target = Scalar;

    fn is_valid<'a>(&self, operation_id: &'a str, ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Convention::Delete.check(operation_id, ctx)
    }
}
