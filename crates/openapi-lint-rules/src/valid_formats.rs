//! Rule checking `format` values against the known formats.
//!
//! # Configuration
//!
//! ```toml
//! [rules.R2003]
//! extra_formats = ["arm-id", "duration-constant"]
//! ```

use openapi_lint_core::{Config, PredicateRule, Rule, RuleContext, RuleError, Scalar, Verdict};
use std::collections::HashSet;

/// Rule id for ValidFormats.
pub const ID: &str = "R2003";

/// Rule name for ValidFormats.
pub const NAME: &str = "ValidFormats";

/// Formats code generators understand.
pub const KNOWN_FORMATS: &[&str] = &[
    "int32",
    "int64",
    "float",
    "double",
    "decimal",
    "byte",
    "binary",
    "char",
    "date",
    "date-time",
    "date-time-rfc1123",
    "duration",
    "password",
    "uuid",
    "base64url",
    "unixtime",
    "url",
];

/// Flags unknown `format` values.
#[derive(Debug, Clone)]
pub struct ValidFormats {
    /// Accepted formats.
    pub formats: HashSet<String>,
}

impl Default for ValidFormats {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidFormats {
    /// Creates a new rule accepting [`KNOWN_FORMATS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: KNOWN_FORMATS.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Accepts an additional format.
    #[must_use]
    pub fn allow(mut self, format: impl Into<String>) -> Self {
        self.formats.insert(format.into());
        self
    }

    /// Creates the rule with the `extra_formats` option of its
    /// `[rules.R2003]` section applied.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        config
            .rule_config(ID, NAME)
            .map(|rc| rc.get_str_array("extra_formats"))
            .unwrap_or_default()
            .into_iter()
            .fold(Self::new(), Self::allow)
    }
}

impl Rule for ValidFormats {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Format values must be known to code generators"
    }

    fn message_template(&self) -> &'static str {
        "'{0}' is not a known format"
    }

    fn key(&self) -> Option<&'static str> {
        Some("format")
    }
}

impl PredicateRule for ValidFormats {
    type Target = Scalar;

    fn is_valid<'a>(&self, format: &'a str, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
        Ok(Verdict::check(self.formats.contains(format), [format]))
    }
}
