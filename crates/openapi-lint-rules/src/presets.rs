//! Rule presets for common configurations.

use crate::{
    AvoidNestedProperties, DefaultMustBeInEnum, DeleteInOperationName, GetInOperationName,
    LongRunningResponseStatusCode, NonEmptyClientName, OneUnderscoreInOperationId,
    OperationIdNounVerb, PatchInOperationName, PutInOperationName, PutRequestResponseScheme,
    RequiredReadOnlyProperties, SecurityDefinitionsStructure, SummaryAndDescriptionMustNotBeSame,
    ValidFormats, XmsClientNameParameter,
};
use openapi_lint_core::{Config, RuleBinding};
use std::fmt;
use std::str::FromStr;

/// Preset configurations for openapi-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every built-in rule.
    #[default]
    Recommended,
    /// Operation id naming rules only.
    Naming,
}

impl Preset {
    /// Returns the rules for this preset with default options.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBinding> {
        self.configured_rules(&Config::default())
    }

    /// Returns the rules for this preset, applying rule options from
    /// `config`.
    #[must_use]
    pub fn configured_rules(self, config: &Config) -> Vec<RuleBinding> {
        match self {
            Self::Recommended => {
                let mut rules = naming_rules();
                rules.extend(model_rules(config));
                rules
            }
            Self::Naming => naming_rules(),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Self::Recommended),
            "naming" => Ok(Self::Naming),
            other => Err(format!("unknown preset '{other}' (expected recommended or naming)")),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recommended => write!(f, "recommended"),
            Self::Naming => write!(f, "naming"),
        }
    }
}

/// Returns the recommended set of rules: every built-in rule.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBinding> {
    Preset::Recommended.rules()
}

/// Returns the operation id naming rules.
///
/// Includes:
/// - `OperationIdNounVerb` (R1001)
/// - `GetInOperationName` (R1005), `PutInOperationName` (R1006),
///   `PatchInOperationName` (R1007), `DeleteInOperationName` (R1009)
/// - `OneUnderscoreInOperationId` (R2055)
#[must_use]
pub fn naming_rules() -> Vec<RuleBinding> {
    vec![
        RuleBinding::generator(OperationIdNounVerb::new()),
        RuleBinding::predicate(GetInOperationName),
        RuleBinding::predicate(PutInOperationName),
        RuleBinding::predicate(PatchInOperationName),
        RuleBinding::predicate(DeleteInOperationName),
        RuleBinding::predicate(OneUnderscoreInOperationId),
    ]
}

fn model_rules(config: &Config) -> Vec<RuleBinding> {
    vec![
        RuleBinding::generator(PutRequestResponseScheme),
        RuleBinding::generator(RequiredReadOnlyProperties),
        RuleBinding::predicate(AvoidNestedProperties),
        RuleBinding::predicate(DefaultMustBeInEnum),
        RuleBinding::predicate(ValidFormats::from_config(config)),
        RuleBinding::generator(XmsClientNameParameter),
        RuleBinding::extension(NonEmptyClientName),
        RuleBinding::extension(LongRunningResponseStatusCode),
        RuleBinding::predicate(SummaryAndDescriptionMustNotBeSame),
        RuleBinding::generator(SecurityDefinitionsStructure),
    ]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBinding> {
    recommended_rules()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.rules().len(), 16);
        assert_eq!(Preset::Naming.rules().len(), 6);
    }

    #[test]
    fn rule_ids_are_unique() {
        let ids: HashSet<_> = all_rules().iter().map(|r| r.rule().id()).collect();
        assert_eq!(ids.len(), all_rules().len());
    }

    #[test]
    fn presets_parse_from_config_names() {
        assert_eq!("naming".parse::<Preset>(), Ok(Preset::Naming));
        assert_eq!(Preset::Recommended.to_string(), "recommended");
        assert!("strict".parse::<Preset>().is_err());
    }
}
