//! # openapi-lint-rules
//!
//! Built-in convention rules for openapi-lint.
//!
//! Every rule is written against the capability traits of
//! `openapi-lint-core` and carries only compiled-in defaults. Severity,
//! category and document kinds are normally supplied by rule metadata.
//!
//! ## Available Rules
//!
//! | Id | Name | Checks |
//! |----|------|--------|
//! | R1001 | `OperationIdNounVerb` | operation ids follow `Noun_Verb` |
//! | R1005 | `GetInOperationName` | GET operation ids use `Get` or `List` |
//! | R1006 | `PutInOperationName` | PUT operation ids use `Create` |
//! | R1007 | `PatchInOperationName` | PATCH operation ids use `Update` |
//! | R1009 | `DeleteInOperationName` | DELETE operation ids use `Delete` |
//! | R2001 | `AvoidNestedProperties` | nested inline properties are flattened |
//! | R2003 | `ValidFormats` | `format` values are known |
//! | R2005 | `LongRunningResponseStatusCode` | long-running operations return the right codes |
//! | R2012 | `XmsClientNameParameter` | `x-ms-client-name` differs from the parameter name |
//! | R2017 | `PutRequestResponseScheme` | PUT request and 200 response share a model |
//! | R2023 | `SummaryAndDescriptionMustNotBeSame` | summary and description differ |
//! | R2027 | `DefaultMustBeInEnum` | defaults are among the enum values |
//! | R2028 | `NonEmptyClientName` | `x-ms-client-name` is not empty |
//! | R2054 | `SecurityDefinitionsStructure` | ARM security definitions shape |
//! | R2055 | `OneUnderscoreInOperationId` | at most one underscore in operation ids |
//! | R2056 | `RequiredReadOnlyProperties` | read-only properties are not required |
//!
//! ## Usage
//!
//! ```ignore
//! use openapi_lint_core::Validator;
//! use openapi_lint_rules::recommended_rules;
//!
//! let validator = Validator::builder()
//!     .rules(recommended_rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod avoid_nested_properties;
mod default_must_be_in_enum;
mod long_running_response_status_code;
mod non_empty_client_name;
mod one_underscore_in_operation_id;
mod operation_id_noun_verb;
mod operation_name;
mod presets;
mod put_request_response_scheme;
mod required_read_only_properties;
mod security_definitions_structure;
mod summary_and_description;
mod valid_formats;
mod xms_client_name_parameter;

pub use avoid_nested_properties::AvoidNestedProperties;
pub use default_must_be_in_enum::DefaultMustBeInEnum;
pub use long_running_response_status_code::LongRunningResponseStatusCode;
pub use non_empty_client_name::NonEmptyClientName;
pub use one_underscore_in_operation_id::OneUnderscoreInOperationId;
pub use operation_id_noun_verb::OperationIdNounVerb;
pub use operation_name::{
    DeleteInOperationName, GetInOperationName, PatchInOperationName, PutInOperationName,
};
pub use presets::{all_rules, naming_rules, recommended_rules, Preset};
pub use put_request_response_scheme::PutRequestResponseScheme;
pub use required_read_only_properties::RequiredReadOnlyProperties;
pub use security_definitions_structure::SecurityDefinitionsStructure;
pub use summary_and_description::SummaryAndDescriptionMustNotBeSame;
pub use valid_formats::ValidFormats;
pub use xms_client_name_parameter::XmsClientNameParameter;

/// Re-export core types for convenience.
pub use openapi_lint_core::{Rule, RuleBinding, Severity, ValidationMessage};
