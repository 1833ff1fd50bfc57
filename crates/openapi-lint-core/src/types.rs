//! Core types for diagnostics and validation reports.

use crate::path::ObjectPath;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::ops::{BitOr, BitOrAssign};
use std::path::PathBuf;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail validation.
    #[default]
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a lowercase metadata value.
    #[must_use]
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Which convention family a rule enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Uncategorized.
    #[default]
    None,
    /// Resource manager conventions.
    #[serde(rename = "ARMViolation")]
    ArmViolation,
    /// Cross-API conventions.
    #[serde(rename = "OneAPIViolation")]
    OneApiViolation,
    /// Conventions that affect generated SDKs.
    #[serde(rename = "SDKViolation")]
    SdkViolation,
    /// Documentation quality.
    Documentation,
}

impl Category {
    /// Parses a metadata value, case-insensitively.
    #[must_use]
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "armviolation" => Some(Self::ArmViolation),
            "oneapiviolation" => Some(Self::OneApiViolation),
            "sdkviolation" => Some(Self::SdkViolation),
            "documentation" => Some(Self::Documentation),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::ArmViolation => "ARMViolation",
            Self::OneApiViolation => "OneAPIViolation",
            Self::SdkViolation => "SDKViolation",
            Self::Documentation => "Documentation",
        };
        f.write_str(name)
    }
}

/// What fixing a violation would change for consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    /// No consumer-visible change.
    #[default]
    None,
    /// Changes the service contract.
    ServiceImpactingChanges,
    /// Changes generated SDKs.
    #[serde(rename = "SDKImpactingChanges")]
    SdkImpactingChanges,
}

impl Impact {
    /// Parses a metadata value, case-insensitively.
    #[must_use]
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "serviceimpactingchanges" => Some(Self::ServiceImpactingChanges),
            "sdkimpactingchanges" => Some(Self::SdkImpactingChanges),
            _ => None,
        }
    }
}

/// Whether a rule runs per file or over the merged view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeState {
    /// Once per file occurrence.
    #[default]
    Individual,
    /// Once over the merged view of a merge group.
    Composed,
}

impl MergeState {
    /// Parses a metadata value, case-insensitively.
    #[must_use]
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "individual" => Some(Self::Individual),
            "composed" => Some(Self::Composed),
            _ => None,
        }
    }
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Composed => write!(f, "composed"),
        }
    }
}

/// The kind a document is declared as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Plain API description.
    #[default]
    Default,
    /// Resource manager API.
    Arm,
    /// Data-plane API.
    DataPlane,
}

impl DocumentKind {
    /// The kinds a document of this declared kind carries.
    #[must_use]
    pub fn kinds(self) -> DocumentKinds {
        match self {
            Self::Default => DocumentKinds::DEFAULT,
            Self::Arm => DocumentKinds::DEFAULT | DocumentKinds::ARM,
            Self::DataPlane => DocumentKinds::DEFAULT | DocumentKinds::DATA_PLANE,
        }
    }
}

/// Bit set of [`DocumentKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKinds(u8);

impl DocumentKinds {
    /// No kind.
    pub const NONE: Self = Self(0);
    /// Applies to every document.
    pub const DEFAULT: Self = Self(1);
    /// Resource manager documents.
    pub const ARM: Self = Self(1 << 1);
    /// Data-plane documents.
    pub const DATA_PLANE: Self = Self(1 << 2);

    /// True if the two sets share a kind.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if every kind of `other` is in `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True for the empty set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses one metadata value (`default`, `arm`, `dataplane`).
    #[must_use]
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "default" => Some(Self::DEFAULT),
            "arm" => Some(Self::ARM),
            "dataplane" | "data-plane" => Some(Self::DATA_PLANE),
            _ => None,
        }
    }
}

impl Default for DocumentKinds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for DocumentKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DocumentKinds {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<DocumentKind> for DocumentKinds {
    fn from(kind: DocumentKind) -> Self {
        kind.kinds()
    }
}

impl fmt::Display for DocumentKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::DEFAULT, "default"),
            (Self::ARM, "arm"),
            (Self::DATA_PLANE, "data-plane"),
        ]
        .into_iter()
        .filter(|(kind, _)| self.contains(*kind))
        .map(|(_, name)| name)
        .collect();
        f.write_str(&names.join("|"))
    }
}

/// Diagnostics produced by the engine itself rather than by a rule's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InternalKind {
    /// A rule returned an error or panicked.
    RuleInvocationFailure,
    /// A `$ref` points at nothing.
    DanglingReference,
    /// A `$ref` chain loops.
    CyclicReference,
}

impl fmt::Display for InternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RuleInvocationFailure => "RuleInvocationFailure",
            Self::DanglingReference => "DanglingReference",
            Self::CyclicReference => "CyclicReference",
        };
        f.write_str(name)
    }
}

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    /// Rule id (e.g., "R1005").
    pub rule_id: String,
    /// Rule name (e.g., "GetInOperationName").
    pub rule_name: String,
    /// Effective severity.
    pub severity: Severity,
    /// Effective category.
    pub category: Category,
    /// Document the diagnostic is attributed to.
    pub file: PathBuf,
    /// Location inside that document.
    pub path: ObjectPath,
    /// Rendered message.
    pub message: String,
    /// Set for engine-produced diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<InternalKind>,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}: {} [{}] {}",
            self.file.display(),
            self.path,
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

/// Stage at which a unit of work was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// The document could not be loaded.
    Load,
    /// The merge group could not be merged.
    Merge,
}

/// A document or merge group that produced no diagnostics because it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    /// File, or first file of the merge group.
    pub unit: PathBuf,
    /// Where it failed.
    pub stage: FailureStage,
    /// Error text.
    pub message: String,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} failed): {}", self.unit.display(), self.stage, self.message)
    }
}

/// Result of validating a set of documents.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Diagnostics: individual passes in file order, then the composed pass.
    pub messages: Vec<ValidationMessage>,
    /// Units that could not be validated.
    pub failures: Vec<UnitFailure>,
    /// Number of documents validated.
    pub documents_checked: usize,
}

impl ValidationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors or failed units.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    /// Returns true if any message is at or above `severity`, or a unit failed.
    #[must_use]
    pub fn fails_at(&self, severity: Severity) -> bool {
        !self.failures.is_empty() || self.messages.iter().any(|m| m.severity >= severity)
    }

    /// Returns messages filtered by rule id.
    #[must_use]
    pub fn by_rule(&self, rule_id: &str) -> Vec<&ValidationMessage> {
        self.messages.iter().filter(|m| m.rule_id == rule_id).collect()
    }

    /// Counts messages by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.messages
            .iter()
            .fold((0, 0, 0), |(e, w, i), m| match m.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// One-line totals.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings, infos) = self.count_by_severity();
        let mut line = format!(
            "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} document(s)",
            self.documents_checked
        );
        if !self.failures.is_empty() {
            let _ = write!(line, "; {} unit(s) failed", self.failures.len());
        }
        line
    }

    /// Formats messages at or above `fail_on` as a multi-line report for
    /// `panic!()` messages in tests.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        let mut report = String::new();
        let failing: Vec<&ValidationMessage> =
            self.messages.iter().filter(|m| m.severity >= fail_on).collect();

        let _ = writeln!(report, "\n=== openapi-lint: {} diagnostic(s) ===\n", failing.len());
        for m in failing {
            let _ = writeln!(report, "{} [{}] at {}#{}", m.rule_name, m.rule_id, m.file.display(), m.path);
            let _ = writeln!(report, "  {}: {}\n", m.severity, m.message);
        }
        for failure in &self.failures {
            let _ = writeln!(report, "failed: {failure}");
        }
        let _ = writeln!(report, "{}", self.summary());
        report
    }
}

/// Substitutes `{0}`, `{1}`, ... in `template` with `params`.
///
/// Placeholders without a matching parameter are left as written.
#[must_use]
pub fn render_template(template: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let index = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|i| (i, close)));
        match index.and_then(|(i, close)| params.get(i).map(|p| (p, close))) {
            Some((param, close)) => {
                out.push_str(param);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(severity: Severity) -> ValidationMessage {
        ValidationMessage {
            rule_id: "R1005".into(),
            rule_name: "GetInOperationName".into(),
            severity,
            category: Category::None,
            file: PathBuf::from("pets.json"),
            path: ObjectPath::root().append_property("paths"),
            message: "bad".into(),
            internal: None,
        }
    }

    #[test]
    fn render_template_substitutes_positional_params() {
        let rendered = render_template(
            "'{0}' and '{1}' differ, '{0}' again",
            &["Foo".into(), "Bar".into()],
        );
        assert_eq!(rendered, "'Foo' and 'Bar' differ, 'Foo' again");
    }

    #[test]
    fn render_template_leaves_unknown_placeholders() {
        assert_eq!(render_template("{2} {x} {", &["a".into()]), "{2} {x} {");
    }

    #[test]
    fn arm_documents_carry_default_kind() {
        let kinds = DocumentKind::Arm.kinds();
        assert!(kinds.intersects(DocumentKinds::DEFAULT));
        assert!(kinds.intersects(DocumentKinds::ARM));
        assert!(!kinds.intersects(DocumentKinds::DATA_PLANE));
        assert!(!DocumentKind::Default.kinds().intersects(DocumentKinds::ARM));
        assert_eq!(kinds.to_string(), "default|arm");
    }

    #[test]
    fn metadata_values_are_case_insensitive() {
        assert_eq!(Severity::from_metadata("Warning"), Some(Severity::Warning));
        assert_eq!(Category::from_metadata("armviolation"), Some(Category::ArmViolation));
        assert_eq!(Impact::from_metadata("SDKImpactingChanges"), Some(Impact::SdkImpactingChanges));
        assert_eq!(MergeState::from_metadata("composed"), Some(MergeState::Composed));
        assert_eq!(DocumentKinds::from_metadata("dataplane"), Some(DocumentKinds::DATA_PLANE));
        assert_eq!(Severity::from_metadata("fatal"), None);
    }

    #[test]
    fn report_counts_and_failure_threshold() {
        let report = ValidationReport {
            messages: vec![message(Severity::Warning), message(Severity::Info)],
            failures: Vec::new(),
            documents_checked: 1,
        };
        assert_eq!(report.count_by_severity(), (0, 1, 1));
        assert!(!report.has_errors());
        assert!(report.fails_at(Severity::Warning));
        assert!(!report.fails_at(Severity::Error));
    }

    #[test]
    fn unit_failures_fail_the_report() {
        let report = ValidationReport {
            messages: Vec::new(),
            failures: vec![UnitFailure {
                unit: PathBuf::from("broken.json"),
                stage: FailureStage::Load,
                message: "not json".into(),
            }],
            documents_checked: 0,
        };
        assert!(report.has_errors());
    }

    #[test]
    fn message_serializes_path_as_segments() {
        let value = serde_json::to_value(message(Severity::Error)).unwrap();
        assert_eq!(value["ruleId"], "R1005");
        assert_eq!(value["path"], serde_json::json!(["paths"]));
        assert!(value.get("internal").is_none());
    }
}
