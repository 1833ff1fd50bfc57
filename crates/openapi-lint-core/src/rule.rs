//! Rule traits for defining convention rules.
//!
//! A rule implements [`Rule`] for its metadata and exactly one of the
//! capability traits:
//!
//! - [`PredicateRule`]: a yes/no check of one node, reported at that node.
//! - [`GeneratorRule`]: zero or more findings per node, each with its own path.
//! - [`ExtensionRule`]: a predicate over one named vendor extension.
//!
//! Capability traits are typed by a [`Target`]; [`RuleBinding`] erases that
//! type so the registry can hold rules of every shape side by side.

use crate::context::RuleContext;
use crate::node::{Extension, ExtensionValue, Node, NodeKind, Target};
use crate::path::ObjectPath;
use crate::reference::ReferenceFailure;
use crate::types::{Category, DocumentKinds, Impact, MergeState, Severity};
use std::fmt;

/// Metadata every rule carries.
///
/// The defaults are the compiled-in values used when neither rule metadata
/// nor local configuration says otherwise.
///
/// # Example
///
/// ```ignore
/// use openapi_lint_core::{Rule, PredicateRule, RuleContext, RuleError, Scalar, Verdict};
///
/// pub struct NoUppercaseFormat;
///
/// impl Rule for NoUppercaseFormat {
///     fn id(&self) -> &'static str { "X0001" }
///     fn name(&self) -> &'static str { "NoUppercaseFormat" }
///     fn message_template(&self) -> &'static str { "format '{0}' must be lowercase" }
///     fn key(&self) -> Option<&'static str> { Some("format") }
/// }
///
/// impl PredicateRule for NoUppercaseFormat {
///     type Target = Scalar;
///
///     fn is_valid<'a>(&self, format: &'a str, _ctx: &RuleContext<'a>) -> Result<Verdict, RuleError> {
///         Ok(Verdict::check(format == format.to_lowercase(), [format]))
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Stable rule id (e.g., "R1005").
    fn id(&self) -> &'static str;

    /// PascalCase rule name (e.g., "GetInOperationName").
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Message with `{0}`, `{1}`, ... placeholders for the finding's params.
    fn message_template(&self) -> &'static str;

    /// Member name the node must sit at, for `Scalar` targets.
    fn key(&self) -> Option<&'static str> {
        None
    }

    /// Returns the default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    /// Returns the default category.
    fn default_category(&self) -> Category {
        Category::None
    }

    /// Document kinds this rule applies to.
    fn document_kinds(&self) -> DocumentKinds {
        DocumentKinds::DEFAULT
    }

    /// Whether this rule runs per file or over the merged view.
    fn merge_state(&self) -> MergeState {
        MergeState::Individual
    }

    /// Consumer impact of fixing a violation.
    fn impact(&self) -> Impact {
        Impact::None
    }
}

/// Outcome of a predicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No diagnostic.
    Valid,
    /// One diagnostic, rendered from the rule's template with these params.
    Invalid(Vec<String>),
}

impl Verdict {
    /// An invalid verdict with the given params.
    pub fn invalid<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        Self::Invalid(params.into_iter().map(|p| p.to_string()).collect())
    }

    /// `Valid` when `valid` holds, otherwise `Invalid(params)`.
    pub fn check<I, S>(valid: bool, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        if valid {
            Self::Valid
        } else {
            Self::invalid(params)
        }
    }

    /// True for [`Verdict::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// One diagnostic produced by a generator rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Where the diagnostic is reported. Must exist in the document.
    pub path: ObjectPath,
    /// Template params.
    pub params: Vec<String>,
}

impl Finding {
    /// A finding at `path`.
    pub fn new<I, S>(path: ObjectPath, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        Self {
            path,
            params: params.into_iter().map(|p| p.to_string()).collect(),
        }
    }

    /// A finding at the context's own path.
    pub fn at<I, S>(ctx: &RuleContext<'_>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        Self::new(ctx.path().clone(), params)
    }
}

/// Lazy sequence of findings.
pub type Findings<'a> = Box<dyn Iterator<Item = Result<Finding, RuleError>> + 'a>;

/// Converts a list of findings into [`Findings`].
#[must_use]
pub fn findings_from<'a>(findings: Vec<Finding>) -> Findings<'a> {
    Box::new(findings.into_iter().map(Ok))
}

/// Error a rule may return instead of a verdict.
///
/// Reported as a `RuleInvocationFailure` diagnostic; traversal continues.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A reference the rule needed could not be resolved.
    #[error(transparent)]
    Reference(#[from] ReferenceFailure),

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

/// A yes/no check of one node.
pub trait PredicateRule: Rule {
    /// Node type this rule checks.
    type Target: Target;

    /// Checks one node.
    ///
    /// # Errors
    ///
    /// Returns an error when the rule cannot decide.
    fn is_valid<'a>(
        &self,
        node: <Self::Target as Target>::Ref<'a>,
        ctx: &RuleContext<'a>,
    ) -> Result<Verdict, RuleError>;
}

/// A rule producing any number of findings per node.
pub trait GeneratorRule: Rule {
    /// Node type this rule inspects.
    type Target: Target;

    /// Produces findings for one node.
    fn findings<'a>(
        &'a self,
        node: <Self::Target as Target>::Ref<'a>,
        ctx: &'a RuleContext<'a>,
    ) -> Findings<'a>;
}

/// A predicate over one named vendor extension, whatever its value's shape.
pub trait ExtensionRule: Rule {
    /// Extension member name, including the `x-` prefix.
    fn extension_name(&self) -> &'static str;

    /// Checks one occurrence of the extension.
    ///
    /// # Errors
    ///
    /// Returns an error when the rule cannot decide.
    fn is_valid<'a>(
        &self,
        extension: Extension<'a>,
        ctx: &RuleContext<'a>,
    ) -> Result<Verdict, RuleError>;
}

/// The capability a binding was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleShape {
    /// [`PredicateRule`]
    Predicate,
    /// [`GeneratorRule`]
    Generator,
    /// [`ExtensionRule`]
    Extension,
}

impl fmt::Display for RuleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate => write!(f, "predicate"),
            Self::Generator => write!(f, "generator"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// Result of invoking a binding on a node.
pub(crate) enum Invocation<'a> {
    Verdict(Result<Verdict, RuleError>),
    Findings(Findings<'a>),
    Skipped,
}

trait ErasedRule: Send + Sync {
    fn rule(&self) -> &dyn Rule;
    fn shape(&self) -> RuleShape;
    fn target(&self) -> NodeKind;
    fn key(&self) -> Option<&'static str>;
    fn invoke<'a>(&'a self, node: Node<'a>, ctx: &'a RuleContext<'a>) -> Invocation<'a>;
}

struct Predicate<R>(R);
struct Generator<R>(R);
struct ExtensionBound<R>(R);

impl<R: PredicateRule> ErasedRule for Predicate<R> {
    fn rule(&self) -> &dyn Rule {
        &self.0
    }
    fn shape(&self) -> RuleShape {
        RuleShape::Predicate
    }
    fn target(&self) -> NodeKind {
        R::Target::KIND
    }
    fn key(&self) -> Option<&'static str> {
        self.0.key()
    }
    fn invoke<'a>(&'a self, node: Node<'a>, ctx: &'a RuleContext<'a>) -> Invocation<'a> {
        match R::Target::project(node) {
            Some(target) => Invocation::Verdict(self.0.is_valid(target, ctx)),
            None => Invocation::Skipped,
        }
    }
}

impl<R: GeneratorRule> ErasedRule for Generator<R> {
    fn rule(&self) -> &dyn Rule {
        &self.0
    }
    fn shape(&self) -> RuleShape {
        RuleShape::Generator
    }
    fn target(&self) -> NodeKind {
        R::Target::KIND
    }
    fn key(&self) -> Option<&'static str> {
        self.0.key()
    }
    fn invoke<'a>(&'a self, node: Node<'a>, ctx: &'a RuleContext<'a>) -> Invocation<'a> {
        match R::Target::project(node) {
            Some(target) => Invocation::Findings(self.0.findings(target, ctx)),
            None => Invocation::Skipped,
        }
    }
}

impl<R: ExtensionRule> ErasedRule for ExtensionBound<R> {
    fn rule(&self) -> &dyn Rule {
        &self.0
    }
    fn shape(&self) -> RuleShape {
        RuleShape::Extension
    }
    fn target(&self) -> NodeKind {
        NodeKind::ExtensionValue
    }
    fn key(&self) -> Option<&'static str> {
        Some(self.0.extension_name())
    }
    fn invoke<'a>(&'a self, node: Node<'a>, ctx: &'a RuleContext<'a>) -> Invocation<'a> {
        match ExtensionValue::project(node) {
            Some(extension) if extension.name == self.0.extension_name() => {
                Invocation::Verdict(self.0.is_valid(extension, ctx))
            }
            _ => Invocation::Skipped,
        }
    }
}

/// A rule with its target type erased, ready for registration.
pub struct RuleBinding {
    inner: Box<dyn ErasedRule>,
}

impl RuleBinding {
    /// Binds a predicate rule.
    #[must_use]
    pub fn predicate<R: PredicateRule + 'static>(rule: R) -> Self {
        Self {
            inner: Box::new(Predicate(rule)),
        }
    }

    /// Binds a generator rule.
    #[must_use]
    pub fn generator<R: GeneratorRule + 'static>(rule: R) -> Self {
        Self {
            inner: Box::new(Generator(rule)),
        }
    }

    /// Binds an extension rule.
    #[must_use]
    pub fn extension<R: ExtensionRule + 'static>(rule: R) -> Self {
        Self {
            inner: Box::new(ExtensionBound(rule)),
        }
    }

    /// The rule's metadata.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule {
        self.inner.rule()
    }

    /// How the rule was bound.
    #[must_use]
    pub fn shape(&self) -> RuleShape {
        self.inner.shape()
    }

    /// The node variant the rule targets.
    #[must_use]
    pub fn target(&self) -> NodeKind {
        self.inner.target()
    }

    /// Member name filter: field name for scalar rules, extension name for
    /// extension rules.
    #[must_use]
    pub fn key(&self) -> Option<&'static str> {
        self.inner.key()
    }

    pub(crate) fn invoke<'a>(&'a self, node: Node<'a>, ctx: &'a RuleContext<'a>) -> Invocation<'a> {
        self.inner.invoke(node, ctx)
    }
}

impl fmt::Debug for RuleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBinding")
            .field("id", &self.rule().id())
            .field("shape", &self.shape())
            .field("target", &self.target())
            .field("key", &self.key())
            .finish()
    }
}
