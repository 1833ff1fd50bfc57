//! Context types handed to rules during traversal.

use crate::model::ServiceDefinition;
use crate::node::{Node, Target};
use crate::path::{ObjectPath, Segment};
use crate::merge::MergedView;
use crate::reference::{Resolver, Source};
use crate::types::{DocumentKinds, MergeState};
use std::path::Path;
use std::rc::Rc;

/// Everything that stays fixed for one validation pass.
#[derive(Debug, Clone)]
pub struct PassScope<'a> {
    /// Document the pass runs over (first file of the group when composed).
    pub file: &'a Path,
    /// Root of the document, or of the merged view.
    pub root: &'a ServiceDefinition,
    /// Reference resolver for this pass.
    pub resolver: Resolver<'a>,
    /// Per-entry provenance in a composed pass.
    pub origins: Option<&'a MergedView>,
    /// Individual or composed pass.
    pub merge_state: MergeState,
    /// Kinds the document is declared as.
    pub document_kinds: DocumentKinds,
}

impl<'a> PassScope<'a> {
    /// Scope for an individual pass over a single document. File-qualified
    /// references are looked up in `group`.
    #[must_use]
    pub fn individual(
        file: &'a Path,
        root: &'a ServiceDefinition,
        kinds: DocumentKinds,
        group: &'a [Source<'a>],
    ) -> Self {
        Self {
            file,
            root,
            resolver: Resolver::new(Source { file, definition: root }, group),
            origins: None,
            merge_state: MergeState::Individual,
            document_kinds: kinds,
        }
    }

    /// Scope for the composed pass over a merged view of `group`.
    #[must_use]
    pub fn composed(view: &'a MergedView, kinds: DocumentKinds, group: &'a [Source<'a>]) -> Self {
        let home = Source {
            file: view.primary_file(),
            definition: view.definition(),
        };
        Self {
            file: home.file,
            root: home.definition,
            resolver: Resolver::new(home, group),
            origins: Some(view),
            merge_state: MergeState::Composed,
            document_kinds: kinds,
        }
    }
}

#[derive(Debug)]
struct Frame<'a> {
    path: ObjectPath,
    node: Node<'a>,
    parent: Option<Rc<Frame<'a>>>,
}

/// Location of the node currently being validated, with its ancestor chain.
///
/// Contexts are immutable: [`RuleContext::descend`] returns a child context
/// sharing this one as its parent. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    scope: &'a PassScope<'a>,
    frame: Rc<Frame<'a>>,
}

impl<'a> RuleContext<'a> {
    /// The context for the document root.
    #[must_use]
    pub fn root_context(scope: &'a PassScope<'a>) -> Self {
        Self {
            scope,
            frame: Rc::new(Frame {
                path: ObjectPath::root(),
                node: Node::ServiceRoot(scope.root),
                parent: None,
            }),
        }
    }

    /// Child context one segment below this one.
    #[must_use]
    pub fn descend(&self, segment: impl Into<Segment>, node: Node<'a>) -> Self {
        self.push(self.frame.path.append(segment.into()), node)
    }

    /// Child context several segments below this one, as a single frame.
    ///
    /// Used where the model skips intermediate JSON objects, e.g.
    /// `responses/200/schema`.
    #[must_use]
    pub fn descend_path<I, S>(&self, segments: I, node: Node<'a>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let path = segments
            .into_iter()
            .fold(self.frame.path.clone(), |path, s| path.append(s.into()));
        self.push(path, node)
    }

    fn push(&self, path: ObjectPath, node: Node<'a>) -> Self {
        Self {
            scope: self.scope,
            frame: Rc::new(Frame {
                path,
                node,
                parent: Some(Rc::clone(&self.frame)),
            }),
        }
    }

    /// The node at this location.
    #[must_use]
    pub fn node(&self) -> Node<'a> {
        self.frame.node
    }

    /// Path of this location from the document root.
    #[must_use]
    pub fn path(&self) -> &ObjectPath {
        &self.frame.path
    }

    /// Last segment of the path: the member name or index this node sits at.
    #[must_use]
    pub fn key(&self) -> Option<&Segment> {
        self.frame.path.last()
    }

    /// [`RuleContext::key`] as a member name.
    #[must_use]
    pub fn key_str(&self) -> Option<&str> {
        self.key().and_then(Segment::as_property)
    }

    /// The enclosing context, `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.frame.parent.as_ref().map(|frame| Self {
            scope: self.scope,
            frame: Rc::clone(frame),
        })
    }

    /// Nodes from this one up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + '_ {
        std::iter::successors(Some(&self.frame), |frame| frame.parent.as_ref()).map(|f| f.node)
    }

    /// The nearest node, starting with this one, that projects onto `T`.
    #[must_use]
    pub fn first_ancestor<T: Target>(&self) -> Option<T::Ref<'a>> {
        self.ancestors().find_map(T::project)
    }

    /// The file being validated.
    #[must_use]
    pub fn file(&self) -> &'a Path {
        self.scope.file
    }

    /// The document root node.
    #[must_use]
    pub fn root(&self) -> Node<'a> {
        Node::ServiceRoot(self.scope.root)
    }

    /// The document model (the merged view in a composed pass).
    #[must_use]
    pub fn service_definition(&self) -> &'a ServiceDefinition {
        self.scope.root
    }

    /// Resolver for `$ref`s at this location.
    ///
    /// In a composed pass, file-qualified references are resolved relative
    /// to the file that contributed the current entry.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'a> {
        match self.scope.origins {
            Some(view) => self.scope.resolver.rebased(view.origin_of(self.path())),
            None => self.scope.resolver,
        }
    }

    /// Mode of the current pass.
    #[must_use]
    pub fn merge_state(&self) -> MergeState {
        self.scope.merge_state
    }

    /// Kinds of the document being validated.
    #[must_use]
    pub fn document_kinds(&self) -> DocumentKinds {
        self.scope.document_kinds
    }
}
