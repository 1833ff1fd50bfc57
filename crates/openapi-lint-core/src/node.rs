//! The closed set of node variants rules can target.

use crate::model::{OrderedMap, Operation, Parameter, PathItem, Schema, SecurityDefinition, ServiceDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A vendor extension member: its key and raw value.
#[derive(Debug, Clone, Copy)]
pub struct Extension<'a> {
    /// Member name, including the `x-` prefix.
    pub name: &'a str,
    /// Raw JSON value.
    pub value: &'a Value,
}

/// A borrowed view of one node of a [`ServiceDefinition`].
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// The document root.
    ServiceRoot(&'a ServiceDefinition),
    /// The `paths` object.
    PathsMap(&'a OrderedMap<PathItem>),
    /// An operation under a path item.
    Operation(&'a Operation),
    /// A parameter (inline, global, or `$ref` stub).
    Parameter(&'a Parameter),
    /// A schema (definition, property, items, response body, ...).
    Schema(&'a Schema),
    /// A schema's `properties` object.
    PropertiesMap(&'a OrderedMap<Schema>),
    /// A `securityDefinitions` entry.
    SecurityDefinition(&'a SecurityDefinition),
    /// A vendor extension member.
    ExtensionValue(Extension<'a>),
    /// A string-valued leaf field such as `operationId` or `format`.
    Scalar(&'a str),
}

impl Node<'_> {
    /// The variant of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::ServiceRoot(_) => NodeKind::ServiceRoot,
            Self::PathsMap(_) => NodeKind::PathsMap,
            Self::Operation(_) => NodeKind::Operation,
            Self::Parameter(_) => NodeKind::Parameter,
            Self::Schema(_) => NodeKind::Schema,
            Self::PropertiesMap(_) => NodeKind::PropertiesMap,
            Self::SecurityDefinition(_) => NodeKind::SecurityDefinition,
            Self::ExtensionValue(_) => NodeKind::ExtensionValue,
            Self::Scalar(_) => NodeKind::Scalar,
        }
    }
}

/// Fieldless discriminant of [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    /// [`Node::ServiceRoot`]
    ServiceRoot,
    /// [`Node::PathsMap`]
    PathsMap,
    /// [`Node::Operation`]
    Operation,
    /// [`Node::Parameter`]
    Parameter,
    /// [`Node::Schema`]
    Schema,
    /// [`Node::PropertiesMap`]
    PropertiesMap,
    /// [`Node::SecurityDefinition`]
    SecurityDefinition,
    /// [`Node::ExtensionValue`]
    ExtensionValue,
    /// [`Node::Scalar`]
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServiceRoot => "ServiceRoot",
            Self::PathsMap => "PathsMap",
            Self::Operation => "Operation",
            Self::Parameter => "Parameter",
            Self::Schema => "Schema",
            Self::PropertiesMap => "PropertiesMap",
            Self::SecurityDefinition => "SecurityDefinition",
            Self::ExtensionValue => "ExtensionValue",
            Self::Scalar => "Scalar",
        };
        f.write_str(name)
    }
}

/// A type a rule can be written against.
///
/// Each implementation names exactly one [`NodeKind`] and projects a [`Node`]
/// of that kind onto a typed reference. The dispatcher only hands a rule the
/// nodes of its target kind, so the projection never fails in practice.
pub trait Target {
    /// The node variant this target corresponds to.
    const KIND: NodeKind;

    /// Typed view handed to rules.
    type Ref<'a>;

    /// Projects a node onto this target, or `None` for any other variant.
    fn project(node: Node<'_>) -> Option<Self::Ref<'_>>;
}

/// Target marker for the `paths` object.
#[derive(Debug)]
pub struct PathsMap;

/// Target marker for a schema's `properties` object.
#[derive(Debug)]
pub struct PropertiesMap;

/// Target marker for vendor extension members.
#[derive(Debug)]
pub struct ExtensionValue;

/// Target marker for string-valued leaf fields.
#[derive(Debug)]
pub struct Scalar;

impl Target for ServiceDefinition {
    const KIND: NodeKind = NodeKind::ServiceRoot;
    type Ref<'a> = &'a ServiceDefinition;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::ServiceRoot(root) => Some(root),
            _ => None,
        }
    }
}

impl Target for PathsMap {
    const KIND: NodeKind = NodeKind::PathsMap;
    type Ref<'a> = &'a OrderedMap<PathItem>;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::PathsMap(paths) => Some(paths),
            _ => None,
        }
    }
}

impl Target for Operation {
    const KIND: NodeKind = NodeKind::Operation;
    type Ref<'a> = &'a Operation;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::Operation(op) => Some(op),
            _ => None,
        }
    }
}

impl Target for Parameter {
    const KIND: NodeKind = NodeKind::Parameter;
    type Ref<'a> = &'a Parameter;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }
}

impl Target for Schema {
    const KIND: NodeKind = NodeKind::Schema;
    type Ref<'a> = &'a Schema;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}

impl Target for PropertiesMap {
    const KIND: NodeKind = NodeKind::PropertiesMap;
    type Ref<'a> = &'a OrderedMap<Schema>;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::PropertiesMap(properties) => Some(properties),
            _ => None,
        }
    }
}

impl Target for SecurityDefinition {
    const KIND: NodeKind = NodeKind::SecurityDefinition;
    type Ref<'a> = &'a SecurityDefinition;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::SecurityDefinition(definition) => Some(definition),
            _ => None,
        }
    }
}

impl Target for ExtensionValue {
    const KIND: NodeKind = NodeKind::ExtensionValue;
    type Ref<'a> = Extension<'a>;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::ExtensionValue(extension) => Some(extension),
            _ => None,
        }
    }
}

impl Target for Scalar {
    const KIND: NodeKind = NodeKind::Scalar;
    type Ref<'a> = &'a str;

    fn project(node: Node<'_>) -> Option<Self::Ref<'_>> {
        match node {
            Node::Scalar(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_matches_only_its_kind() {
        let schema = Schema::default();
        let node = Node::Schema(&schema);
        assert_eq!(node.kind(), NodeKind::Schema);
        assert!(<Schema as Target>::project(node).is_some());
        assert!(<Operation as Target>::project(node).is_none());
        assert!(<Scalar as Target>::project(node).is_none());
    }

    #[test]
    fn target_kinds_line_up_with_node_kinds() {
        let op = Operation::default();
        assert_eq!(Node::Operation(&op).kind(), <Operation as Target>::KIND);
        assert_eq!(Node::Scalar("x").kind(), <Scalar as Target>::KIND);
    }
}
