//! Addressable locations inside a specification document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One step of an [`ObjectPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Object member name.
    Property(String),
    /// Array index.
    Index(usize),
}

impl Segment {
    /// Returns the property name, if this is a property segment.
    #[must_use]
    pub fn as_property(&self) -> Option<&str> {
        match self {
            Self::Property(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::Property(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self::Property(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => write!(f, "{}", escape_pointer_token(name)),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered sequence of segments from the document root.
///
/// Displays as an RFC 6901 JSON pointer (`/paths/~1pets/get`) and serializes
/// as the plain segment array, so the reporting layer can rebuild either form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(Vec<Segment>);

impl ObjectPath {
    /// The empty path, addressing the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a property segment appended.
    #[must_use]
    pub fn append_property(&self, name: impl Into<String>) -> Self {
        self.append(Segment::Property(name.into()))
    }

    /// Returns a new path with an index segment appended.
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        self.append(Segment::Index(index))
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn append(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// The segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The last segment.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the path as a JSON pointer.
    #[must_use]
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }

    /// Looks the path up in a raw JSON document.
    #[must_use]
    pub fn resolve<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(document, |current, segment| match (segment, current) {
                (Segment::Property(name), Value::Object(map)) => map.get(name),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

impl<S: Into<Segment>> FromIterator<S> for ObjectPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Escapes a member name for use inside a JSON pointer.
#[must_use]
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_pointer_token`].
#[must_use]
pub fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_escapes_slashes_and_tildes() {
        let path = ObjectPath::root()
            .append_property("paths")
            .append_property("/pets/{id}")
            .append_property("get")
            .append_property("a~b");
        assert_eq!(path.to_pointer(), "/paths/~1pets~1{id}/get/a~0b");
    }

    #[test]
    fn root_pointer_is_empty() {
        assert_eq!(ObjectPath::root().to_pointer(), "");
    }

    #[test]
    fn resolve_walks_properties_and_indices() {
        let doc = json!({
            "paths": { "/pets": { "get": { "parameters": [ { "name": "a" }, { "name": "b" } ] } } }
        });
        let path: ObjectPath = ["paths", "/pets", "get", "parameters"]
            .into_iter()
            .map(Segment::from)
            .chain(std::iter::once(Segment::Index(1)))
            .collect();
        assert_eq!(path.resolve(&doc), Some(&json!({ "name": "b" })));
    }

    #[test]
    fn resolve_missing_member_is_none() {
        let doc = json!({ "paths": {} });
        let path = ObjectPath::root().append_property("definitions");
        assert!(path.resolve(&doc).is_none());
    }

    #[test]
    fn serializes_as_segment_array() {
        let path = ObjectPath::root().append_property("parameters").append_index(0);
        let value = serde_json::to_value(&path).unwrap();
        assert_eq!(value, json!(["parameters", 0]));
    }

    #[test]
    fn unescape_round_trips_member_names() {
        let name = "/a~b/c";
        assert_eq!(unescape_pointer_token(&escape_pointer_token(name)), name);
    }
}
