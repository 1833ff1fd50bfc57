//! `$ref` parsing and resolution across loaded documents.

use crate::model::{Parameter, Schema, ServiceDefinition};
use crate::path::unescape_pointer_token;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// The top-level section a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `#/definitions/{name}`
    Definitions,
    /// `#/parameters/{name}`
    Parameters,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definitions => f.write_str("definitions"),
            Self::Parameters => f.write_str("parameters"),
        }
    }
}

/// A parsed `$ref` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// File part before `#`, if any.
    pub file: Option<String>,
    /// Target section.
    pub section: Section,
    /// Target name, pointer-unescaped.
    pub name: String,
    /// Pointer tokens below the named definition, pointer-unescaped.
    pub rest: Vec<String>,
}

impl Reference {
    /// Parses `[file]#/definitions/Name[/...]` or `[file]#/parameters/Name`.
    ///
    /// Returns `None` for any other shape.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (file, fragment) = raw.split_once('#')?;
        let mut tokens = fragment.strip_prefix('/')?.split('/');
        let section = match tokens.next()? {
            "definitions" => Section::Definitions,
            "parameters" => Section::Parameters,
            _ => return None,
        };
        let name = tokens.next().filter(|n| !n.is_empty())?;
        let rest: Vec<String> = tokens.map(unescape_pointer_token).collect();
        if section == Section::Parameters && !rest.is_empty() {
            return None;
        }
        Some(Self {
            file: (!file.is_empty()).then(|| file.to_string()),
            section,
            name: unescape_pointer_token(name),
            rest,
        })
    }

    /// The name when the reference targets a whole entry of `definitions`.
    ///
    /// Convenience for rules comparing model names.
    #[must_use]
    pub fn definition_name(raw: &str) -> Option<String> {
        Self::parse(raw)
            .filter(|r| r.section == Section::Definitions && r.rest.is_empty())
            .map(|r| r.name)
    }
}

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceFailure {
    /// The target does not exist or its file is not loaded.
    #[error("reference '{reference}' does not resolve")]
    Dangling {
        /// The unresolvable reference string.
        reference: String,
    },

    /// Following the chain revisited a target.
    #[error("reference '{reference}' is cyclic: {}", chain.join(" -> "))]
    Cyclic {
        /// The reference resolution started from.
        reference: String,
        /// Reference strings followed, in order, ending with the revisit.
        chain: Vec<String>,
    },

    /// The pointer shape is outside what the model keeps, e.g.
    /// `#/responses/NotFound` or `#/definitions/Foo/enum/0`.
    #[error("reference '{reference}' is not checked")]
    Unsupported {
        /// The reference string.
        reference: String,
    },
}

/// A resolved reference target.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    /// A schema from `definitions`, or nested inside one.
    Schema(&'a Schema),
    /// A parameter from the global `parameters`.
    Parameter(&'a Parameter),
}

/// A document the resolver can look targets up in.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Path of the document.
    pub file: &'a Path,
    /// Its model.
    pub definition: &'a ServiceDefinition,
}

/// Resolves references for one validation pass.
///
/// Local references (`#/...`) are looked up in the document that contains
/// them, starting with `home`; file-qualified references are resolved
/// relative to the referring file and looked up among the loaded documents.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    home: Source<'a>,
    documents: &'a [Source<'a>],
}

impl<'a> Resolver<'a> {
    /// Creates a resolver rooted at `home`, able to reach `documents`.
    #[must_use]
    pub fn new(home: Source<'a>, documents: &'a [Source<'a>]) -> Self {
        Self { home, documents }
    }

    /// A resolver that only knows a single document.
    #[must_use]
    pub fn single(file: &'a Path, definition: &'a ServiceDefinition) -> Self {
        Self::new(Source { file, definition }, &[])
    }

    /// The same resolver, with file-qualified references made relative to
    /// `file`. Local references still go to the home model.
    #[must_use]
    pub fn rebased(self, file: &'a Path) -> Self {
        Self {
            home: Source { file, ..self.home },
            ..self
        }
    }

    /// The document local references start from.
    #[must_use]
    pub fn home(&self) -> Source<'a> {
        self.home
    }

    /// Follows `reference` until a non-reference schema or parameter is
    /// reached.
    ///
    /// # Errors
    ///
    /// [`ReferenceFailure::Dangling`] when a link of the chain has no target,
    /// [`ReferenceFailure::Cyclic`] when the chain revisits a target, and
    /// [`ReferenceFailure::Unsupported`] for pointer shapes the model does not
    /// keep.
    pub fn resolve(&self, reference: &str) -> Result<Resolved<'a>, ReferenceFailure> {
        let mut owner = self.home;
        let mut raw = reference;
        let mut visited: Vec<(PathBuf, Reference)> = Vec::new();
        let mut chain: Vec<String> = Vec::new();

        loop {
            chain.push(raw.to_string());
            let dangling = || ReferenceFailure::Dangling {
                reference: raw.to_string(),
            };

            let parsed = Reference::parse(raw).ok_or_else(|| ReferenceFailure::Unsupported {
                reference: raw.to_string(),
            })?;
            let doc = match &parsed.file {
                None => owner,
                Some(file) => self.find_document(owner.file, file).ok_or_else(dangling)?,
            };

            let key = (
                doc.file.to_path_buf(),
                Reference {
                    file: None,
                    ..parsed.clone()
                },
            );
            if visited.contains(&key) {
                return Err(ReferenceFailure::Cyclic {
                    reference: reference.to_string(),
                    chain,
                });
            }
            visited.push(key);

            let next = match parsed.section {
                Section::Definitions => {
                    let named = doc
                        .definition
                        .definitions
                        .get(&parsed.name)
                        .ok_or_else(dangling)?;
                    let schema = match walk(named, &parsed.rest) {
                        Walk::Found(schema) => schema,
                        Walk::Missing => return Err(dangling()),
                        Walk::Unsupported => {
                            return Err(ReferenceFailure::Unsupported {
                                reference: raw.to_string(),
                            })
                        }
                    };
                    match &schema.reference {
                        Some(next) => next,
                        None => return Ok(Resolved::Schema(schema)),
                    }
                }
                Section::Parameters => {
                    let parameter = doc
                        .definition
                        .parameters
                        .get(&parsed.name)
                        .ok_or_else(dangling)?;
                    match &parameter.reference {
                        Some(next) => next,
                        None => return Ok(Resolved::Parameter(parameter)),
                    }
                }
            };

            owner = doc;
            raw = next;
        }
    }

    /// Returns `schema` itself when it is not a reference, otherwise the
    /// schema at the end of its reference chain.
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::resolve`], and with `Dangling` when the chain
    /// ends at a parameter.
    pub fn unwrap_schema<'s>(&self, schema: &'s Schema) -> Result<&'s Schema, ReferenceFailure>
    where
        'a: 's,
    {
        let Some(reference) = &schema.reference else {
            return Ok(schema);
        };
        match self.resolve(reference)? {
            Resolved::Schema(target) => Ok(target),
            Resolved::Parameter(_) => Err(ReferenceFailure::Dangling {
                reference: reference.clone(),
            }),
        }
    }

    /// Parameter counterpart of [`Resolver::unwrap_schema`].
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::resolve`], and with `Dangling` when the chain
    /// ends at a schema.
    pub fn unwrap_parameter<'s>(
        &self,
        parameter: &'s Parameter,
    ) -> Result<&'s Parameter, ReferenceFailure>
    where
        'a: 's,
    {
        let Some(reference) = &parameter.reference else {
            return Ok(parameter);
        };
        match self.resolve(reference)? {
            Resolved::Parameter(target) => Ok(target),
            Resolved::Schema(_) => Err(ReferenceFailure::Dangling {
                reference: reference.clone(),
            }),
        }
    }

    fn find_document(&self, from: &Path, file: &str) -> Option<Source<'a>> {
        let candidates = || self.documents.iter().copied().chain(std::iter::once(self.home));

        let wanted = normalize(&from.parent().unwrap_or(Path::new("")).join(file));
        if let Some(doc) = candidates().find(|d| normalize(d.file) == wanted) {
            return Some(doc);
        }

        // Fall back to a suffix match for documents loaded from another root.
        let suffix: PathBuf = Path::new(file)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        if suffix.as_os_str().is_empty() {
            return None;
        }
        candidates().find(|d| d.file.ends_with(&suffix))
    }
}

enum Walk<'s> {
    Found(&'s Schema),
    Missing,
    Unsupported,
}

/// Follows pointer tokens below a named schema.
fn walk<'s>(schema: &'s Schema, tokens: &[String]) -> Walk<'s> {
    let mut current = schema;
    let mut tokens = tokens.iter();
    while let Some(token) = tokens.next() {
        let next = match token.as_str() {
            "properties" => tokens.next().and_then(|name| current.properties.get(name)),
            "items" => current.items.as_deref(),
            "additionalProperties" => current.additional_properties.as_deref(),
            "allOf" => tokens
                .next()
                .and_then(|index| index.parse::<usize>().ok())
                .and_then(|index| current.all_of.get(index)),
            _ => return Walk::Unsupported,
        };
        match next {
            Some(schema) => current = schema,
            None => return Walk::Missing,
        }
    }
    Walk::Found(current)
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(value: serde_json::Value) -> ServiceDefinition {
        ServiceDefinition::from_value(&value).unwrap()
    }

    #[test]
    fn parses_local_and_file_qualified_references() {
        let local = Reference::parse("#/definitions/Foo").unwrap();
        assert_eq!(local.file, None);
        assert_eq!(local.section, Section::Definitions);
        assert_eq!(local.name, "Foo");

        let remote = Reference::parse("../common/types.json#/parameters/ApiVersion").unwrap();
        assert_eq!(remote.file.as_deref(), Some("../common/types.json"));
        assert_eq!(remote.section, Section::Parameters);
    }

    #[test]
    fn keeps_tokens_below_the_definition_name() {
        let deep = Reference::parse("#/definitions/Foo/properties/a~1b").unwrap();
        assert_eq!(deep.name, "Foo");
        assert_eq!(deep.rest, vec!["properties", "a/b"]);
        assert_eq!(Reference::definition_name("#/definitions/Foo/properties/bar"), None);
        assert_eq!(Reference::definition_name("#/definitions/Foo").as_deref(), Some("Foo"));
    }

    #[test]
    fn rejects_unsupported_pointers() {
        assert!(Reference::parse("#/parameters/P/schema").is_none());
        assert!(Reference::parse("#/responses/NotFound").is_none());
        assert!(Reference::parse("Foo").is_none());
        assert!(Reference::parse("#/definitions/").is_none());
    }

    #[test]
    fn unescapes_definition_names() {
        let r = Reference::parse("#/definitions/a~1b").unwrap();
        assert_eq!(r.name, "a/b");
    }

    #[test]
    fn schema_without_reference_is_returned_unchanged() {
        let def = definition(json!({}));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        let schema = Schema {
            type_name: Some("string".into()),
            ..Schema::default()
        };
        let unwrapped = resolver.unwrap_schema(&schema).unwrap();
        assert!(std::ptr::eq(unwrapped, &schema));
    }

    #[test]
    fn follows_chains_to_the_final_schema() {
        let def = definition(json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/C" },
                "C": { "type": "object", "description": "end" }
            }
        }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        let reference = Schema::reference("#/definitions/A");
        let target = resolver.unwrap_schema(&reference).unwrap();
        assert_eq!(target.description.as_deref(), Some("end"));
    }

    #[test]
    fn two_step_cycle_is_reported_not_looped() {
        let def = definition(json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/A" }
            }
        }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        match resolver.resolve("#/definitions/A") {
            Err(ReferenceFailure::Cyclic { reference, chain }) => {
                assert_eq!(reference, "#/definitions/A");
                assert_eq!(
                    chain,
                    vec!["#/definitions/A", "#/definitions/B", "#/definitions/A"]
                );
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_cyclic() {
        let def = definition(json!({ "definitions": { "A": { "$ref": "#/definitions/A" } } }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        assert!(matches!(
            resolver.resolve("#/definitions/A"),
            Err(ReferenceFailure::Cyclic { .. })
        ));
    }

    #[test]
    fn missing_target_is_dangling() {
        let def = definition(json!({ "definitions": {} }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        assert_eq!(
            resolver.resolve("#/definitions/Nope").unwrap_err(),
            ReferenceFailure::Dangling {
                reference: "#/definitions/Nope".into()
            }
        );
    }

    #[test]
    fn file_qualified_references_cross_documents() {
        let main = definition(json!({
            "definitions": { "Pet": { "$ref": "../common/types.json#/definitions/Resource" } }
        }));
        let common = definition(json!({
            "definitions": {
                "Resource": { "$ref": "#/definitions/Base" },
                "Base": { "type": "object", "title": "base" }
            }
        }));
        let main_src = Source {
            file: Path::new("specs/pets/main.json"),
            definition: &main,
        };
        let common_src = Source {
            file: Path::new("specs/common/types.json"),
            definition: &common,
        };
        let sources = [main_src, common_src];
        let resolver = Resolver::new(main_src, &sources);

        let reference = Schema::reference("#/definitions/Pet");
        let target = resolver.unwrap_schema(&reference).unwrap();
        assert_eq!(target.title.as_deref(), Some("base"));
    }

    #[test]
    fn nested_pointers_walk_into_the_schema() {
        let def = definition(json!({
            "definitions": {
                "Foo": {
                    "properties": {
                        "bar": { "type": "string", "title": "bar" },
                        "tags": { "type": "array", "items": { "$ref": "#/definitions/Tag" } }
                    },
                    "allOf": [{ "title": "base" }]
                },
                "Tag": { "type": "string", "title": "tag" }
            }
        }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        let title = |raw: &str| match resolver.resolve(raw) {
            Ok(Resolved::Schema(s)) => s.title.clone(),
            other => panic!("{raw}: {other:?}"),
        };

        assert_eq!(title("#/definitions/Foo/properties/bar").as_deref(), Some("bar"));
        assert_eq!(title("#/definitions/Foo/allOf/0").as_deref(), Some("base"));
        assert_eq!(title("#/definitions/Foo/properties/tags/items").as_deref(), Some("tag"));
        assert!(matches!(
            resolver.resolve("#/definitions/Foo/properties/nope"),
            Err(ReferenceFailure::Dangling { .. })
        ));
        assert!(matches!(
            resolver.resolve("#/definitions/Foo/enum/0"),
            Err(ReferenceFailure::Unsupported { .. })
        ));
        assert!(matches!(
            resolver.resolve("#/responses/NotFound"),
            Err(ReferenceFailure::Unsupported { .. })
        ));
    }

    #[test]
    fn rebased_resolver_resolves_relative_to_the_new_file() {
        let merged = definition(json!({}));
        let common = definition(json!({
            "definitions": { "Resource": { "type": "object", "title": "resource" } }
        }));
        let sources = [
            Source {
                file: Path::new("specs/a/main.json"),
                definition: &merged,
            },
            Source {
                file: Path::new("specs/c/types.json"),
                definition: &merged,
            },
            Source {
                file: Path::new("specs/b/types.json"),
                definition: &common,
            },
        ];
        let resolver = Resolver::new(sources[0], &sources);
        assert!(matches!(
            resolver.resolve("types.json#/definitions/Resource"),
            Err(ReferenceFailure::Dangling { .. })
        ));

        let from_b = resolver.rebased(Path::new("specs/b/other.json"));
        match from_b.resolve("types.json#/definitions/Resource") {
            Ok(Resolved::Schema(s)) => assert_eq!(s.title.as_deref(), Some("resource")),
            other => panic!("expected the schema in specs/b, got {other:?}"),
        }
    }

    #[test]
    fn file_qualified_reference_to_unloaded_file_is_dangling() {
        let main = definition(json!({}));
        let resolver = Resolver::single(Path::new("main.json"), &main);
        assert!(matches!(
            resolver.resolve("other.json#/definitions/X"),
            Err(ReferenceFailure::Dangling { .. })
        ));
    }

    #[test]
    fn parameter_references_resolve_to_global_parameters() {
        let def = definition(json!({
            "parameters": { "ApiVersion": { "name": "api-version", "in": "query", "type": "string" } }
        }));
        let resolver = Resolver::single(Path::new("a.json"), &def);
        let stub = Parameter {
            reference: Some("#/parameters/ApiVersion".into()),
            ..Parameter::default()
        };
        let target = resolver.unwrap_parameter(&stub).unwrap();
        assert_eq!(target.name.as_deref(), Some("api-version"));
    }
}
