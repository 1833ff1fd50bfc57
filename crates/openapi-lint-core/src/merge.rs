//! Merging a group of documents into one composed view.

use crate::document::Document;
use crate::model::{OrderedMap, ServiceDefinition};
use crate::path::ObjectPath;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Errors that abandon the composed pass of a merge group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Two documents declare the same entry incompatibly.
    #[error("{entry} is declared differently in {} and {}", first.display(), second.display())]
    DefinitionCollision {
        /// What collided (e.g., `GET /pets`).
        entry: String,
        /// Document that declared it first.
        first: PathBuf,
        /// Document that redeclared it.
        second: PathBuf,
    },

    /// The group has no documents.
    #[error("merge group is empty")]
    Empty,
}

/// The union of a merge group's documents, with per-entry provenance.
#[derive(Debug, Clone)]
pub struct MergedView {
    definition: ServiceDefinition,
    files: Vec<PathBuf>,
    origins: HashMap<ObjectPath, PathBuf>,
}

impl MergedView {
    /// The merged model.
    #[must_use]
    pub fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }

    /// Files of the group, in input order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// First file of the group.
    #[must_use]
    pub fn primary_file(&self) -> &Path {
        self.files.first().map_or(Path::new(""), PathBuf::as_path)
    }

    /// The file that contributed the entry containing `path`.
    ///
    /// Root-level nodes are attributed to the first file.
    #[must_use]
    pub fn origin_of(&self, path: &ObjectPath) -> &Path {
        let segments = path.segments();
        (1..=segments.len().min(3))
            .rev()
            .find_map(|len| {
                let prefix: ObjectPath = segments[..len].iter().cloned().collect();
                self.origins.get(&prefix)
            })
            .map_or_else(|| self.primary_file(), PathBuf::as_path)
    }
}

/// Merges `documents` in order.
///
/// Named entries (definitions, global parameters and responses, security
/// definitions, root extensions) are unioned; on a name clash the later
/// document's entry replaces the earlier one in the earlier one's position.
/// Paths are unioned by path then by method. Root scalars come from the
/// first document.
///
/// # Errors
///
/// [`MergeError::DefinitionCollision`] when a path and method pair is declared
/// twice with different content, or a global parameter name is reused with a
/// different `in` location.
pub fn merge<'d, I>(documents: I) -> Result<MergedView, MergeError>
where
    I: IntoIterator<Item = &'d Document>,
{
    let documents: Vec<&Document> = documents.into_iter().collect();
    let first = documents.first().ok_or(MergeError::Empty)?.definition();

    let mut view = MergedView {
        definition: ServiceDefinition {
            swagger: first.swagger.clone(),
            title: first.title.clone(),
            host: first.host.clone(),
            base_path: first.base_path.clone(),
            schemes: first.schemes.clone(),
            consumes: first.consumes.clone(),
            produces: first.produces.clone(),
            ..ServiceDefinition::default()
        },
        files: documents.iter().map(|d| d.path().to_path_buf()).collect(),
        origins: HashMap::new(),
    };

    for document in &documents {
        debug!("Merging {}", document.path().display());
        merge_document(&mut view, document)?;
    }
    Ok(view)
}

fn merge_document(view: &mut MergedView, document: &Document) -> Result<(), MergeError> {
    let file = document.path();
    let def = document.definition();
    let merged = &mut view.definition;

    for (path, item) in def.paths.iter() {
        if merged.paths.get(path).is_none() {
            merged.paths.insert(path, OrderedMap::new());
        }
        for (method, operation) in item.iter() {
            let key: ObjectPath = ["paths", path, method].into_iter().collect();
            let Some(target) = merged.paths.get_mut(path) else {
                continue;
            };
            match target.get(method) {
                Some(existing) if existing == operation => {}
                Some(_) => {
                    return Err(MergeError::DefinitionCollision {
                        entry: format!("{} {path}", method.to_uppercase()),
                        first: view.origins.get(&key).cloned().unwrap_or_default(),
                        second: file.to_path_buf(),
                    });
                }
                None => {
                    target.insert(method, operation.clone());
                    view.origins.insert(key, file.to_path_buf());
                }
            }
        }
    }

    for (name, parameter) in def.parameters.iter() {
        if let Some(existing) = merged.parameters.get(name) {
            if existing.location != parameter.location {
                let key: ObjectPath = ["parameters", name].into_iter().collect();
                return Err(MergeError::DefinitionCollision {
                    entry: format!("parameter '{name}'"),
                    first: view.origins.get(&key).cloned().unwrap_or_default(),
                    second: file.to_path_buf(),
                });
            }
        }
    }

    union("definitions", &mut merged.definitions, &def.definitions, file, &mut view.origins);
    union("parameters", &mut merged.parameters, &def.parameters, file, &mut view.origins);
    union("responses", &mut merged.responses, &def.responses, file, &mut view.origins);
    union(
        "securityDefinitions",
        &mut merged.security_definitions,
        &def.security_definitions,
        file,
        &mut view.origins,
    );

    for (name, value) in def.extensions.iter() {
        if merged.extensions.get(name).is_some_and(|v| v != value) {
            warn!("Extension {name} redeclared by {}, keeping the later value", file.display());
        }
        merged.extensions.insert(name, value.clone());
        view.origins
            .insert(ObjectPath::root().append_property(name), file.to_path_buf());
    }
    Ok(())
}

fn union<V: Clone + PartialEq>(
    section: &str,
    target: &mut OrderedMap<V>,
    source: &OrderedMap<V>,
    file: &Path,
    origins: &mut HashMap<ObjectPath, PathBuf>,
) {
    for (name, value) in source.iter() {
        if target.get(name).is_some_and(|existing| existing != value) {
            warn!(
                "{section}/{name} redeclared differently by {}, keeping the later declaration",
                file.display()
            );
        }
        target.insert(name, value.clone());
        origins.insert([section, name].into_iter().collect(), file.to_path_buf());
    }
}
