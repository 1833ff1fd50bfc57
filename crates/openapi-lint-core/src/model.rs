//! Normalized document model for Swagger 2.0 style specifications.
//!
//! The model is built once from a parsed JSON value and is read-only from
//! then on. Every map keeps the member order of the source document, which is
//! what makes traversal (and therefore diagnostic order) reproducible.

use crate::path::ObjectPath;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Vendor extension prefix.
pub const EXTENSION_PREFIX: &str = "x-";

/// A string-keyed map preserving insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry. An existing key keeps its position and has its
    /// value replaced; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// Mutable access to an entry.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Vendor extensions (`x-*` members) of a node, in declared order.
pub type Extensions = OrderedMap<Value>;

/// Operations of one path, keyed by HTTP method as written in the document.
pub type PathItem = OrderedMap<Operation>;

/// HTTP methods recognized inside a path item.
pub const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

/// True if `key` names an HTTP method, in any letter case.
#[must_use]
pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.iter().any(|m| m.eq_ignore_ascii_case(key))
}

/// Root aggregate of one specification document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDefinition {
    /// `swagger` version string.
    pub swagger: Option<String>,
    /// `info.title`.
    pub title: Option<String>,
    /// `host`.
    pub host: Option<String>,
    /// `basePath`.
    pub base_path: Option<String>,
    /// `schemes`.
    pub schemes: Vec<String>,
    /// `consumes`.
    pub consumes: Vec<String>,
    /// `produces`.
    pub produces: Vec<String>,
    /// `paths`, keyed by path template.
    pub paths: OrderedMap<PathItem>,
    /// `definitions`.
    pub definitions: OrderedMap<Schema>,
    /// Global `parameters`.
    pub parameters: OrderedMap<Parameter>,
    /// Global `responses`.
    pub responses: OrderedMap<Response>,
    /// `securityDefinitions`.
    pub security_definitions: OrderedMap<SecurityDefinition>,
    /// Root-level vendor extensions.
    pub extensions: Extensions,
}

/// A single operation under a path item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// `operationId`.
    pub operation_id: Option<String>,
    /// `summary`.
    pub summary: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `tags`.
    pub tags: Vec<String>,
    /// `consumes`.
    pub consumes: Vec<String>,
    /// `produces`.
    pub produces: Vec<String>,
    /// `parameters`, in declared order.
    pub parameters: Vec<Parameter>,
    /// `responses`, keyed by status code.
    pub responses: OrderedMap<Response>,
    /// `deprecated`.
    pub deprecated: bool,
    /// Vendor extensions.
    pub extensions: Extensions,
}

impl Operation {
    /// Looks up an operation extension.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }
}

/// A response object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// `description`.
    pub description: Option<String>,
    /// `schema`.
    pub schema: Option<Schema>,
    /// Vendor extensions.
    pub extensions: Extensions,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: path`
    Path,
    /// `in: formData`
    FormData,
    /// `in: body`
    Body,
}

impl ParameterLocation {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "path" => Some(Self::Path),
            "formData" => Some(Self::FormData),
            "body" => Some(Self::Body),
            _ => None,
        }
    }
}

/// A parameter object, or a `$ref` stub pointing to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    /// `$ref`.
    pub reference: Option<String>,
    /// `name`.
    pub name: Option<String>,
    /// `in`.
    pub location: Option<ParameterLocation>,
    /// `description`.
    pub description: Option<String>,
    /// `required`.
    pub required: bool,
    /// `schema` (body parameters).
    pub schema: Option<Box<Schema>>,
    /// `type` (non-body parameters).
    pub type_name: Option<String>,
    /// `format`.
    pub format: Option<String>,
    /// `items`.
    pub items: Option<Box<Schema>>,
    /// `enum`.
    pub enum_values: Vec<Value>,
    /// `default`.
    pub default: Option<Value>,
    /// Vendor extensions.
    pub extensions: Extensions,
}

/// A schema object, or a `$ref` stub pointing to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// `$ref`.
    pub reference: Option<String>,
    /// `type`.
    pub type_name: Option<String>,
    /// `format`.
    pub format: Option<String>,
    /// `title`.
    pub title: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `properties`.
    pub properties: OrderedMap<Schema>,
    /// `required`.
    pub required: Vec<String>,
    /// `items`.
    pub items: Option<Box<Schema>>,
    /// `additionalProperties` when given as a schema.
    pub additional_properties: Option<Box<Schema>>,
    /// `allOf`.
    pub all_of: Vec<Schema>,
    /// `enum`.
    pub enum_values: Vec<Value>,
    /// `default`.
    pub default: Option<Value>,
    /// `readOnly`.
    pub read_only: bool,
    /// `discriminator`.
    pub discriminator: Option<String>,
    /// Vendor extensions.
    pub extensions: Extensions,
}

impl Schema {
    /// A schema that is only a `$ref` to `reference`.
    #[must_use]
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Self::default()
        }
    }
}

/// A `securityDefinitions` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityDefinition {
    /// `type` (`basic`, `apiKey`, `oauth2`).
    pub scheme_type: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `name` (apiKey).
    pub name: Option<String>,
    /// `in` (apiKey).
    pub location: Option<String>,
    /// `flow` (oauth2).
    pub flow: Option<String>,
    /// `authorizationUrl` (oauth2).
    pub authorization_url: Option<String>,
    /// `tokenUrl` (oauth2).
    pub token_url: Option<String>,
    /// `scopes` (oauth2).
    pub scopes: OrderedMap<String>,
    /// Vendor extensions.
    pub extensions: Extensions,
}

/// The input is not shaped like a specification document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed document at '{pointer}': {message}")]
pub struct MalformedDocument {
    /// JSON pointer of the offending member.
    pub pointer: String,
    /// What was wrong with it.
    pub message: String,
}

impl MalformedDocument {
    fn new(at: &ObjectPath, message: impl Into<String>) -> Self {
        Self {
            pointer: at.to_pointer(),
            message: message.into(),
        }
    }
}

type Parse<T> = Result<T, MalformedDocument>;

impl ServiceDefinition {
    /// Builds the model from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedDocument`] when a structural member has the wrong
    /// JSON type. Unknown members are ignored.
    pub fn from_value(value: &Value) -> Parse<Self> {
        let at = ObjectPath::root();
        let obj = object(value, &at)?;

        let title = match obj.get("info") {
            Some(info) => {
                let info_at = at.append_property("info");
                opt_string(object(info, &info_at)?, "title", &info_at)?
            }
            None => None,
        };

        Ok(Self {
            swagger: opt_string(obj, "swagger", &at)?,
            title,
            host: opt_string(obj, "host", &at)?,
            base_path: opt_string(obj, "basePath", &at)?,
            schemes: string_list(obj, "schemes", &at)?,
            consumes: string_list(obj, "consumes", &at)?,
            produces: string_list(obj, "produces", &at)?,
            paths: member_map(obj, "paths", &at, parse_path_item)?,
            definitions: member_map(obj, "definitions", &at, parse_schema)?,
            parameters: member_map(obj, "parameters", &at, parse_parameter)?,
            responses: member_map(obj, "responses", &at, parse_response)?,
            security_definitions: member_map(
                obj,
                "securityDefinitions",
                &at,
                parse_security_definition,
            )?,
            extensions: extensions(obj),
        })
    }

    /// Iterates every operation as `(path, method, operation)`.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &str, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.iter()
                .map(move |(method, operation)| (path, method, operation))
        })
    }

    /// Operations declared under the given HTTP method.
    pub fn operations_by_method<'s>(
        &'s self,
        method: &'s str,
    ) -> impl Iterator<Item = (&'s str, &'s Operation)> + 's {
        self.operations()
            .filter(move |(_, m, _)| m.eq_ignore_ascii_case(method))
            .map(|(path, _, op)| (path, op))
    }
}

fn object<'v>(value: &'v Value, at: &ObjectPath) -> Parse<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| MalformedDocument::new(at, format!("expected an object, found {}", kind_of(value))))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn opt_string(obj: &Map<String, Value>, key: &str, at: &ObjectPath) -> Parse<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(MalformedDocument::new(
            &at.append_property(key),
            format!("expected a string, found {}", kind_of(other)),
        )),
    }
}

fn opt_bool(obj: &Map<String, Value>, key: &str, at: &ObjectPath) -> Parse<bool> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(MalformedDocument::new(
            &at.append_property(key),
            format!("expected a boolean, found {}", kind_of(other)),
        )),
    }
}

fn string_list(obj: &Map<String, Value>, key: &str, at: &ObjectPath) -> Parse<Vec<String>> {
    let Some(value) = obj.get(key) else {
        return Ok(Vec::new());
    };
    let at = at.append_property(key);
    let items = value
        .as_array()
        .ok_or_else(|| MalformedDocument::new(&at, format!("expected an array, found {}", kind_of(value))))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(String::from).ok_or_else(|| {
                MalformedDocument::new(&at.append_index(i), "expected a string")
            })
        })
        .collect()
}

fn value_list(obj: &Map<String, Value>, key: &str, at: &ObjectPath) -> Parse<Vec<Value>> {
    match obj.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(MalformedDocument::new(
            &at.append_property(key),
            format!("expected an array, found {}", kind_of(other)),
        )),
    }
}

fn extensions(obj: &Map<String, Value>) -> Extensions {
    obj.iter()
        .filter(|(k, _)| k.starts_with(EXTENSION_PREFIX))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn member_map<T>(
    obj: &Map<String, Value>,
    key: &str,
    at: &ObjectPath,
    parse: fn(&Value, &ObjectPath) -> Parse<T>,
) -> Parse<OrderedMap<T>> {
    let Some(value) = obj.get(key) else {
        return Ok(OrderedMap::new());
    };
    let at = at.append_property(key);
    object(value, &at)?
        .iter()
        .filter(|(k, _)| !k.starts_with(EXTENSION_PREFIX))
        .map(|(k, v)| Ok((k.clone(), parse(v, &at.append_property(k.as_str()))?)))
        .collect()
}

fn opt_schema(obj: &Map<String, Value>, key: &str, at: &ObjectPath) -> Parse<Option<Box<Schema>>> {
    obj.get(key)
        .map(|v| parse_schema(v, &at.append_property(key)).map(Box::new))
        .transpose()
}

fn parse_path_item(value: &Value, at: &ObjectPath) -> Parse<PathItem> {
    let obj = object(value, at)?;
    obj.iter()
        .filter(|(k, _)| is_http_method(k))
        .map(|(k, v)| Ok((k.clone(), parse_operation(v, &at.append_property(k.as_str()))?)))
        .collect()
}

fn parse_operation(value: &Value, at: &ObjectPath) -> Parse<Operation> {
    let obj = object(value, at)?;

    let parameters = match obj.get("parameters") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let at = at.append_property("parameters");
            items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_parameter(item, &at.append_index(i)))
                .collect::<Parse<Vec<_>>>()?
        }
        Some(other) => {
            return Err(MalformedDocument::new(
                &at.append_property("parameters"),
                format!("expected an array, found {}", kind_of(other)),
            ))
        }
    };

    Ok(Operation {
        operation_id: opt_string(obj, "operationId", at)?,
        summary: opt_string(obj, "summary", at)?,
        description: opt_string(obj, "description", at)?,
        tags: string_list(obj, "tags", at)?,
        consumes: string_list(obj, "consumes", at)?,
        produces: string_list(obj, "produces", at)?,
        parameters,
        responses: member_map(obj, "responses", at, parse_response)?,
        deprecated: opt_bool(obj, "deprecated", at)?,
        extensions: extensions(obj),
    })
}

fn parse_response(value: &Value, at: &ObjectPath) -> Parse<Response> {
    let obj = object(value, at)?;
    Ok(Response {
        description: opt_string(obj, "description", at)?,
        schema: opt_schema(obj, "schema", at)?.map(|s| *s),
        extensions: extensions(obj),
    })
}

fn parse_parameter(value: &Value, at: &ObjectPath) -> Parse<Parameter> {
    let obj = object(value, at)?;
    let location = match opt_string(obj, "in", at)? {
        None => None,
        Some(raw) => Some(ParameterLocation::parse(&raw).ok_or_else(|| {
            MalformedDocument::new(
                &at.append_property("in"),
                format!("unknown parameter location '{raw}'"),
            )
        })?),
    };

    Ok(Parameter {
        reference: opt_string(obj, "$ref", at)?,
        name: opt_string(obj, "name", at)?,
        location,
        description: opt_string(obj, "description", at)?,
        required: opt_bool(obj, "required", at)?,
        schema: opt_schema(obj, "schema", at)?,
        type_name: opt_string(obj, "type", at)?,
        format: opt_string(obj, "format", at)?,
        items: opt_schema(obj, "items", at)?,
        enum_values: value_list(obj, "enum", at)?,
        default: obj.get("default").cloned(),
        extensions: extensions(obj),
    })
}

fn parse_schema(value: &Value, at: &ObjectPath) -> Parse<Schema> {
    let obj = object(value, at)?;

    let additional_properties = match obj.get("additionalProperties") {
        Some(v @ Value::Object(_)) => {
            Some(Box::new(parse_schema(v, &at.append_property("additionalProperties"))?))
        }
        None | Some(Value::Bool(_)) => None,
        Some(other) => {
            return Err(MalformedDocument::new(
                &at.append_property("additionalProperties"),
                format!("expected an object or boolean, found {}", kind_of(other)),
            ))
        }
    };

    let all_of = match obj.get("allOf") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let at = at.append_property("allOf");
            items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_schema(item, &at.append_index(i)))
                .collect::<Parse<Vec<_>>>()?
        }
        Some(other) => {
            return Err(MalformedDocument::new(
                &at.append_property("allOf"),
                format!("expected an array, found {}", kind_of(other)),
            ))
        }
    };

    // `properties` may legitimately contain members named `x-...`
    let properties = match obj.get("properties") {
        None => OrderedMap::new(),
        Some(v) => {
            let at = at.append_property("properties");
            object(v, &at)?
                .iter()
                .map(|(k, v)| Ok((k.clone(), parse_schema(v, &at.append_property(k.as_str()))?)))
                .collect::<Parse<OrderedMap<_>>>()?
        }
    };

    Ok(Schema {
        reference: opt_string(obj, "$ref", at)?,
        type_name: opt_string(obj, "type", at)?,
        format: opt_string(obj, "format", at)?,
        title: opt_string(obj, "title", at)?,
        description: opt_string(obj, "description", at)?,
        properties,
        required: string_list(obj, "required", at)?,
        items: opt_schema(obj, "items", at)?,
        additional_properties,
        all_of,
        enum_values: value_list(obj, "enum", at)?,
        default: obj.get("default").cloned(),
        read_only: opt_bool(obj, "readOnly", at)?,
        discriminator: opt_string(obj, "discriminator", at)?,
        extensions: extensions(obj),
    })
}

fn parse_security_definition(value: &Value, at: &ObjectPath) -> Parse<SecurityDefinition> {
    let obj = object(value, at)?;
    let scopes = match obj.get("scopes") {
        None => OrderedMap::new(),
        Some(v) => {
            let at = at.append_property("scopes");
            object(v, &at)?
                .iter()
                .map(|(k, v)| {
                    let text = v.as_str().ok_or_else(|| {
                        MalformedDocument::new(&at.append_property(k.as_str()), "expected a string")
                    })?;
                    Ok((k.clone(), text.to_string()))
                })
                .collect::<Parse<OrderedMap<_>>>()?
        }
    };

    Ok(SecurityDefinition {
        scheme_type: opt_string(obj, "type", at)?,
        description: opt_string(obj, "description", at)?,
        name: opt_string(obj, "name", at)?,
        location: opt_string(obj, "in", at)?,
        flow: opt_string(obj, "flow", at)?,
        authorization_url: opt_string(obj, "authorizationUrl", at)?,
        token_url: opt_string(obj, "tokenUrl", at)?,
        scopes,
        extensions: extensions(obj),
    })
}
