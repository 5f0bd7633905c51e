use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path-item keys that name an operation. Everything else on a path item
/// (`parameters`, `summary`, `servers`, `x-*`, ...) is not a route.
pub const HTTP_VERBS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Vendor extension naming the controller method that serves an operation.
pub const OPERATION_NAME_EXTENSION: &str = "x-operation-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "Path"),
            ParameterLocation::Query => write!(f, "Query"),
            ParameterLocation::Header => write!(f, "Header"),
            ParameterLocation::Cookie => write!(f, "Cookie"),
        }
    }
}

/// One declared operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMeta {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl ParameterMeta {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            // path parameters are always required in OpenAPI
            required: location == ParameterLocation::Path,
            schema: None,
        }
    }
}

/// The OpenAPI description of one verb + path endpoint.
///
/// The router only reads `x-operation-name` and the parameter names; the rest
/// is carried untouched in `raw` for whoever builds operation arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSpec {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// Path-item parameters followed by the operation's own, `$ref`s resolved.
    pub parameters: Vec<ParameterMeta>,
    /// `x-*` keys of the operation object.
    pub extensions: Map<String, Value>,
    /// The operation object exactly as it appeared in the document.
    pub raw: Value,
}

impl OperationSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Set the `x-operation-name` extension.
    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(
            OPERATION_NAME_EXTENSION.to_string(),
            Value::String(name.into()),
        );
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, param: ParameterMeta) -> Self {
        self.parameters.push(param);
        self
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Controller method named by `x-operation-name`, if it is a non-empty string.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.extension(OPERATION_NAME_EXTENSION)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Operations declared on one path template, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub operations: Vec<(String, OperationSpec)>,
}

/// The `paths` section of an API specification, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiSpec {
    pub paths: Vec<(String, PathItem)>,
}

impl ApiSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation, creating the path item on first use.
    #[must_use]
    pub fn with_operation(
        mut self,
        path: impl Into<String>,
        verb: impl Into<String>,
        operation: OperationSpec,
    ) -> Self {
        let path = path.into();
        let verb = verb.into().to_ascii_lowercase();
        match self.paths.iter_mut().find(|(p, _)| *p == path) {
            Some((_, item)) => item.operations.push((verb, operation)),
            None => self.paths.push((
                path,
                PathItem {
                    operations: vec![(verb, operation)],
                },
            )),
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|(_, item)| item.operations.is_empty())
    }

    /// Every `(path, verb, operation)` triple in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &str, &OperationSpec)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(verb, op)| (path.as_str(), verb.as_str(), op))
        })
    }
}
