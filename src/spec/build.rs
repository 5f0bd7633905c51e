use super::types::{ApiSpec, OperationSpec, ParameterMeta, PathItem, HTTP_VERBS};
use crate::error::RegistrationError;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Resolve a `#/components/parameters/...` reference against the document.
///
/// Only local component references are supported; anything else yields `None`.
pub fn resolve_parameter_ref<'a>(document: &'a Value, ref_path: &str) -> Option<&'a Value> {
    let name = ref_path.strip_prefix("#/components/parameters/")?;
    document.get("components")?.get("parameters")?.get(name)
}

/// Extract parameter metadata from a `parameters` array.
///
/// `$ref` entries are resolved against `document`. Entries that cannot be
/// resolved or parsed are skipped with a warning; they describe arguments, not
/// routes, so they never fail registration.
pub fn extract_parameters(document: &Value, params: Option<&Value>) -> Vec<ParameterMeta> {
    let Some(Value::Array(params)) = params else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(params.len());
    for p in params {
        let resolved = match p.get("$ref").and_then(Value::as_str) {
            Some(ref_path) => match resolve_parameter_ref(document, ref_path) {
                Some(v) => v,
                None => {
                    warn!(ref_path = %ref_path, "Unresolvable parameter reference skipped");
                    continue;
                }
            },
            None => p,
        };

        match serde_json::from_value::<ParameterMeta>(resolved.clone()) {
            Ok(meta) => out.push(meta),
            Err(e) => warn!(error = %e, parameter = %resolved, "Malformed parameter skipped"),
        }
    }
    out
}

/// Operation parameters override path-item parameters with the same name and location.
fn merge_parameters(
    path_level: &[ParameterMeta],
    operation_level: Vec<ParameterMeta>,
) -> Vec<ParameterMeta> {
    let mut merged: Vec<ParameterMeta> = path_level
        .iter()
        .filter(|p| {
            !operation_level
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    merged.extend(operation_level);
    merged
}

fn build_operation(
    document: &Value,
    operation: &Map<String, Value>,
    path_params: &[ParameterMeta],
) -> OperationSpec {
    let own = extract_parameters(document, operation.get("parameters"));
    let extensions = operation
        .iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    OperationSpec {
        operation_id: operation
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_string),
        summary: operation
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string),
        parameters: merge_parameters(path_params, own),
        extensions,
        raw: Value::Object(operation.clone()),
    }
}

impl ApiSpec {
    /// Build the path table from a parsed specification document.
    ///
    /// A document without `paths`, or with an empty one, is valid and yields an
    /// empty spec. Keys on a path item that are not HTTP verbs are ignored;
    /// verb keys are matched case-insensitively and stored lowercase.
    pub fn from_value(document: &Value) -> Result<ApiSpec, RegistrationError> {
        let Value::Object(root) = document else {
            return Err(RegistrationError::InvalidSpec {
                reason: format!("expected an object, found {}", json_type_name(document)),
            });
        };

        let paths = match root.get("paths") {
            None | Some(Value::Null) => return Ok(ApiSpec::default()),
            Some(Value::Object(paths)) => paths,
            Some(other) => {
                return Err(RegistrationError::InvalidSpec {
                    reason: format!("'paths' must be an object, found {}", json_type_name(other)),
                })
            }
        };

        let mut spec = ApiSpec::default();
        for (path, item) in paths {
            let Value::Object(item) = item else {
                return Err(RegistrationError::InvalidSpec {
                    reason: format!(
                        "path item '{path}' must be an object, found {}",
                        json_type_name(item)
                    ),
                });
            };

            let path_params = extract_parameters(document, item.get("parameters"));
            let mut path_item = PathItem::default();

            for (key, value) in item {
                let verb = key.to_ascii_lowercase();
                if !HTTP_VERBS.contains(&verb.as_str()) {
                    continue;
                }
                let Value::Object(operation) = value else {
                    return Err(RegistrationError::InvalidSpec {
                        reason: format!(
                            "operation \"{verb} {path}\" must be an object, found {}",
                            json_type_name(value)
                        ),
                    });
                };
                path_item
                    .operations
                    .push((verb, build_operation(document, operation, &path_params)));
            }

            debug!(
                path = %path,
                operations = path_item.operations.len(),
                "Path item parsed"
            );
            spec.paths.push((path.clone(), path_item));
        }

        Ok(spec)
    }
}

/// Comma-separated parameter names, used when logging route registration.
#[must_use]
pub fn describe_operation_parameters(operation: &OperationSpec) -> String {
    operation
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
