#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::petstore::PETSTORE_YAML;
use common::temp_files::{create_temp_json, create_temp_yaml};
use oproute::spec::{describe_operation_parameters, load_spec, ParameterLocation};
use oproute::{ApiSpec, RegistrationError};
use serde_json::json;

#[test]
fn test_load_yaml_spec() {
    let (_dir, path) = create_temp_yaml(PETSTORE_YAML);
    let spec = load_spec(&path).unwrap();

    let ops: Vec<(&str, &str, Option<&str>)> = spec
        .operations()
        .map(|(path, verb, op)| (path, verb, op.operation_name()))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("/pets", "get", Some("list")),
            ("/pets", "post", Some("create")),
            ("/pets/{id}", "get", Some("findById")),
            ("/pets/{id}", "delete", Some("remove")),
        ]
    );
}

#[test]
fn test_path_level_ref_parameters_are_inherited() {
    let (_dir, path) = create_temp_yaml(PETSTORE_YAML);
    let spec = load_spec(&path).unwrap();
    let (_, _, get_pet) = spec
        .operations()
        .find(|(p, v, _)| *p == "/pets/{id}" && *v == "get")
        .unwrap();
    assert_eq!(get_pet.parameters.len(), 1);
    assert_eq!(get_pet.parameters[0].name, "id");
    assert_eq!(get_pet.parameters[0].location, ParameterLocation::Path);
    assert!(get_pet.parameters[0].required);
    assert_eq!(describe_operation_parameters(get_pet), "id");
}

#[test]
fn test_load_json_spec_keeps_order() {
    let doc = json!({
        "paths": {
            "/z": { "get": { "x-operation-name": "z" } },
            "/a": { "post": { "x-operation-name": "a" }, "get": { "x-operation-name": "a2" } }
        }
    });
    let (_dir, path) = create_temp_json(&doc.to_string());
    let spec = load_spec(&path).unwrap();
    let keys: Vec<(&str, &str)> = spec.operations().map(|(p, v, _)| (p, v)).collect();
    assert_eq!(keys, vec![("/z", "get"), ("/a", "post"), ("/a", "get")]);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_spec(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read specification"));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let (_dir, path) = create_temp_yaml("paths: [unclosed");
    assert!(load_spec(&path).is_err());
}

#[test]
fn test_non_object_paths_is_invalid() {
    let err = ApiSpec::from_value(&json!({ "paths": ["/pets"] })).unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidSpec { .. }));
}

#[test]
fn test_non_verb_keys_are_ignored() {
    let spec = ApiSpec::from_value(&json!({
        "paths": {
            "/pets": {
                "summary": "Pets",
                "servers": [],
                "GET": { "x-operation-name": "list" }
            }
        }
    }))
    .unwrap();
    let verbs: Vec<&str> = spec.operations().map(|(_, v, _)| v).collect();
    assert_eq!(verbs, vec!["get"]);
}
