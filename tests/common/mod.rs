#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writes `content` to `spec.<ext>` in a fresh directory.
    ///
    /// The directory is removed when the returned `TempDir` drops, so keep it
    /// alive for as long as the path is used.
    pub fn create_temp_spec(content: &str, ext: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("spec.{ext}"));
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    pub fn create_temp_yaml(content: &str) -> (TempDir, PathBuf) {
        create_temp_spec(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> (TempDir, PathBuf) {
        create_temp_spec(content, "json")
    }
}

pub mod petstore {
    use oproute::dispatcher::{
        Controller, ControllerClass, ControllerRegistry, Deferred, OperationArgs,
        OperationResult,
    };
    use oproute::DispatchError;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub const PETSTORE_YAML: &str = r#"
openapi: 3.1.0
info:
  title: Pet Store
  version: "1.0.0"
components:
  parameters:
    PetId:
      name: id
      in: path
      required: true
      schema: { type: string }
paths:
  /pets:
    get:
      operationId: listPets
      x-operation-name: list
      parameters:
        - name: limit
          in: query
          schema: { type: integer }
    post:
      operationId: createPet
      x-operation-name: create
  /pets/{id}:
    parameters:
      - $ref: '#/components/parameters/PetId'
    get:
      operationId: getPet
      x-operation-name: findById
    delete:
      operationId: deletePet
      x-operation-name: remove
"#;

    /// Counts constructions so tests can check one instance per request.
    pub struct PetController {
        pub request_no: usize,
    }

    impl Controller for PetController {
        fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult> {
            let request_no = self.request_no;
            match operation {
                "list" => Deferred::ready(Ok(json!({
                    "limit": args.first().cloned().unwrap_or(Value::Null),
                    "request": request_no,
                }))),
                "findById" => Deferred::pending(async move {
                    tokio::task::yield_now().await;
                    Ok(json!({ "id": args.first().cloned().unwrap_or(Value::Null) }))
                }),
                "remove" => Deferred::ready(Err("pet is not deletable".into())),
                other => Deferred::ready(Err(DispatchError::UnknownOperation {
                    controller: "PetController".into(),
                    operation: other.into(),
                }
                .into())),
            }
        }
    }

    /// A registry serving `PetController`, plus its construction counter.
    pub fn registry() -> (ControllerRegistry, ControllerClass, Arc<AtomicUsize>) {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);
        let mut registry = ControllerRegistry::new();
        let class = registry.register_with("PetController", move |_| PetController {
            request_no: counter.fetch_add(1, Ordering::SeqCst) + 1,
        });
        (registry, class, constructed)
    }
}
