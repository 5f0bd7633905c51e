//! # oproute
//!
//! **oproute** is the routing core of an OpenAPI-driven HTTP service: it maps an
//! inbound `(method, path)` to the operation registered for it and invokes that
//! operation's handler.
//!
//! ## Overview
//!
//! Routes are registered in order, either one at a time as plain functions or
//! in bulk from a controller class and an API specification. Each path template
//! (`/pets/{id}`) is compiled once into a matcher. Lookup returns the first
//! registered entry whose verb and template accept the request, together with
//! the path parameter values it extracted. Invoking a controller route records
//! the controller class and method in a request-scoped context, constructs the
//! controller through an explicit registry, then calls the method.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Operation-spec types and YAML/JSON loading
//! - **[`router`]** - Path pattern compilation, route entries and the routing table
//! - **[`dispatcher`]** - Controllers, the request context and handler invocation
//! - **[`error`]** - Registration, lookup and dispatch errors
//! - **[`runtime_config`]** - Environment-driven lookup configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `oproute` command line
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Pipeline as Request Pipeline
//!     participant Table as RoutingTable
//!     participant Route as ResolvedRoute
//!     participant Ctx as RequestContext
//!     participant Registry as ControllerRegistry
//!     participant Handler
//!
//!     Pipeline->>Table: find(method, path)
//!     alt no entry accepts the request
//!         Table-->>Pipeline: RouteNotFound (404)
//!     end
//!     Table-->>Pipeline: ResolvedRoute (entry + path params)
//!     Pipeline->>Pipeline: build_operation_args
//!     Pipeline->>Route: execute(ctx, args)
//!     opt controller route
//!         Route->>Ctx: bind controller.current.ctor / .operation
//!         Route->>Registry: instantiate(class)
//!         Registry-->>Route: controller (awaited)
//!     end
//!     Route->>Handler: invoke(args)
//!     Handler-->>Pipeline: value or error, unchanged
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use oproute::dispatcher::{ControllerRegistry, Controller, Deferred, OperationArgs, OperationResult, RequestContext};
//! use oproute::router::RoutingTable;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct PetController;
//!
//! impl Controller for PetController {
//!     fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult> {
//!         match operation {
//!             "findById" => Deferred::ready(Ok(json!({ "id": args[0] }))),
//!             other => Deferred::ready(Err(format!("unknown operation {other}").into())),
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let mut registry = ControllerRegistry::new();
//! let class = registry.register_with("PetController", |_| PetController);
//!
//! let mut table = RoutingTable::new();
//! table.register_controller_value(
//!     &class,
//!     &json!({ "paths": { "/pets/{id}": { "get": { "x-operation-name": "findById" } } } }),
//! )?;
//!
//! let route = table.find("GET", "/pets/7")?;
//! let mut ctx = RequestContext::new(Arc::new(registry));
//! let value = route.execute(&mut ctx, vec![json!("7")]).await?;
//! assert_eq!(value, json!({ "id": "7" }));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `OPROUTE_LOOKUP` | `linear` | `linear` or `trie` lookup; both return the same route |
//! | `OPROUTE_SLOW_MATCH_US` | `1000` | lookups slower than this log a warning |
//! | `OPROUTE_LOG_LEVEL` | `info` | trace/debug/info/warn/error (`RUST_LOG` wins) |
//! | `OPROUTE_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `OPROUTE_LOG_ASYNC` | `false` | write logs through a background worker |
//! | `OPROUTE_LOG_TARGET_FILTER` | | extra `EnvFilter` directives, comma-separated |
//! | `OPROUTE_LOG_INCLUDE_LOCATION` | `false` | include file and line |

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod spec;

pub use dispatcher::{
    dispatch, Controller, ControllerClass, ControllerRegistry, Deferred, RequestContext,
};
pub use error::{BoxError, DispatchError, PatternError, RegistrationError, RouteNotFound};
pub use router::{FunctionRoute, PathPattern, ResolvedRoute, RouteEntry, RoutingTable};
pub use spec::{load_spec, ApiSpec, OperationSpec, ParameterLocation, ParameterMeta};
