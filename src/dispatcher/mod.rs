//! # Dispatcher Module
//!
//! Executes the handler behind a resolved route.
//!
//! ## Overview
//!
//! Routes are served either by a plain function or by a method of a
//! controller class. The dispatcher:
//! - Normalises handlers that answer immediately and handlers that answer
//!   later behind one [`Deferred`] type
//! - Builds controller instances through an [`InstanceProvider`] (usually a
//!   [`ControllerRegistry`]) once per request
//! - Records the controller class and method in the [`RequestContext`] so
//!   other collaborators in the same request can see them
//! - Returns handler errors to the caller exactly as they were produced
//!
//! ## Request Flow
//!
//! 1. The routing table resolves `(method, path)` to a [`ResolvedRoute`](crate::router::ResolvedRoute)
//! 2. The pipeline builds positional arguments ([`build_operation_args`])
//! 3. [`ResolvedRoute::execute`](crate::router::ResolvedRoute::execute) writes
//!    bindings for controller routes, constructs the controller, then calls
//!    the method
//! 4. The value or error comes back unchanged
//!
//! ## Controllers
//!
//! ```rust
//! use oproute::dispatcher::{Controller, ControllerRegistry, Deferred, OperationArgs, OperationResult};
//! use serde_json::json;
//!
//! struct PetController;
//!
//! impl Controller for PetController {
//!     fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult> {
//!         match operation {
//!             "findById" => Deferred::ready(Ok(json!({ "id": args.first() }))),
//!             other => Deferred::ready(Err(format!("no operation {other}").into())),
//!         }
//!     }
//! }
//!
//! let mut registry = ControllerRegistry::new();
//! let class = registry.register_with("PetController", |_ctx| PetController);
//! assert!(registry.contains(&class));
//! ```

mod context;
mod controller;
mod core;
mod deferred;

pub use context::{keys, Binding, RequestContext};
pub use controller::{
    Controller, ControllerClass, ControllerInstance, ControllerRegistry, InstanceProvider,
    OperationArgs, OperationResult, OperationRetval,
};
pub use core::{build_operation_args, dispatch, InvocationState, InvokeError};
pub use deferred::Deferred;
