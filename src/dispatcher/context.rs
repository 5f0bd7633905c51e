use super::controller::{ControllerClass, ControllerInstance, ControllerRegistry, InstanceProvider};
use super::deferred::Deferred;
use crate::error::BoxError;
use crate::ids::RequestId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Binding keys written into the request context while a route runs.
pub mod keys {
    /// The controller class serving the current request.
    pub const CONTROLLER_CURRENT_CTOR: &str = "controller.current.ctor";
    /// The controller method serving the current request.
    pub const CONTROLLER_CURRENT_OPERATION: &str = "controller.current.operation";
}

/// A value bound into a [`RequestContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Controller(ControllerClass),
    Operation(Arc<str>),
    Value(Value),
}

/// Request-scoped binding context.
///
/// Created per request by the pipeline, it carries the facts collaborators may
/// need to introspect during the same request and the provider that builds
/// controller instances.
pub struct RequestContext {
    request_id: RequestId,
    bindings: HashMap<String, Binding>,
    provider: Arc<dyn InstanceProvider>,
}

impl RequestContext {
    pub fn new(provider: Arc<dyn InstanceProvider>) -> Self {
        Self {
            request_id: RequestId::new(),
            bindings: HashMap::new(),
            provider,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Bind `key` to `value`, returning the previous binding.
    pub fn bind(&mut self, key: impl Into<String>, value: Binding) -> Option<Binding> {
        self.bindings.insert(key.into(), value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.bindings.get(key)
    }

    #[must_use]
    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    #[must_use]
    pub fn current_controller(&self) -> Option<&ControllerClass> {
        match self.get(keys::CONTROLLER_CURRENT_CTOR) {
            Some(Binding::Controller(class)) => Some(class),
            _ => None,
        }
    }

    #[must_use]
    pub fn current_operation(&self) -> Option<&str> {
        match self.get(keys::CONTROLLER_CURRENT_OPERATION) {
            Some(Binding::Operation(op)) => Some(op),
            _ => None,
        }
    }

    /// Ask the provider for an instance of `class` within this context.
    pub fn instantiate(
        &self,
        class: &ControllerClass,
    ) -> Deferred<Result<ControllerInstance, BoxError>> {
        self.provider.instantiate(class, self)
    }
}

impl Default for RequestContext {
    /// A context whose provider knows no controllers; enough for function routes.
    fn default() -> Self {
        Self::new(Arc::new(ControllerRegistry::new()))
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
