//! Controllers and the explicit registry that constructs them.
//!
//! There is no runtime reflection: a controller class is a name, the registry
//! maps names to constructor closures, and a [`Controller`] dispatches method
//! names itself.

use super::context::RequestContext;
use super::deferred::Deferred;
use crate::error::{BoxError, DispatchError};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

/// Positional arguments for an operation, built by the request pipeline.
pub type OperationArgs = Vec<Value>;

/// Whatever the handler returned.
pub type OperationRetval = Value;

pub type OperationResult = Result<OperationRetval, BoxError>;

/// Identifies a controller class by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerClass {
    name: Arc<str>,
}

impl ControllerClass {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ControllerClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A constructed controller instance.
pub trait Controller: Send + Sync {
    /// Call the method named `operation`.
    ///
    /// Implementations answer [`DispatchError::UnknownOperation`] for names
    /// they do not serve.
    fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult>;
}

pub type ControllerInstance = Arc<dyn Controller>;

/// Produces controller instances within a request context.
pub trait InstanceProvider: Send + Sync {
    fn instantiate(
        &self,
        class: &ControllerClass,
        ctx: &RequestContext,
    ) -> Deferred<Result<ControllerInstance, BoxError>>;
}

type Constructor =
    Arc<dyn Fn(&RequestContext) -> Deferred<Result<ControllerInstance, BoxError>> + Send + Sync>;

/// Registry mapping controller class names to constructors.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    constructors: HashMap<Arc<str>, Constructor>,
}

impl ControllerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor. It runs once per request that reaches one of the
    /// controller's routes, and may finish asynchronously.
    ///
    /// Registering the same name twice replaces the earlier constructor.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> ControllerClass
    where
        F: Fn(&RequestContext) -> Deferred<Result<ControllerInstance, BoxError>>
            + Send
            + Sync
            + 'static,
    {
        let class = ControllerClass::new(name);
        if self
            .constructors
            .insert(Arc::from(name), Arc::new(constructor))
            .is_some()
        {
            debug!(controller = %name, "Replaced controller constructor");
        }
        class
    }

    /// Register a controller that is built synchronously.
    pub fn register_with<F, C>(&mut self, name: &str, constructor: F) -> ControllerClass
    where
        F: Fn(&RequestContext) -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        self.register(name, move |ctx| {
            let instance: ControllerInstance = Arc::new(constructor(ctx));
            Deferred::ready(Ok(instance))
        })
    }

    /// Register one shared instance served to every request.
    pub fn register_instance(&mut self, name: &str, instance: ControllerInstance) -> ControllerClass {
        self.register(name, move |_| Deferred::ready(Ok(Arc::clone(&instance))))
    }

    #[must_use]
    pub fn contains(&self, class: &ControllerClass) -> bool {
        self.constructors.contains_key(class.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl InstanceProvider for ControllerRegistry {
    fn instantiate(
        &self,
        class: &ControllerClass,
        ctx: &RequestContext,
    ) -> Deferred<Result<ControllerInstance, BoxError>> {
        match self.constructors.get(class.name()) {
            Some(constructor) => constructor(ctx),
            None => Deferred::ready(Err(DispatchError::UnknownController {
                controller: class.name().to_string(),
            }
            .into())),
        }
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}
