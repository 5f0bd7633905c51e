//! Route entries: one `(verb, path template, operation spec, handler)` binding.
//!
//! A handler is either a plain async function or a method on a controller
//! class. Entries are built once while wiring the table and never change.

use super::pattern::{ParamVec, PathPattern};
use crate::dispatcher::{
    keys, Binding, ControllerClass, Deferred, OperationArgs, OperationResult, RequestContext,
};
use crate::error::RegistrationError;
use crate::spec::OperationSpec;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

type HandlerFn = Arc<dyn Fn(OperationArgs) -> BoxFuture<'static, OperationResult> + Send + Sync>;

/// A plain function handler.
///
/// Calls are pass-through: the request context is neither read nor written.
#[derive(Clone)]
pub struct FunctionRoute {
    name: Option<Arc<str>>,
    handler: HandlerFn,
}

impl FunctionRoute {
    /// Wrap an async handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(OperationArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        Self {
            name: None,
            handler: Arc::new(move |args| handler(args).boxed()),
        }
    }

    /// Wrap a synchronous handler.
    pub fn from_sync<F>(handler: F) -> Self
    where
        F: Fn(OperationArgs) -> OperationResult + Send + Sync + 'static,
    {
        Self {
            name: None,
            handler: Arc::new(move |args| future::ready(handler(args)).boxed()),
        }
    }

    /// Wrap a handler that decides per call whether to answer now or later.
    pub fn from_deferred<F>(handler: F) -> Self
    where
        F: Fn(OperationArgs) -> Deferred<OperationResult> + Send + Sync + 'static,
    {
        Self {
            name: None,
            handler: Arc::new(move |args| handler(args).resolve().boxed()),
        }
    }

    /// Give the function the declared name `describe()` reports.
    #[must_use]
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub async fn invoke(&self, args: OperationArgs) -> OperationResult {
        (self.handler)(args).await
    }
}

impl std::fmt::Debug for FunctionRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRoute")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A handler bound to a method of a controller class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRoute {
    class: ControllerClass,
    method_name: Arc<str>,
}

impl ControllerRoute {
    /// Resolve the method name from `method_name`, else from the operation's
    /// `x-operation-name` extension.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::MissingOperationName`] when neither is present.
    pub fn new(
        verb: &str,
        path: &str,
        spec: &OperationSpec,
        class: ControllerClass,
        method_name: Option<&str>,
    ) -> Result<Self, RegistrationError> {
        let method_name = method_name
            .filter(|m| !m.is_empty())
            .or_else(|| spec.operation_name())
            .ok_or_else(|| RegistrationError::MissingOperationName {
                verb: verb.to_string(),
                path: path.to_string(),
                controller: class.name().to_string(),
            })?;

        Ok(Self {
            class,
            method_name: Arc::from(method_name),
        })
    }

    #[must_use]
    pub fn class(&self) -> &ControllerClass {
        &self.class
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Record the controller class and method in the request context.
    pub fn update_bindings(&self, ctx: &mut RequestContext) {
        ctx.bind(
            keys::CONTROLLER_CURRENT_CTOR,
            Binding::Controller(self.class.clone()),
        );
        ctx.bind(
            keys::CONTROLLER_CURRENT_OPERATION,
            Binding::Operation(Arc::clone(&self.method_name)),
        );
    }

    /// Build the controller within `ctx`, then call the method.
    ///
    /// Construction completes before the method runs. Errors from either step
    /// are returned as they were produced.
    pub async fn invoke(&self, ctx: &RequestContext, args: OperationArgs) -> OperationResult {
        let controller = ctx.instantiate(&self.class).resolve().await?;
        controller.invoke(&self.method_name, args).resolve().await
    }
}

#[derive(Debug, Clone)]
pub enum RouteHandler {
    Function(FunctionRoute),
    Controller(ControllerRoute),
}

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    verb: Arc<str>,
    path: Arc<str>,
    spec: Arc<OperationSpec>,
    pattern: PathPattern,
    handler: RouteHandler,
}

impl RouteEntry {
    fn build(
        verb: &str,
        path: &str,
        spec: Arc<OperationSpec>,
        handler: RouteHandler,
    ) -> Result<Self, RegistrationError> {
        let verb = verb.to_ascii_lowercase();
        let pattern =
            PathPattern::compile(path).map_err(|source| RegistrationError::InvalidPattern {
                verb: verb.clone(),
                path: path.to_string(),
                source,
            })?;
        Ok(Self {
            verb: Arc::from(verb),
            path: Arc::from(path),
            spec,
            pattern,
            handler,
        })
    }

    /// An entry served by a plain function.
    pub fn function(
        verb: &str,
        path: &str,
        spec: impl Into<Arc<OperationSpec>>,
        handler: FunctionRoute,
    ) -> Result<Self, RegistrationError> {
        Self::build(verb, path, spec.into(), RouteHandler::Function(handler))
    }

    /// An entry served by `class.method`, see [`ControllerRoute::new`].
    pub fn controller(
        verb: &str,
        path: &str,
        spec: impl Into<Arc<OperationSpec>>,
        class: ControllerClass,
        method_name: Option<&str>,
    ) -> Result<Self, RegistrationError> {
        let spec = spec.into();
        let route = ControllerRoute::new(verb, path, &spec, class, method_name)?;
        Self::build(verb, path, spec, RouteHandler::Controller(route))
    }

    /// Lowercase HTTP verb.
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// The path template as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &RouteHandler {
        &self.handler
    }

    /// Parameters extracted from `path` if this entry accepts `verb` (any case) and `path`.
    #[must_use]
    pub fn matches(&self, verb: &str, path: &str) -> Option<ParamVec> {
        if !self.verb.eq_ignore_ascii_case(verb) {
            return None;
        }
        self.pattern.try_match(path)
    }

    /// `ClassName.methodName` for controller routes; the function's name, or
    /// `"verb path"`, for function routes.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.handler {
            RouteHandler::Controller(route) => {
                format!("{}.{}", route.class.name(), route.method_name)
            }
            RouteHandler::Function(route) => match route.name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("\"{} {}\"", self.verb, self.path),
            },
        }
    }

    /// Bind per-request facts for controller routes; no-op for functions.
    pub fn update_bindings(&self, ctx: &mut RequestContext) {
        if let RouteHandler::Controller(route) = &self.handler {
            route.update_bindings(ctx);
        }
    }

    pub async fn invoke_handler(
        &self,
        ctx: &RequestContext,
        args: OperationArgs,
    ) -> OperationResult {
        match &self.handler {
            RouteHandler::Function(route) => route.invoke(args).await,
            RouteHandler::Controller(route) => route.invoke(ctx, args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Controller, ControllerRegistry};
    use crate::error::DispatchError;
    use serde_json::{json, Value};

    #[test]
    fn test_verb_is_normalized_and_matched_case_insensitively() {
        let entry = RouteEntry::function(
            "GET",
            "/pets/{id}",
            OperationSpec::new(),
            FunctionRoute::from_sync(|_| Ok(Value::Null)),
        )
        .unwrap();
        assert_eq!(entry.verb(), "get");
        assert!(entry.matches("get", "/pets/1").is_some());
        assert!(entry.matches("GeT", "/pets/1").is_some());
        assert!(entry.matches("post", "/pets/1").is_none());
    }

    #[test]
    fn test_describe_function_route() {
        let unnamed = RouteEntry::function(
            "get",
            "/pets",
            OperationSpec::new(),
            FunctionRoute::from_sync(|_| Ok(Value::Null)),
        )
        .unwrap();
        assert_eq!(unnamed.describe(), "\"get /pets\"");

        let named = RouteEntry::function(
            "get",
            "/pets",
            OperationSpec::new(),
            FunctionRoute::from_sync(|_| Ok(Value::Null)).named("listPets"),
        )
        .unwrap();
        assert_eq!(named.describe(), "listPets");
    }

    #[test]
    fn test_describe_controller_route() {
        let entry = RouteEntry::controller(
            "get",
            "/pets/{id}",
            OperationSpec::new().with_operation_name("findById"),
            ControllerClass::new("PetController"),
            None,
        )
        .unwrap();
        assert_eq!(entry.describe(), "PetController.findById");
    }

    #[test]
    fn test_explicit_method_name_wins_over_extension() {
        let entry = RouteEntry::controller(
            "get",
            "/pets",
            OperationSpec::new().with_operation_name("fromSpec"),
            ControllerClass::new("PetController"),
            Some("explicit"),
        )
        .unwrap();
        assert_eq!(entry.describe(), "PetController.explicit");
    }

    #[test]
    fn test_missing_method_name_fails_at_registration() {
        let err = RouteEntry::controller(
            "get",
            "/pets/{id}",
            OperationSpec::new().with_operation_id("getPet"),
            ControllerClass::new("PetController"),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::MissingOperationName {
                verb: "get".into(),
                path: "/pets/{id}".into(),
                controller: "PetController".into(),
            }
        );
    }

    #[test]
    fn test_invalid_template_fails_at_registration() {
        let err = RouteEntry::function(
            "get",
            "/pets/{}",
            OperationSpec::new(),
            FunctionRoute::from_sync(|_| Ok(Value::Null)),
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_function_route_is_pass_through() {
        let entry = RouteEntry::function(
            "get",
            "/sum",
            OperationSpec::new(),
            FunctionRoute::new(|args: OperationArgs| async move {
                let total: i64 = args.iter().filter_map(Value::as_i64).sum();
                Ok(json!(total))
            }),
        )
        .unwrap();
        let mut ctx = RequestContext::default();
        entry.update_bindings(&mut ctx);
        assert!(ctx.current_controller().is_none());
        let out = entry
            .invoke_handler(&ctx, vec![json!(1), json!(2)])
            .await
            .unwrap();
        assert_eq!(out, json!(3));
    }

    #[tokio::test]
    async fn test_deferred_function_route() {
        let route = FunctionRoute::from_deferred(|args| {
            if args.is_empty() {
                Deferred::ready(Ok(json!("now")))
            } else {
                Deferred::pending(async { Ok(json!("later")) })
            }
        });
        assert_eq!(route.invoke(vec![]).await.unwrap(), json!("now"));
        assert_eq!(route.invoke(vec![json!(1)]).await.unwrap(), json!("later"));
    }

    struct Echo;

    impl Controller for Echo {
        fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult> {
            match operation {
                "echo" => Deferred::pending(async move { Ok(Value::Array(args)) }),
                other => Deferred::ready(Err(DispatchError::UnknownOperation {
                    controller: "Echo".into(),
                    operation: other.into(),
                }
                .into())),
            }
        }
    }

    #[tokio::test]
    async fn test_controller_route_binds_and_invokes() {
        let mut registry = ControllerRegistry::new();
        let class = registry.register_with("Echo", |_| Echo);
        let entry = RouteEntry::controller("post", "/echo", OperationSpec::new(), class, Some("echo"))
            .unwrap();

        let mut ctx = RequestContext::new(Arc::new(registry));
        entry.update_bindings(&mut ctx);
        assert_eq!(ctx.current_controller().map(|c| c.name()), Some("Echo"));
        assert_eq!(ctx.current_operation(), Some("echo"));

        let out = entry.invoke_handler(&ctx, vec![json!("a")]).await.unwrap();
        assert_eq!(out, json!(["a"]));
    }

    #[tokio::test]
    async fn test_unknown_method_surfaces_as_handler_error() {
        let mut registry = ControllerRegistry::new();
        let class = registry.register_with("Echo", |_| Echo);
        let entry =
            RouteEntry::controller("get", "/x", OperationSpec::new(), class, Some("nope")).unwrap();
        let ctx = RequestContext::new(Arc::new(registry));
        let err = entry.invoke_handler(&ctx, vec![]).await.unwrap_err();
        assert!(err.downcast_ref::<DispatchError>().is_some());
    }
}
