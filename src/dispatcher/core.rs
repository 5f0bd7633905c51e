use super::context::RequestContext;
use super::controller::{OperationArgs, OperationResult};
use crate::error::{BoxError, RouteNotFound};
use crate::router::{ParsedRequest, ResolvedRoute, RouteHandler, RoutingTable};
use crate::spec::ParameterLocation;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

/// Steps a resolved route goes through while it is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Matched,
    /// Controller routes only: bindings are being written into the context.
    PreparingContext,
    Invoking,
    Succeeded,
    Failed,
}

impl Display for InvocationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvocationState::Matched => "matched",
            InvocationState::PreparingContext => "preparing_context",
            InvocationState::Invoking => "invoking",
            InvocationState::Succeeded => "succeeded",
            InvocationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Failure of [`dispatch`]: either nothing matched or the handler failed.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    NotFound(#[from] RouteNotFound),

    /// The error returned by the handler or controller constructor, unchanged.
    #[error(transparent)]
    Handler(BoxError),
}

impl InvokeError {
    /// The handler error, if that is what this is.
    #[must_use]
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            InvokeError::Handler(e) => Some(e),
            InvokeError::NotFound(_) => None,
        }
    }
}

impl ResolvedRoute {
    /// Run the route's handler.
    ///
    /// Controller routes first record the controller class and method in
    /// `ctx`, then the controller is constructed and the method is called.
    /// Function routes leave `ctx` untouched. The handler's result, success or
    /// error, is returned as produced.
    pub async fn execute(&self, ctx: &mut RequestContext, args: OperationArgs) -> OperationResult {
        let request_id = ctx.request_id();
        let handler = self.describe();
        let mut state = InvocationState::Matched;
        debug!(
            request_id = %request_id,
            handler = %handler,
            state = %state,
            args_count = args.len(),
            "Invocation state"
        );

        if let RouteHandler::Controller(_) = self.handler() {
            state = InvocationState::PreparingContext;
            debug!(request_id = %request_id, handler = %handler, state = %state, "Invocation state");
            self.update_bindings(ctx);
        }

        state = InvocationState::Invoking;
        debug!(request_id = %request_id, handler = %handler, state = %state, "Invocation state");

        let execution_start = Instant::now();
        let result = self.invoke_handler(ctx, args).await;
        let execution_time_us = execution_start.elapsed().as_micros();

        match &result {
            Ok(_) => {
                state = InvocationState::Succeeded;
                debug!(
                    request_id = %request_id,
                    handler = %handler,
                    state = %state,
                    execution_time_us = execution_time_us,
                    "Invocation state"
                );
            }
            Err(e) => {
                state = InvocationState::Failed;
                error!(
                    request_id = %request_id,
                    handler = %handler,
                    state = %state,
                    error = %e,
                    execution_time_us = execution_time_us,
                    "Handler failed"
                );
            }
        }
        result
    }
}

/// Positional arguments for `route`, taken from the request.
///
/// One argument per declared parameter, in declaration order: path parameters
/// from the match, query parameters from the query string, `null` for anything
/// absent or carried elsewhere (headers, cookies). Without declared parameters
/// the extracted path values are passed in template order.
#[must_use]
pub fn build_operation_args(route: &ResolvedRoute, request: &ParsedRequest) -> OperationArgs {
    let declared = &route.spec().parameters;
    if declared.is_empty() {
        return route
            .path_params()
            .iter()
            .map(|(_, v)| Value::String(v.clone()))
            .collect();
    }

    declared
        .iter()
        .map(|param| {
            let value = match param.location {
                ParameterLocation::Path => route.get_path_param(&param.name),
                ParameterLocation::Query => request.query_param(&param.name),
                ParameterLocation::Header | ParameterLocation::Cookie => None,
            };
            value.map_or(Value::Null, |v| Value::String(v.to_string()))
        })
        .collect()
}

/// Resolve `request` against `table` and execute the match.
///
/// `args` of `None` builds them with [`build_operation_args`].
///
/// # Errors
///
/// [`InvokeError::NotFound`] when nothing matches, [`InvokeError::Handler`]
/// carrying the handler's own error otherwise.
pub async fn dispatch(
    table: &RoutingTable,
    ctx: &mut RequestContext,
    request: &ParsedRequest,
    args: Option<OperationArgs>,
) -> Result<Value, InvokeError> {
    let route = table.find_request(request)?;
    let args = args.unwrap_or_else(|| build_operation_args(&route, request));

    info!(
        request_id = %ctx.request_id(),
        method = %request.method,
        path = %request.path,
        handler = %route.describe(),
        "Dispatching request"
    );

    route.execute(ctx, args).await.map_err(InvokeError::Handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{keys, Controller, ControllerRegistry, Deferred};
    use crate::error::DispatchError;
    use crate::router::FunctionRoute;
    use crate::spec::{OperationSpec, ParameterMeta};
    use http::Method;
    use serde_json::json;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    struct Pets;

    impl Controller for Pets {
        fn invoke(&self, operation: &str, args: OperationArgs) -> Deferred<OperationResult> {
            match operation {
                "findById" => Deferred::pending(async move {
                    Ok(json!({ "id": args.first().cloned().unwrap_or(Value::Null) }))
                }),
                "fail" => Deferred::ready(Err(Box::new(Boom) as BoxError)),
                other => Deferred::ready(Err(DispatchError::UnknownOperation {
                    controller: "Pets".into(),
                    operation: other.into(),
                }
                .into())),
            }
        }
    }

    fn pets_table(registry: &mut ControllerRegistry) -> RoutingTable {
        let class = registry.register_with("PetController", |_| Pets);
        let mut table = RoutingTable::new();
        table
            .register_controller_value(
                &class,
                &json!({
                    "paths": {
                        "/pets/{id}": {
                            "get": {
                                "x-operation-name": "findById",
                                "parameters": [{ "name": "id", "in": "path" }]
                            },
                            "delete": { "x-operation-name": "fail" }
                        }
                    }
                }),
            )
            .unwrap();
        table
    }

    #[tokio::test]
    async fn test_execute_controller_route() {
        let mut registry = ControllerRegistry::new();
        let table = pets_table(&mut registry);
        let mut ctx = RequestContext::new(Arc::new(registry));

        let route = table.find("get", "/pets/7").unwrap();
        let out = route.execute(&mut ctx, vec![json!("7")]).await.unwrap();
        assert_eq!(out, json!({ "id": "7" }));
        assert_eq!(
            ctx.current_controller().map(|c| c.name()),
            Some("PetController")
        );
        assert_eq!(ctx.current_operation(), Some("findById"));
    }

    #[tokio::test]
    async fn test_handler_error_is_returned_unchanged() {
        let mut registry = ControllerRegistry::new();
        let table = pets_table(&mut registry);
        let mut ctx = RequestContext::new(Arc::new(registry));

        let route = table.find("delete", "/pets/7").unwrap();
        let err = route.execute(&mut ctx, vec![]).await.unwrap_err();
        assert!(err.downcast_ref::<Boom>().is_some());
    }

    #[tokio::test]
    async fn test_unknown_controller_surfaces_as_handler_error() {
        let mut registry = ControllerRegistry::new();
        let table = pets_table(&mut registry);
        let mut ctx = RequestContext::default();

        let route = table.find("get", "/pets/7").unwrap();
        let err = route.execute(&mut ctx, vec![]).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DispatchError>(),
            Some(&DispatchError::UnknownController {
                controller: "PetController".into()
            })
        );
        // bindings are written before construction is attempted
        assert!(ctx.is_bound(keys::CONTROLLER_CURRENT_CTOR));
    }

    #[tokio::test]
    async fn test_constructor_completes_before_method_runs() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        let mut registry = ControllerRegistry::new();
        let class = registry.register("Slow", move |_| {
            let counter = Arc::clone(&counter);
            Deferred::pending(async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(Pets) as crate::dispatcher::ControllerInstance)
            })
        });

        let mut table = RoutingTable::new();
        table.register_route(
            crate::router::RouteEntry::controller(
                "get",
                "/slow/{id}",
                OperationSpec::new(),
                class,
                Some("findById"),
            )
            .unwrap(),
        );

        let mut ctx = RequestContext::new(Arc::new(registry));
        let route = table.find("get", "/slow/1").unwrap();
        let out = route.execute(&mut ctx, vec![json!(1)]).await.unwrap();
        assert_eq!(out, json!({ "id": 1 }));
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_function_route_leaves_context_alone() {
        let mut table = RoutingTable::new();
        table
            .register_function(
                "get",
                "/ping",
                OperationSpec::new(),
                FunctionRoute::from_sync(|_| Ok(json!("pong"))),
            )
            .unwrap();
        let mut ctx = RequestContext::default();
        let route = table.find("GET", "/ping").unwrap();
        assert_eq!(route.execute(&mut ctx, vec![]).await.unwrap(), json!("pong"));
        assert!(!ctx.is_bound(keys::CONTROLLER_CURRENT_CTOR));
        assert!(!ctx.is_bound(keys::CONTROLLER_CURRENT_OPERATION));
    }

    #[test]
    fn test_build_operation_args_follows_declaration_order() {
        let mut table = RoutingTable::new();
        table
            .register_function(
                "get",
                "/users/{user}/posts/{post}",
                OperationSpec::new()
                    .with_parameter(ParameterMeta::new("limit", ParameterLocation::Query))
                    .with_parameter(ParameterMeta::new("post", ParameterLocation::Path))
                    .with_parameter(ParameterMeta::new("x-trace", ParameterLocation::Header))
                    .with_parameter(ParameterMeta::new("user", ParameterLocation::Path)),
                FunctionRoute::from_sync(|_| Ok(Value::Null)),
            )
            .unwrap();
        let request = ParsedRequest::new(Method::GET, "/users/ada/posts/3").with_query("limit", "5");
        let route = table.find_request(&request).unwrap();
        assert_eq!(
            build_operation_args(&route, &request),
            vec![json!("5"), json!("3"), Value::Null, json!("ada")]
        );
    }

    #[test]
    fn test_build_operation_args_without_declarations() {
        let mut table = RoutingTable::new();
        table
            .register_function(
                "get",
                "/a/{x}/b/{y}",
                OperationSpec::new(),
                FunctionRoute::from_sync(|_| Ok(Value::Null)),
            )
            .unwrap();
        let request = ParsedRequest::new(Method::GET, "/a/1/b/2");
        let route = table.find_request(&request).unwrap();
        assert_eq!(
            build_operation_args(&route, &request),
            vec![json!("1"), json!("2")]
        );
    }

    #[tokio::test]
    async fn test_dispatch_not_found_and_success() {
        let mut registry = ControllerRegistry::new();
        let table = pets_table(&mut registry);
        let mut ctx = RequestContext::new(Arc::new(registry));

        let missing = ParsedRequest::new(Method::GET, "/owners/1");
        match dispatch(&table, &mut ctx, &missing, None).await {
            Err(InvokeError::NotFound(e)) => assert_eq!(e.path, "/owners/1"),
            other => panic!("expected not found, got {other:?}"),
        }

        let found = ParsedRequest::new(Method::GET, "/pets/42");
        let out = dispatch(&table, &mut ctx, &found, None).await.unwrap();
        assert_eq!(out, json!({ "id": "42" }));
    }

    #[tokio::test]
    async fn test_dispatch_handler_error() {
        let mut registry = ControllerRegistry::new();
        let table = pets_table(&mut registry);
        let mut ctx = RequestContext::new(Arc::new(registry));

        let request = ParsedRequest::new(Method::DELETE, "/pets/42");
        let err = dispatch(&table, &mut ctx, &request, Some(vec![]))
            .await
            .unwrap_err();
        let handler_err = err.into_handler_error().unwrap();
        assert_eq!(handler_err.to_string(), "boom");
    }

    #[test]
    fn test_invocation_state_display() {
        assert_eq!(InvocationState::PreparingContext.to_string(), "preparing_context");
        assert_eq!(InvocationState::Failed.to_string(), "failed");
    }
}
