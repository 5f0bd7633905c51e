use crate::dispatcher::{dispatch, ControllerClass, InvokeError, RequestContext};
use crate::router::{parse_request_url, FunctionRoute, ParsedRequest, RoutingTable};
use crate::runtime_config::RuntimeConfig;
use crate::spec::{load_spec, ApiSpec};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for oproute
///
/// Loads an OpenAPI document into a routing table and inspects or exercises it.
#[derive(Parser)]
#[command(name = "oproute")]
#[command(about = "OpenAPI routing table inspector", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every registered route in lookup order
    Routes {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Register the operations as methods of this controller class
        /// (requires `x-operation-name` on every operation)
        #[arg(short, long)]
        controller: Option<String>,
    },
    /// Resolve a request and print the matched route and path parameters
    Resolve {
        #[arg(short, long)]
        spec: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, e.g. `/pets/7?verbose=true`
        #[arg(short, long)]
        url: String,
    },
    /// Resolve a request and invoke an echo handler for it
    Call {
        #[arg(short, long)]
        spec: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long)]
        url: String,
    },
}

/// Echo function routes for every operation, named by `operationId` when set.
pub fn echo_table(spec: &ApiSpec, config: RuntimeConfig) -> Result<RoutingTable> {
    let mut table = RoutingTable::with_config(config);
    for (path, verb, operation) in spec.operations() {
        let label: Arc<str> = match &operation.operation_id {
            Some(id) if !id.is_empty() => Arc::from(id.as_str()),
            _ => Arc::from(format!("{} {}", verb.to_ascii_uppercase(), path)),
        };
        let echoed = Arc::clone(&label);
        let mut route = FunctionRoute::from_sync(move |args| {
            Ok(json!({ "operation": echoed.as_ref(), "args": args }))
        });
        if operation.operation_id.is_some() {
            route = route.named(label);
        }
        table
            .register_function(verb, path, operation.clone(), route)
            .with_context(|| format!("Failed to register {verb} {path}"))?;
    }
    Ok(table)
}

fn load_table(spec_path: &Path, controller: Option<&str>) -> Result<RoutingTable> {
    let spec = load_spec(spec_path)?;
    let config = RuntimeConfig::from_env();
    let table = match controller {
        Some(name) => {
            let mut table = RoutingTable::with_config(config);
            table
                .register_controller(&ControllerClass::new(name), &spec)
                .with_context(|| format!("Failed to register controller {name}"))?;
            table
        }
        None => echo_table(&spec, config)?,
    };
    table.log_summary();
    Ok(table)
}

fn parse_request(method: &str, url: &str) -> Result<ParsedRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{method}'"))?;
    parse_request_url(method, url).with_context(|| format!("Invalid request URL '{url}'"))
}

/// JSON description of how `table` resolves a request.
///
/// # Errors
///
/// Fails when nothing matches.
pub fn resolve_report(table: &RoutingTable, request: &ParsedRequest) -> Result<Value> {
    let route = table.find_request(request)?;
    let params: Map<String, Value> = route
        .path_params()
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Ok(json!({
        "handler": route.describe(),
        "verb": route.verb(),
        "path": route.path(),
        "path_params": params,
    }))
}

/// Dispatch `request` through `table` with a fresh request context.
pub async fn call_report(table: &RoutingTable, request: &ParsedRequest) -> Result<Value> {
    let mut ctx = RequestContext::default();
    match dispatch(table, &mut ctx, request, None).await {
        Ok(value) => Ok(value),
        Err(InvokeError::NotFound(e)) => Err(e.into()),
        Err(InvokeError::Handler(e)) => Err(anyhow!(e).context("Handler failed")),
    }
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Routes { spec, controller } => {
            let table = load_table(spec, controller.as_deref())?;
            for line in table.describe_routes() {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Resolve { spec, method, url } => {
            let table = load_table(spec, None)?;
            let request = parse_request(method, url)?;
            let report = resolve_report(&table, &request)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Call { spec, method, url } => {
            let table = load_table(spec, None)?;
            let request = parse_request(method, url)?;
            let result = call_report(&table, &request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
