//! Routing table - ordered registration and first-match lookup.

use super::entry::{FunctionRoute, RouteEntry};
use super::pattern::ParamVec;
use super::radix::RadixIndex;
use super::request::ParsedRequest;
use crate::dispatcher::ControllerClass;
use crate::error::{RegistrationError, RouteNotFound};
use crate::runtime_config::{LookupStrategy, RuntimeConfig};
use crate::spec::{describe_operation_parameters, ApiSpec, OperationSpec};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A matched entry plus the parameter values extracted for one request.
///
/// Dereferences to the [`RouteEntry`] it was resolved from; the entry is
/// shared, not copied.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    entry: Arc<RouteEntry>,
    path_params: ParamVec,
}

impl ResolvedRoute {
    pub(crate) fn new(entry: Arc<RouteEntry>, path_params: ParamVec) -> Self {
        Self { entry, path_params }
    }

    #[must_use]
    pub fn entry(&self) -> &Arc<RouteEntry> {
        &self.entry
    }

    /// Extracted values, in the order the template declares them.
    #[must_use]
    pub fn path_params(&self) -> &ParamVec {
        &self.path_params
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl Deref for ResolvedRoute {
    type Target = RouteEntry;

    fn deref(&self) -> &RouteEntry {
        &self.entry
    }
}

/// Ordered collection of route entries.
///
/// Registration order is lookup order: the first entry whose verb and template
/// accept a request wins, regardless of how specific later entries are.
/// Duplicates and overlaps are allowed; a later duplicate is reachable only
/// for requests no earlier entry accepts.
///
/// Register everything during startup, then share the table (for example in
/// an `Arc`) for lookups; `find` takes `&self` and needs no locking.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Vec<Arc<RouteEntry>>,
    index: RadixIndex,
    config: RuntimeConfig,
}

impl RoutingTable {
    /// An empty table using the default configuration (linear scan).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Append an entry. Never rejects duplicates.
    pub fn register_route(&mut self, entry: RouteEntry) {
        debug!(
            verb = %entry.verb(),
            path = %entry.path(),
            handler = %entry.describe(),
            parameters = %describe_operation_parameters(entry.spec()),
            "Registering route"
        );

        let index = self.routes.len();
        self.index.insert(
            entry.pattern().segments(),
            Arc::from(entry.verb()),
            index,
        );
        self.routes.push(Arc::new(entry));
    }

    /// Build and register a function entry.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::InvalidPattern`] for a bad template.
    pub fn register_function(
        &mut self,
        verb: &str,
        path: &str,
        spec: OperationSpec,
        handler: FunctionRoute,
    ) -> Result<(), RegistrationError> {
        let entry = RouteEntry::function(verb, path, spec, handler)?;
        self.register_route(entry);
        Ok(())
    }

    /// Register one controller entry for every `(path, verb)` in `spec`.
    ///
    /// All-or-nothing: every entry is built before any is registered, so a
    /// failing operation leaves the table untouched. A spec with no paths
    /// registers nothing and is not an error. Returns the number of entries
    /// registered.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::MissingOperationName`] when an operation names no
    /// method, [`RegistrationError::InvalidPattern`] for a bad template.
    pub fn register_controller(
        &mut self,
        class: &ControllerClass,
        spec: &ApiSpec,
    ) -> Result<usize, RegistrationError> {
        if spec.is_empty() {
            debug!(controller = %class, "Controller spec has no paths; nothing registered");
            return Ok(0);
        }

        debug!(controller = %class, "Registering controller with API");

        let entries = spec
            .operations()
            .map(|(path, verb, operation)| {
                RouteEntry::controller(
                    verb,
                    path,
                    Arc::new(operation.clone()),
                    class.clone(),
                    None,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = entries.len();
        for entry in entries {
            self.register_route(entry);
        }
        Ok(count)
    }

    /// Like [`register_controller`](Self::register_controller), from a raw
    /// specification document.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::InvalidSpec`] when `document` is not an object or
    /// its `paths` is malformed, otherwise as `register_controller`.
    pub fn register_controller_value(
        &mut self,
        class: &ControllerClass,
        document: &serde_json::Value,
    ) -> Result<usize, RegistrationError> {
        let spec = ApiSpec::from_value(document)?;
        self.register_controller(class, &spec)
    }

    /// Find the first entry accepting `method` and `path`.
    ///
    /// # Errors
    ///
    /// [`RouteNotFound`] carrying the method and path when nothing matches.
    pub fn find(&self, method: &str, path: &str) -> Result<ResolvedRoute, RouteNotFound> {
        // R1: Route match attempt
        debug!(
            method = %method,
            path = %path,
            algorithm = %self.config.lookup,
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = match self.config.lookup {
            LookupStrategy::LinearScan => self.find_linear(method, path),
            LookupStrategy::Trie => self.find_indexed(method, path),
        };
        let match_duration = match_start.elapsed();

        match result {
            Some(resolved) => {
                // R2: Route matched
                if match_duration > self.config.slow_match_threshold {
                    warn!(
                        method = %method,
                        path = %path,
                        handler = %resolved.describe(),
                        route_pattern = %resolved.path(),
                        path_params = ?resolved.path_params(),
                        duration_us = match_duration.as_micros(),
                        algorithm = %self.config.lookup,
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        handler = %resolved.describe(),
                        route_pattern = %resolved.path(),
                        path_params = ?resolved.path_params(),
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                Ok(resolved)
            }
            None => {
                // R3: No route found (404)
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    algorithm = %self.config.lookup,
                    "No route matched"
                );
                Err(RouteNotFound::new(method, path))
            }
        }
    }

    /// [`find`](Self::find) for a parsed request.
    pub fn find_request(&self, request: &ParsedRequest) -> Result<ResolvedRoute, RouteNotFound> {
        self.find(request.method.as_str(), &request.path)
    }

    /// Test every entry in registration order.
    #[must_use]
    pub fn find_linear(&self, method: &str, path: &str) -> Option<ResolvedRoute> {
        self.routes.iter().find_map(|entry| {
            entry
                .matches(method, path)
                .map(|params| ResolvedRoute::new(Arc::clone(entry), params))
        })
    }

    /// Ask the trie for the earliest candidate, then extract its parameters.
    #[must_use]
    pub fn find_indexed(&self, method: &str, path: &str) -> Option<ResolvedRoute> {
        let idx = self.index.lookup(method, path)?;
        let entry = self.routes.get(idx)?;
        match entry.matches(method, path) {
            Some(params) => Some(ResolvedRoute::new(Arc::clone(entry), params)),
            None => {
                warn!(
                    method = %method,
                    path = %path,
                    route_pattern = %entry.path(),
                    "Trie candidate rejected by its pattern; falling back to linear scan"
                );
                self.find_linear(method, path)
            }
        }
    }

    /// Entries in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteEntry>> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// One line per entry: `VERB template -> handler`.
    #[must_use]
    pub fn describe_routes(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|e| {
                format!(
                    "{} {} -> {}",
                    e.verb().to_ascii_uppercase(),
                    e.path(),
                    e.describe()
                )
            })
            .collect()
    }

    /// Log a summary of the table once registration is complete.
    pub fn log_summary(&self) {
        if self.routes.is_empty() {
            info!(routes_count = 0, "Routing table loaded with no routes");
            return;
        }

        let routes_summary: Vec<String> = self.describe_routes().into_iter().take(10).collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            routing_algorithm = %self.config.lookup,
            "Routing table loaded"
        );
    }
}
