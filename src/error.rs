//! Error types surfaced by the routing table and the invocation protocol.
//!
//! Three families, matching the three places things can go wrong:
//!
//! - [`RegistrationError`] (and the [`PatternError`] it wraps) happens while
//!   the table is being wired at startup. It is fatal to the registration call.
//! - [`RouteNotFound`] happens per request when no entry accepts the
//!   method and path. The transport layer maps it to a 404.
//! - Handler failures travel as [`BoxError`] and are never wrapped by the
//!   router. [`DispatchError`] is the one kind the router itself produces on
//!   that channel, when the controller registry cannot satisfy a call.

use http::StatusCode;
use thiserror::Error;

/// Error channel for handler and controller-construction failures.
///
/// Whatever a handler returns is handed back to the caller of `invoke` as the
/// same boxed value.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A path template that cannot be compiled into a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Templates are absolute: `/pets/{id}`, never `pets/{id}`.
    #[error("path template '{template}' must start with '/'")]
    MissingLeadingSlash { template: String },

    /// `{}` has no name to bind the segment value to.
    #[error("path template '{template}' contains an empty placeholder '{{}}'")]
    EmptyPlaceholder { template: String },

    /// Braces inside a segment that is not exactly `{name}`.
    #[error(
        "path template '{template}' has segment '{segment}' with a placeholder that is not a whole path segment"
    )]
    EmbeddedPlaceholder { template: String, segment: String },

    /// The same placeholder name appears twice.
    #[error("path template '{template}' declares parameter '{name}' more than once")]
    DuplicateParameter { template: String, name: String },

    /// The generated expression was rejected by the regex engine.
    #[error("path template '{template}' produced an invalid expression: {message}")]
    Regex { template: String, message: String },
}

/// A route or controller spec that cannot be registered.
///
/// Registration errors abort startup; they are never deferred to request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The specification handed to `register_controller_value` is not an object.
    #[error("API specification must be a non-null object: {reason}")]
    InvalidSpec { reason: String },

    /// A path template failed to compile.
    #[error("cannot register \"{verb} {path}\": {source}")]
    InvalidPattern {
        verb: String,
        path: String,
        #[source]
        source: PatternError,
    },

    /// A controller operation with neither an explicit method name nor an
    /// `x-operation-name` extension.
    #[error(
        "methodName must be provided either via the ControllerRoute argument or via \"x-operation-name\" extension field in OpenAPI spec. Operation: \"{verb} {path}\" Controller: {controller}."
    )]
    MissingOperationName {
        verb: String,
        path: String,
        controller: String,
    },
}

/// No registered entry accepts the request's method and path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Endpoint \"{method} {path}\" not found.")]
pub struct RouteNotFound {
    pub method: String,
    pub path: String,
}

impl RouteNotFound {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    /// HTTP status the transport layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

/// Failures produced by the controller registry while dispatching a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No constructor is registered under the controller class name.
    #[error("no controller registered for class '{controller}'")]
    UnknownController { controller: String },

    /// The controller instance has no method with this name.
    #[error("controller '{controller}' has no operation '{operation}'")]
    UnknownOperation {
        controller: String,
        operation: String,
    },
}
