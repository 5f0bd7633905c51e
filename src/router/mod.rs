//! # Router Module
//!
//! Maps an inbound `(method, path)` to the registered operation that serves it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling OpenAPI path templates (`/pets/{id}`) into matchers
//! - Holding route entries in registration order
//! - Returning the first entry that accepts a request, with its path parameters
//! - Reporting `RouteNotFound` when nothing does
//!
//! ## Architecture
//!
//! 1. **Compilation**: while wiring the application, each template is turned
//!    into an anchored regex plus the ordered list of its parameter names.
//!    Bad templates and controller operations without a method name fail here,
//!    at startup.
//!
//! 2. **Matching**: per request, entries are tried in registration order and
//!    the first whose verb and pattern accept the request wins. A segment trie
//!    (`OPROUTE_LOOKUP=trie`) can answer the same question without testing
//!    every entry; it returns the earliest-registered candidate, so both
//!    strategies agree on every input.
//!
//! ## Example
//!
//! ```rust
//! use oproute::router::{FunctionRoute, RoutingTable};
//! use oproute::spec::OperationSpec;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut table = RoutingTable::new();
//! table.register_function(
//!     "get",
//!     "/pets/{id}",
//!     OperationSpec::new(),
//!     FunctionRoute::from_sync(|args| Ok(json!({ "id": args[0] }))),
//! )?;
//!
//! let resolved = table.find("GET", "/pets/7")?;
//! assert_eq!(resolved.get_path_param("id"), Some("7"));
//! assert!(table.find("GET", "/pets").is_err());
//! # Ok(())
//! # }
//! ```

mod core;
mod entry;
mod pattern;
mod radix;
mod request;

pub use core::{ResolvedRoute, RoutingTable};
pub use entry::{ControllerRoute, FunctionRoute, RouteEntry, RouteHandler};
pub use pattern::{ParamVec, PathPattern, MAX_INLINE_PARAMS};
pub use radix::RadixIndex;
pub use request::{parse_request_url, ParsedRequest};
