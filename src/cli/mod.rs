//! # CLI Module
//!
//! Command-line access to the routing table, for checking how a specification
//! will be routed before wiring it into a service.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print every route in lookup order:
//!
//! ```bash
//! oproute routes --spec openapi.yaml
//! oproute routes --spec openapi.yaml --controller PetController
//! ```
//!
//! With `--controller` every operation is registered as a method of that class,
//! so an operation missing `x-operation-name` fails the command.
//!
//! ### `resolve`
//!
//! Show which route serves a request and the path parameters it extracts:
//!
//! ```bash
//! oproute resolve --spec openapi.yaml --method GET --url /pets/42
//! ```
//!
//! Exits non-zero when no route matches.
//!
//! ### `call`
//!
//! Resolve and invoke an echo handler that returns the operation name and the
//! arguments built from the request:
//!
//! ```bash
//! oproute call --spec openapi.yaml --method GET --url '/pets?limit=5'
//! ```
//!
//! Lookup strategy and logging follow `OPROUTE_LOOKUP` and the
//! `OPROUTE_LOG_*` variables.

mod commands;


pub use commands::{call_report, echo_table, resolve_report, run_cli, Cli, Commands};
