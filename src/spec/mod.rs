//! Operation-spec types and loading.
//!
//! The router treats the API specification as an opaque data contract. It only
//! needs the `paths` table (template → verb → operation), the
//! `x-operation-name` extension, and parameter names for diagnostics.

mod build;
mod load;
mod types;

pub use build::*;
pub use load::*;
pub use types::*;
