//! ## Crate layout
//! - `core`: the aggregation engine — tolerant wrapping, paged caching,
//!   concatenation and ordered merge, adjacent-run dedup, diagnostics.
//! - `repo`: the multi-source repository owning the queried sources.
//! - `query`: the fluent query surface and its draining entry points.
//! - `response`: materialized aggregation results.
//!
//! The `prelude` module mirrors the surface used by calling code.

pub use pkgfed_core as core;

pub mod query;
pub mod repo;
pub mod response;

pub use query::{AggregateRows, FederatedQuery};
pub use repo::FederatedRepo;
pub use response::{Aggregated, ResponseError};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        core::{
            error::{AggregateError, QueryError, SourceError},
            query::{FilterSpec, OrderDirection, OrderSpec, ParamTable},
            traits::{IdentityEq, PackageSource, SourceIter, TieBreak},
            value::Value,
        },
        query::FederatedQuery,
        repo::FederatedRepo,
        response::Aggregated,
    };
}
