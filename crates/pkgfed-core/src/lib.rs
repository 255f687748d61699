//! Core engine for Pkgfed: collaborator traits, query descriptors, the
//! federated aggregation pipeline, and the diagnostics sink boundary.
//!
//! Everything here is single-threaded and pull-based: no element is produced
//! until a consumer requests it, and a consumer that stops pulling abandons
//! the remaining work with no release step. The shared structures are
//! `Rc`-based and intentionally `!Send`.

pub mod agg;
pub mod error;
pub mod obs;
pub mod query;
pub mod traits;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, caches, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        query::{OrderDirection, OrderSpec},
        traits::{IdentityEq, PackageSource, SourceIter, TieBreak},
        value::Value,
    };
}
