//! Module: traits
//! Responsibility: collaborator contracts consumed by the aggregation engine.
//! Does not own: source contents, comparison semantics, or failure policy.
//! Boundary: everything behind these types is caller-supplied and opaque.

use crate::error::SourceError;
use std::{cmp::Ordering, rc::Rc};

/// Lazy element production for one source. Every element pull either yields
/// a record or the failure raised while producing it; the engine never
/// retries a failed pull.
pub type SourceIter<T> = Box<dyn Iterator<Item = Result<T, SourceError>>>;

/// Identity equality over records, used to recognise "the same package"
/// across sources (typically identity + version).
pub type IdentityEq<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// Total-order comparer used to choose a representative among
/// identity-equal records.
pub type TieBreak<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

///
/// PackageSource
///
/// One queryable package listing: a local directory scan, an expanded
/// package store, or a remote catalog feed. The engine never owns or
/// mutates a source; it only pulls from the iterator `list` hands back.
///

pub trait PackageSource<T> {
    /// Stable human-readable name, used in diagnostics only.
    fn name(&self) -> &str;

    /// Produce a fresh lazy listing of this source's records.
    fn list(&self) -> SourceIter<T>;
}
