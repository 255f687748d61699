use crate::response::Aggregated;
use pkgfed_core::{
    agg::{DedupAdjacent, FailureMode, FederatedAggregator},
    error::{AggregateError, QueryError},
    query::{FilterSpec, OrderSpec},
    traits::{IdentityEq, PackageSource, SourceIter, TieBreak},
};


/// Default number of elements fetched from a source per paging request.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

///
/// FederatedQuery
///
/// Per-call query over a repository's sources. Owns refinement and the
/// mode decision only; all pipeline mechanics live in the engine.
///
/// An empty order spec aggregates by concatenation; a non-empty one by
/// ordered merge. `merged` additionally enforces the merge precondition
/// eagerly, before any source is touched.
///

pub struct FederatedQuery<'a, T> {
    sources: &'a [Box<dyn PackageSource<T>>],
    order: OrderSpec<T>,
    filter: Option<FilterSpec<T>>,
    dedup: Option<(IdentityEq<T>, TieBreak<T>)>,
    ignore_failures: bool,
    chunk_size: usize,
}

impl<'a, T: Clone + 'static> FederatedQuery<'a, T> {
    pub(crate) fn new(sources: &'a [Box<dyn PackageSource<T>>]) -> Self {
        Self {
            sources,
            order: OrderSpec::unordered(),
            filter: None,
            dedup: None,
            ignore_failures: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    // ------------------------------------------------------------------
    // Query refinement
    // ------------------------------------------------------------------

    /// Set the ordering chain. Non-empty switches aggregation to merge mode.
    #[must_use]
    pub fn order(mut self, order: OrderSpec<T>) -> Self {
        self.order = order;
        self
    }

    /// Apply a filter descriptor beneath the failure wrapper of every
    /// source. The descriptor's parameters were snapshotted when it was
    /// built, so repeated chunked re-execution stays stable.
    #[must_use]
    pub fn filter(mut self, filter: FilterSpec<T>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Collapse adjacent identity-equal results, keeping the representative
    /// the tie-break comparer ranks highest. Only meaningful when the
    /// leading order keys group identity-equal records together.
    #[must_use]
    pub fn dedup(mut self, identity_eq: IdentityEq<T>, tie_break: TieBreak<T>) -> Self {
        self.dedup = Some((identity_eq, tie_break));
        self
    }

    /// Accept partial results: per-element failures are skipped silently
    /// instead of surfacing at the end (merge) or aborting (concatenation).
    #[must_use]
    pub const fn ignore_failures(mut self) -> Self {
        self.ignore_failures = true;
        self
    }

    /// Override the paging chunk size used in merge mode.
    #[must_use]
    pub const fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// General aggregation entry point: concatenation when unordered,
    /// ordered merge otherwise.
    pub fn execute(self) -> Result<AggregateRows<T>, QueryError> {
        let failure_mode = if self.ignore_failures {
            FailureMode::Skip
        } else if self.order.is_empty() {
            FailureMode::Propagate
        } else {
            FailureMode::CollectErrors
        };

        let iters = self.source_iters();
        let aggregator =
            FederatedAggregator::new(iters, self.order, failure_mode, self.chunk_size)?;

        let inner = match self.dedup {
            None => RowsInner::Plain(aggregator),
            Some((identity_eq, tie_break)) => {
                RowsInner::Dedup(DedupAdjacent::new(aggregator, identity_eq, tie_break))
            }
        };

        Ok(AggregateRows { inner })
    }

    /// Merge-style access. Rejects an empty order spec before any source
    /// is consulted; this is a caller programming error, never recovered.
    pub fn merged(self) -> Result<AggregateRows<T>, QueryError> {
        if self.order.is_empty() {
            return Err(QueryError::UnorderedAggregation);
        }

        self.execute()
    }

    /// Drain and count. Equivalent to consuming `execute` and counting;
    /// deliberately not optimized — the full merge state machine runs.
    pub fn count(self) -> Result<u32, QueryError> {
        let mut count: u32 = 0;
        for item in self.execute()? {
            item?;
            count = count.saturating_add(1);
        }

        Ok(count)
    }

    /// Drain into a materialized response.
    pub fn collect(self) -> Result<Aggregated<T>, QueryError> {
        let mut rows = Vec::new();
        for item in self.execute()? {
            rows.push(item?);
        }

        Ok(Aggregated(rows))
    }

    fn source_iters(&self) -> Vec<SourceIter<T>> {
        self.sources
            .iter()
            .map(|source| {
                let iter = source.list();
                match &self.filter {
                    None => iter,
                    Some(filter) => {
                        let filter = filter.clone();
                        let filtered = iter.filter(move |item| match item {
                            Ok(record) => filter.matches(record),
                            // Failures pass through to the failure policy.
                            Err(_) => true,
                        });

                        Box::new(filtered)
                    }
                }
            })
            .collect()
    }
}

///
/// AggregateRows
///
/// The pull-based result sequence of one aggregation. Dropping it abandons
/// all remaining work; there is no release step.
///

pub struct AggregateRows<T: Clone + 'static> {
    inner: RowsInner<T>,
}

enum RowsInner<T: Clone + 'static> {
    Plain(FederatedAggregator<T>),
    Dedup(DedupAdjacent<FederatedAggregator<T>, T>),
}

impl<T: Clone + 'static> Iterator for AggregateRows<T> {
    type Item = Result<T, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            RowsInner::Plain(iter) => iter.next(),
            RowsInner::Dedup(iter) => iter.next(),
        }
    }
}
