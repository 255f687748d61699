//! Module: agg
//! Responsibility: the federated aggregation pipeline — tolerant wrapping,
//! paged caching, concatenation, ordered k-way merge, adjacent-run dedup.
//! Does not own: source contents, comparison semantics, or the facade's
//! merge precondition.
//! Boundary: everything here is pull-based; no element is produced until a
//! consumer asks for it.

pub mod cache;
pub mod concat;
pub mod dedup;
pub mod merge;
pub mod tolerant;

#[cfg(test)]
mod tests;

pub use cache::{CacheCursor, ChunkCache};
pub use concat::ConcatIter;
pub use dedup::DedupAdjacent;
pub use merge::MergeIter;
pub use tolerant::TolerantSource;

use crate::{
    error::{AggregateError, FailureRecord, QueryError},
    obs::{DiagEvent, sink},
    query::OrderSpec,
    traits::SourceIter,
};
use std::{cell::RefCell, rc::Rc};

///
/// FailureMode
/// Per-element recovery policy for one wrapped source.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureMode {
    /// Drop the failing element and keep producing.
    Skip,

    /// Drop the failing element, append a [`FailureRecord`], keep producing.
    CollectErrors,

    /// Re-raise the failure unmodified and stop producing.
    Propagate,
}

///
/// AccumulatedFailures
///
/// Shared append-only ledger of recovered per-element failures. One ledger
/// is shared by every wrapper of one aggregation so the terminal aggregate
/// error carries the complete set, not just the first.
///

#[derive(Clone, Debug, Default)]
pub struct AccumulatedFailures {
    records: Rc<RefCell<Vec<FailureRecord>>>,
}

impl AccumulatedFailures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, record: FailureRecord) {
        self.records.borrow_mut().push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Copy the recorded failures in recording order.
    #[must_use]
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.borrow().clone()
    }

    /// Drain the ledger, leaving it empty.
    #[must_use]
    pub fn take(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.records.borrow_mut())
    }
}

///
/// FederatedAggregator
///
/// N independently-queried sources presented as one pull-based sequence.
/// The mode is selected once at construction and fixed for the aggregator's
/// lifetime: an empty order spec concatenates, a non-empty one merges.
///

pub struct FederatedAggregator<T> {
    inner: Inner<T>,
    failures: AccumulatedFailures,
    rows: u64,
    finished: bool,
}

enum Inner<T> {
    Concat(ConcatIter<T>),
    Merge(MergeIter<T>),
}

impl<T: Clone + 'static> FederatedAggregator<T> {
    /// Build an aggregator over `sources` in list order. `chunk_size` only
    /// applies to merge mode, which pages each source through a
    /// [`ChunkCache`]; concatenation drains sources directly.
    pub fn new(
        sources: Vec<SourceIter<T>>,
        order: OrderSpec<T>,
        failure_mode: FailureMode,
        chunk_size: usize,
    ) -> Result<Self, QueryError> {
        let failures = AccumulatedFailures::new();

        let inner = if order.is_empty() {
            let wrapped = sources
                .into_iter()
                .enumerate()
                .map(|(index, source)| {
                    TolerantSource::wrap_indexed(source, index, failure_mode, failures.clone())
                })
                .collect();

            Inner::Concat(ConcatIter::new(wrapped))
        } else {
            let mut cursors = Vec::with_capacity(sources.len());
            for (index, source) in sources.into_iter().enumerate() {
                let wrapped =
                    TolerantSource::wrap_indexed(source, index, failure_mode, failures.clone());
                let cache = ChunkCache::new(Box::new(wrapped), chunk_size)?;
                cursors.push(cache.cursor());
            }

            Inner::Merge(MergeIter::new(cursors, order, failure_mode, failures.clone()))
        };

        Ok(Self {
            inner,
            failures,
            rows: 0,
            finished: false,
        })
    }

    /// The shared failure ledger. In merge mode with
    /// [`FailureMode::CollectErrors`] the ledger is drained into the
    /// terminal aggregate error; otherwise it stays inspectable here.
    #[must_use]
    pub const fn failures(&self) -> &AccumulatedFailures {
        &self.failures
    }

    #[must_use]
    pub const fn is_merge(&self) -> bool {
        matches!(self.inner, Inner::Merge(_))
    }
}

impl<T: Clone + 'static> Iterator for FederatedAggregator<T> {
    type Item = Result<T, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match &mut self.inner {
            Inner::Concat(iter) => iter.next(),
            Inner::Merge(iter) => iter.next(),
        };

        match &item {
            Some(Ok(_)) => self.rows += 1,
            Some(Err(_)) => {}
            None => {
                if !self.finished {
                    self.finished = true;
                    sink::record(DiagEvent::AggregateFinished { rows: self.rows });
                }
            }
        }

        item
    }
}
