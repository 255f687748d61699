use crate::{
    agg::{AccumulatedFailures, CacheCursor, FailureMode},
    error::AggregateError,
    query::OrderSpec,
};
use std::cmp::Ordering;

///
/// MergeIter
///
/// Merge-mode aggregation: an ordered k-way merge over one paged cursor per
/// source. Each step peeks every still-live cursor (fetching only as
/// needed), selects the minimal head under the order chain, and advances
/// only the selected cursor. Ties go to the earliest-listed source, which
/// makes the merge deterministic and stable for any number of
/// simultaneously-equal heads.
///
/// Requires each source to already be ordered consistently with the order
/// spec; the merge interleaves, it does not sort.
///

pub struct MergeIter<T> {
    cursors: Vec<CacheCursor<T>>,
    order: OrderSpec<T>,
    failure_mode: FailureMode,
    failures: AccumulatedFailures,
    done: bool,
}

impl<T: Clone> MergeIter<T> {
    #[must_use]
    pub const fn new(
        cursors: Vec<CacheCursor<T>>,
        order: OrderSpec<T>,
        failure_mode: FailureMode,
        failures: AccumulatedFailures,
    ) -> Self {
        Self {
            cursors,
            order,
            failure_mode,
            failures,
            done: false,
        }
    }
}

impl<T: Clone> Iterator for MergeIter<T> {
    type Item = Result<T, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Strict-less replacement keeps the earliest-listed source on ties.
        let mut best: Option<(usize, T)> = None;
        for (index, cursor) in self.cursors.iter_mut().enumerate() {
            match cursor.peek() {
                Ok(None) => {}
                Ok(Some(head)) => {
                    let replace = match &best {
                        None => true,
                        Some((_, current)) => {
                            self.order.compare(&head, current) == Ordering::Less
                        }
                    };
                    if replace {
                        best = Some((index, head));
                    }
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(AggregateError::Source(error)));
                }
            }
        }

        if let Some((index, item)) = best {
            self.cursors[index].advance();
            return Some(Ok(item));
        }

        // All cursors exhausted. Surface the collected failures, if any,
        // after every successfully-produced element.
        self.done = true;
        if self.failure_mode == FailureMode::CollectErrors && !self.failures.is_empty() {
            return Some(Err(AggregateError::Sources(self.failures.take())));
        }

        None
    }
}
