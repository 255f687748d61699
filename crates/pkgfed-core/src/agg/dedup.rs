use crate::{
    error::AggregateError,
    traits::{IdentityEq, TieBreak},
};
use std::cmp::Ordering;

///
/// DedupAdjacent
///
/// Collapses runs of identity-equal items into one representative each, in
/// a single forward pass with O(1) auxiliary state. Only *adjacent* equal
/// items collapse: two equal items separated by an unequal one are retained
/// as two outputs, since global dedup would need unbounded memory.
///
/// CONTRACT: meaningful only when the input's leading order keys group
/// identity-equal items together; otherwise dedup is silently incomplete.
///

pub struct DedupAdjacent<I, T>
where
    I: Iterator<Item = Result<T, AggregateError>>,
{
    input: I,
    identity_eq: IdentityEq<T>,
    tie_break: TieBreak<T>,
    run: Option<Run<T>>,
    pending_error: Option<AggregateError>,
    done: bool,
}

// The open run: every item seen so far that is identity-equal to `first`,
// reduced to the representative `best` under the tie-break comparer.
struct Run<T> {
    first: T,
    best: T,
}

impl<I, T> DedupAdjacent<I, T>
where
    I: Iterator<Item = Result<T, AggregateError>>,
    T: Clone,
{
    #[must_use]
    pub fn new(input: I, identity_eq: IdentityEq<T>, tie_break: TieBreak<T>) -> Self {
        Self {
            input,
            identity_eq,
            tie_break,
            run: None,
            pending_error: None,
            done: false,
        }
    }
}

impl<I, T> Iterator for DedupAdjacent<I, T>
where
    I: Iterator<Item = Result<T, AggregateError>>,
    T: Clone,
{
    type Item = Result<T, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return self.pending_error.take().map(Err);
        }

        loop {
            match self.input.next() {
                Some(Ok(item)) => match &mut self.run {
                    None => {
                        self.run = Some(Run {
                            first: item.clone(),
                            best: item,
                        });
                    }
                    Some(run) => {
                        if (self.identity_eq)(&run.first, &item) {
                            // Strictly-greater replacement keeps the
                            // earliest arrival on tie-break ties.
                            if (self.tie_break)(&item, &run.best) == Ordering::Greater {
                                run.best = item;
                            }
                        } else {
                            let closed = std::mem::replace(
                                run,
                                Run {
                                    first: item.clone(),
                                    best: item,
                                },
                            );
                            return Some(Ok(closed.best));
                        }
                    }
                },
                Some(Err(error)) => {
                    // Flush the open run before surfacing the terminal
                    // error, preserving "all elements, then the failure".
                    self.done = true;
                    if let Some(run) = self.run.take() {
                        self.pending_error = Some(error);
                        return Some(Ok(run.best));
                    }
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    if let Some(run) = self.run.take() {
                        return Some(Ok(run.best));
                    }
                    return None;
                }
            }
        }
    }
}
