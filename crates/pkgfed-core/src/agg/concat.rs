use crate::{agg::TolerantSource, error::AggregateError};

///
/// ConcatIter
///
/// Concatenation-mode aggregation: each source is drained in full, in
/// source-list order, before the next one starts. A propagated source
/// failure is re-raised unmodified and no further sources are consumed —
/// all-or-nothing semantics per failing source.
///

pub struct ConcatIter<T> {
    sources: Vec<TolerantSource<T>>,
    current: usize,
    done: bool,
}

impl<T> ConcatIter<T> {
    #[must_use]
    pub const fn new(sources: Vec<TolerantSource<T>>) -> Self {
        Self {
            sources,
            current: 0,
            done: false,
        }
    }
}

impl<T> Iterator for ConcatIter<T> {
    type Item = Result<T, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(source) = self.sources.get_mut(self.current) {
            match source.next() {
                Some(Ok(item)) => return Some(Ok(item)),
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(AggregateError::Source(error)));
                }
                None => self.current += 1,
            }
        }

        self.done = true;
        None
    }
}
