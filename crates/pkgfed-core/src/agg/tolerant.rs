use crate::{
    agg::{AccumulatedFailures, FailureMode},
    error::{FailureRecord, SourceError},
    obs::{DiagEvent, sink},
    traits::SourceIter,
};

///
/// TolerantSource
///
/// Makes one source's element production resilient to per-element failures.
/// Recovery is always "move forward": a failed element is never buffered for
/// a retry. In `Propagate` mode the first failure is re-raised unmodified
/// and the wrapper fuses.
///

pub struct TolerantSource<T> {
    source: SourceIter<T>,
    mode: FailureMode,
    source_index: usize,
    failures: AccumulatedFailures,
    done: bool,
}

impl<T> TolerantSource<T> {
    /// Wrap a standalone source with its own failure ledger.
    #[must_use]
    pub fn wrap(source: SourceIter<T>, mode: FailureMode) -> Self {
        Self::wrap_indexed(source, 0, mode, AccumulatedFailures::new())
    }

    /// Wrap one source of an aggregation, sharing the aggregation's ledger.
    /// `source_index` is the source's position in the aggregation list and
    /// tags both failure records and diagnostics.
    #[must_use]
    pub fn wrap_indexed(
        source: SourceIter<T>,
        source_index: usize,
        mode: FailureMode,
        failures: AccumulatedFailures,
    ) -> Self {
        Self {
            source,
            mode,
            source_index,
            failures,
            done: false,
        }
    }

    /// Failures recovered so far (populated in `CollectErrors` mode only).
    #[must_use]
    pub const fn failures(&self) -> &AccumulatedFailures {
        &self.failures
    }

    fn recover(&mut self, error: SourceError) {
        sink::record(DiagEvent::SourceSkipped {
            source: self.source_index,
            message: error.to_string(),
        });

        if self.mode == FailureMode::CollectErrors {
            self.failures
                .push(FailureRecord::new(self.source_index, error));
        }
    }
}

impl<T> Iterator for TolerantSource<T> {
    type Item = Result<T, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.source.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Ok(item)) => return Some(Ok(item)),
                Some(Err(error)) => match self.mode {
                    FailureMode::Propagate => {
                        self.done = true;
                        return Some(Err(error));
                    }
                    FailureMode::Skip | FailureMode::CollectErrors => self.recover(error),
                },
            }
        }
    }
}
