//! Diagnostics sink boundary.
//!
//! Engine logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through DiagEvent and DiagSink.
//!
//! This module is the only allowed bridge between aggregation logic
//! and the thread-local metrics state.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn DiagSink>>> = const { RefCell::new(None) };
}

///
/// DiagEvent
///

#[derive(Clone, Debug)]
pub enum DiagEvent {
    /// A per-element source failure was recovered and the element dropped.
    SourceSkipped { source: usize, message: String },

    /// One bounded chunk was fetched into a paged source cache.
    ChunkFetched { len: usize },

    /// A federated aggregation drained to completion.
    AggregateFinished { rows: u64 },
}

///
/// DiagSink
///

pub trait DiagSink {
    fn record(&self, event: DiagEvent);
}

/// GlobalDiagSink
/// Default sink that folds events into thread-local metrics counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalDiagSink;

impl DiagSink for GlobalDiagSink {
    fn record(&self, event: DiagEvent) {
        metrics::with_state_mut(|m| match event {
            DiagEvent::SourceSkipped { .. } => {
                m.elements_skipped = m.elements_skipped.saturating_add(1);
            }
            DiagEvent::ChunkFetched { .. } => {
                m.chunks_fetched = m.chunks_fetched.saturating_add(1);
            }
            DiagEvent::AggregateFinished { rows } => {
                m.rows_yielded = m.rows_yielded.saturating_add(rows);
            }
        });
    }
}

/// Record one event through the active sink.
pub fn record(event: DiagEvent) {
    let delivered = SINK_OVERRIDE.with(|cell| {
        if let Some(sink) = cell.borrow().as_ref() {
            sink.record(event.clone());
            true
        } else {
            false
        }
    });

    if !delivered {
        GlobalDiagSink.record(event);
    }
}

/// Run `f` with a scoped sink override installed on this thread.
/// The previous sink (if any) is restored afterwards, including on panic
/// unwind out of `f`.
pub fn with_sink<R>(sink: Rc<dyn DiagSink>, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Rc<dyn DiagSink>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = previous);
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _restore = Restore(previous);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Capture(RefCell<Vec<DiagEvent>>);

    impl DiagSink for Capture {
        fn record(&self, event: DiagEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn scoped_override_captures_and_restores() {
        let capture = Rc::new(Capture(RefCell::new(Vec::new())));

        metrics::reset();
        with_sink(capture.clone(), || {
            record(DiagEvent::ChunkFetched { len: 4 });
        });
        record(DiagEvent::ChunkFetched { len: 2 });

        assert_eq!(capture.0.borrow().len(), 1);
        // The post-scope event fell through to the global counters.
        assert_eq!(metrics::snapshot().chunks_fetched, 1);
    }

    #[test]
    fn global_sink_folds_every_event_kind_into_counters() {
        metrics::reset();

        record(DiagEvent::SourceSkipped {
            source: 1,
            message: "manifest unreadable".to_string(),
        });
        record(DiagEvent::SourceSkipped {
            source: 2,
            message: "read timed out".to_string(),
        });
        record(DiagEvent::ChunkFetched { len: 4 });
        record(DiagEvent::AggregateFinished { rows: 6 });
        record(DiagEvent::AggregateFinished { rows: 3 });

        let snapshot = metrics::snapshot();
        assert_eq!(snapshot.elements_skipped, 2);
        assert_eq!(snapshot.chunks_fetched, 1);
        assert_eq!(snapshot.rows_yielded, 9);
    }
}
