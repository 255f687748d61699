use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<MetricsSnapshot> = const { RefCell::new(MetricsSnapshot::new()) };
}

///
/// MetricsSnapshot
/// Point-in-time copy of the thread-local diagnostics counters.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsSnapshot {
    pub elements_skipped: u64,
    pub chunks_fetched: u64,
    pub rows_yielded: u64,
}

impl MetricsSnapshot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements_skipped: 0,
            chunks_fetched: 0,
            rows_yielded: 0,
        }
    }
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut MetricsSnapshot) -> R) -> R {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

/// Copy the current counters.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    STATE.with(|cell| *cell.borrow())
}

/// Zero all counters on this thread.
pub fn reset() {
    STATE.with(|cell| *cell.borrow_mut() = MetricsSnapshot::new());
}
