//! Diagnostics for the aggregation engine.
//!
//! Skipped elements are silent at the API surface; the sink boundary is the
//! only place they become visible.

pub mod metrics;
pub mod sink;

pub use metrics::MetricsSnapshot;
pub use sink::{DiagEvent, DiagSink, record, with_sink};
