use std::fmt;
use thiserror::Error as ThisError;

///
/// SourceError
///
/// Structured failure raised while producing one element from one source.
/// Display intentionally surfaces the message alone so a propagated failure
/// reads exactly as the source raised it.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct SourceError {
    pub class: SourceErrorClass,
    pub message: String,
}

impl SourceError {
    pub fn new(class: SourceErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    /// Construct an io-class source error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SourceErrorClass::Io, message)
    }

    /// Construct a decode-class source error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(SourceErrorClass::Decode, message)
    }

    /// Construct an unavailable-class source error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorClass::Unavailable, message)
    }

    /// Construct an unclassified source error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(SourceErrorClass::Other, message)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {}", self.class, self.message)
    }
}

///
/// SourceErrorClass
/// Internal taxonomy for per-element source failures.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceErrorClass {
    Io,
    Decode,
    Unavailable,
    Other,
}

impl fmt::Display for SourceErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Io => "io",
            Self::Decode => "decode",
            Self::Unavailable => "unavailable",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

///
/// FailureRecord
/// One recovered per-element failure, tagged with the failing source's
/// position in the aggregation list.
///

#[derive(Clone, Debug, ThisError)]
#[error("source {index}: {error}")]
pub struct FailureRecord {
    pub index: usize,
    pub error: SourceError,
}

impl FailureRecord {
    #[must_use]
    pub const fn new(index: usize, error: SourceError) -> Self {
        Self { index, error }
    }
}

///
/// AggregateError
///
/// Failure surface of a federated aggregation. `Source` re-raises one
/// source's error verbatim; `Sources` carries every recovered failure so
/// callers can judge whether the partial result is usable.
///

#[derive(Clone, Debug, ThisError)]
pub enum AggregateError {
    #[error(transparent)]
    Source(SourceError),

    #[error("aggregation failed for {} source element(s): {}", .0.len(), join_records(.0))]
    Sources(Vec<FailureRecord>),
}

impl AggregateError {
    /// All failure records carried by this error, in recording order. A
    /// propagated `Source` failure is re-raised verbatim and carries no
    /// positional record; use [`Self::source_error`] to reach it.
    #[must_use]
    pub fn records(&self) -> Vec<FailureRecord> {
        match self {
            Self::Source(_) => Vec::new(),
            Self::Sources(records) => records.clone(),
        }
    }

    /// The propagated failure, when this error re-raises exactly one.
    #[must_use]
    pub const fn source_error(&self) -> Option<&SourceError> {
        match self {
            Self::Source(err) => Some(err),
            Self::Sources(_) => None,
        }
    }
}

fn join_records(records: &[FailureRecord]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

///
/// QueryError
/// Caller-facing failures raised by the facade and draining entry points.
///

#[derive(Clone, Debug, ThisError)]
pub enum QueryError {
    /// Merge-style access requires at least one ordering key. Raised eagerly
    /// by the facade; treated as a caller programming error.
    #[error("merge aggregation requires at least one ordering key")]
    UnorderedAggregation,

    /// Chunked fetching needs a chunk size of at least 1.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}
