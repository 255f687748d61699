use derive_more::{Deref, IntoIterator};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// ResponseError
/// Errors related to interpreting a materialized response.
///

#[derive(Clone, Debug, ThisError)]
pub enum ResponseError {
    #[error("expected exactly one row, found 0")]
    NotFound,

    #[error("expected exactly one row, found {count}")]
    NotUnique { count: u32 },
}

///
/// Aggregated
/// Materialized aggregation result: records in aggregation output order.
///

#[derive(Clone, Debug, Deref, IntoIterator, Serialize)]
pub struct Aggregated<T>(pub Vec<T>);

impl<T> Aggregated<T> {
    //
    // Cardinality
    //

    /// Number of rows in the response, truncated to `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn count(&self) -> u32 {
        self.0.len() as u32
    }

    /// True when no rows were returned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    //
    // Exact cardinality helpers
    //

    /// Require exactly one row.
    pub fn one(mut self) -> Result<T, ResponseError> {
        match self.0.len() {
            0 => Err(ResponseError::NotFound),
            1 => Ok(self.0.remove(0)),
            _ => Err(ResponseError::NotUnique { count: self.count() }),
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}
