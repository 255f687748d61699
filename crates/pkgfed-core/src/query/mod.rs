//! Query descriptors consumed by the aggregation pipeline: ordering chains
//! and snapshot-bound filters.

pub mod filter;
pub mod order;

pub use filter::{FilterSpec, ParamTable};
pub use order::{OrderDirection, OrderSpec};
