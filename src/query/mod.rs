//! # Query
//!
//! Lazy, chainable table requests over the fixture store.
//!
//! ## Invariants
//! - Nothing is read or written until the builder is resolved
//! - Resolution always suspends at least once, even with zero latency
//! - Filters combine with AND
//! - Only the last declared order takes effect
//! - `count` is the match count before pagination (reads) or the number of
//!   affected rows (writes)
//! - Errors surface in the envelope, never as panics

mod builder;
mod errors;
mod filter;
mod order;
mod response;
mod select;

pub use builder::{PageWindow, QueryBuilder};
pub use errors::{QueryError, QueryResult};
pub use filter::{Filter, FilterSet};
pub use order::{apply_orders, compare_values, OrderSpec};
pub use response::{Data, ResultEnvelope};
pub use select::{Columns, Embed, Projection};
