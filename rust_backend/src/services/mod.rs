//! Service layer between the presentation layer and the combination core.
//!
//! [`session::Session`] holds the outcome of the last successful request;
//! [`summary`] computes the statistics shown next to the combined table.

pub mod session;
pub mod summary;

pub use session::Session;
pub use summary::{summarize, MetricTotal, MissingCount, NumericSummary, TableSummary};
