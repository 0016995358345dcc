//! Dashboard aggregation engine: record store, range filtering, weighted
//! aggregation, time bucketing, period comparison, and breakdowns.
//!
//! Every function here is a pure transformation over an immutable
//! [`store::RecordStore`]; recomputation is the only update path.

pub mod aggregate;
pub mod breakdown;
pub mod bucket;
pub mod compare;
pub mod dashboard;
pub mod filter;
pub mod granularity;
pub mod store;

pub use aggregate::Aggregate;
pub use bucket::TimeBucket;
pub use compare::PeriodDelta;
pub use dashboard::{DashboardQuery, DashboardSnapshot, MetricSnapshot};
pub use granularity::Granularity;
pub use store::RecordStore;
