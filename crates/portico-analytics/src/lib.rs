//! Portico — event tracking and analytics aggregation.
//!
//! The [`store::AnalyticsStore`] owns an append-only in-memory event log and
//! per-business metric accumulators. Dashboard and platform queries are pure
//! read-side computations over the raw log; the accumulators are cheap
//! always-on counters and are never consulted by window queries.

pub mod dashboard;
pub mod platform;
pub mod store;

pub use store::{AnalyticsStore, BusinessMetrics};
