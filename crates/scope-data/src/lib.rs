//! Data ingestion layer for RTU Log Scope.
//!
//! Reads delimited and NDJSON log files into [`table::RawTable`]s, merges
//! several sources into one time-ordered table and derives plot series and
//! statistics for the selected measurements.

pub mod aggregator;
pub mod delimited;
pub mod merger;
pub mod sources;
pub mod structured;
pub mod table;

pub use scope_core as core;
