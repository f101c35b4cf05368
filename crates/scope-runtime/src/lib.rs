//! Runtime layer for RTU Log Scope.
//!
//! Hosts the [`pipeline::LogScope`] facade that front-ends loading, merging
//! and selection for the UI and the non-interactive outputs.

pub mod pipeline;

pub use scope_core as core;
pub use scope_data as data;
