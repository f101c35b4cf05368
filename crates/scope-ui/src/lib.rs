//! Terminal UI layer for RTU Log Scope.
//!
//! Provides themes, the measurement list, the time chart and the statistics
//! table, plus the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod stats_view;
pub mod themes;

pub use scope_core as core;
