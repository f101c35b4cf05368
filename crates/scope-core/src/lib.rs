//! Core types for RTU Log Scope.
//!
//! Domain models, timestamp and value normalization, error taxonomy,
//! number formatting and CLI settings shared by the other scope crates.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
