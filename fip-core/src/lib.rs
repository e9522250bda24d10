//! Core types shared by every `fip-*` crate.
//!
//! - [`period`]: the year-month grouping key used across all aggregates
//! - [`table`]: aggregate tables keyed by (period, dimension values)
//! - [`spatial`]: region boundaries and the boundary x period join result
//! - [`format`]: human-readable magnitudes for summary cards
//! - [`columns`]: column names of the raw datasets and stored tables
//! - [`config`]: serde configuration for data paths and dashboard rules

pub mod columns;
pub mod config;
pub mod error;
pub mod format;
pub mod period;
pub mod spatial;
pub mod table;

pub use error::TableError;
pub use period::Period;
pub use spatial::{Boundary, SpatialRow, SpatialTable};
pub use table::{AggregateRow, AggregateTable};
