#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Read-side analytics engine over the insight record collection.
//!
//! Three operations back the public API: a raw filtered fetch
//! ([`records::fetch_records`]), enumeration of usable filter values
//! ([`filters::filter_options`]), and the aggregate stats bundle
//! ([`stats::compute_stats`]). All of them go through the injected
//! [`insight_map_datasource::DataSource`] handle and share the filter
//! semantics of [`insight_map_query`].

pub mod filters;
pub mod records;
pub mod stats;
pub mod year;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Data source operation failed.
    #[error("Data source error: {0}")]
    Source(#[from] insight_map_datasource::SourceError),
}
