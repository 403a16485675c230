#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API response types for the insight stats bundle.
//!
//! These types are serialized to JSON for the REST API. Grouped rows keep
//! the `_id` group key and camelCase average fields the dashboard frontend
//! already consumes; an average is `null` when a group had no value for
//! that metric.

use insight_map_record_models::Record;
use serde::{Deserialize, Serialize};

/// Group key for a single year bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearKey {
    /// Resolved effective year.
    pub year: i64,
}

/// Per-year record count and metric averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearStat {
    /// Year group key.
    #[serde(rename = "_id")]
    pub id: YearKey,
    /// Records resolved to this year.
    pub count: u64,
    /// Average intensity, if any group member had one.
    pub avg_intensity: Option<f64>,
    /// Average likelihood, if any group member had one.
    pub avg_likelihood: Option<f64>,
    /// Average relevance, if any group member had one.
    pub avg_relevance: Option<f64>,
}

/// Per-country record count and average intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryStat {
    /// Country name.
    #[serde(rename = "_id")]
    pub id: String,
    /// Records for this country.
    pub count: u64,
    /// Average intensity, if any group member had one.
    pub avg_intensity: Option<f64>,
}

/// Record count for a single group label (topic or region).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    /// Group label.
    #[serde(rename = "_id")]
    pub id: String,
    /// Records in the group.
    pub count: u64,
}

/// Per-city record count and metric averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStat {
    /// City name.
    #[serde(rename = "_id")]
    pub id: String,
    /// Average intensity, if any group member had one.
    pub avg_intensity: Option<f64>,
    /// Average likelihood, if any group member had one.
    pub avg_likelihood: Option<f64>,
    /// Average relevance, if any group member had one.
    pub avg_relevance: Option<f64>,
    /// Records for this city.
    pub count: u64,
}

/// Record count for one topic×region pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    /// Scalar topic value.
    pub topic: String,
    /// Region name.
    pub region: String,
    /// Records carrying both values.
    pub count: u64,
}

/// The full aggregate bundle returned by the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    /// Year series, ascending by year.
    pub year_stats: Vec<YearStat>,
    /// Country ranking, descending by count, top 20.
    pub country_stats: Vec<CountryStat>,
    /// Topic ranking, descending by count, top 50.
    pub topics_stats: Vec<LabelCount>,
    /// Region ranking, descending by count.
    pub region_stats: Vec<LabelCount>,
    /// City ranking, descending by average intensity, top 30.
    pub city_stats: Vec<CityStat>,
    /// Raw point-cloud sample, at most 5000 rows.
    pub scatter: Vec<Record>,
    /// Topic×region co-occurrence counts, descending by count.
    pub heatmap_stats: Vec<HeatmapCell>,
}
