//! Aggregate statistics over the filtered record set.
//!
//! One request produces one [`StatsBundle`]. Every sub-computation applies
//! the same [`FilterExpression`] as its leading restriction and then stages
//! its own transform → group → sort → limit chain. The sub-computations are
//! independent of one another, so they run concurrently; results are
//! identical to sequential execution. The first failure aborts the whole
//! bundle.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use futures::try_join;
use insight_map_analytics_models::{
    CityStat, CountryStat, HeatmapCell, LabelCount, StatsBundle, YearKey, YearStat,
};
use insight_map_datasource::{DataSource, Projection};
use insight_map_query::{FilterExpression, build_filter};
use insight_map_record_models::{Record, display_string, has_value, numeric};
use serde_json::Value;

use crate::AnalyticsError;
use crate::year::derived_year;

/// Row cap for the raw scatter sample.
const SCATTER_LIMIT: i64 = 5000;

/// Fields projected into scatter rows.
const SCATTER_FIELDS: &[&str] = &[
    "intensity",
    "likelihood",
    "relevance",
    "year",
    "country",
    "city",
];

const COUNTRY_LIMIT: usize = 20;
const TOPIC_LIMIT: usize = 50;
const CITY_LIMIT: usize = 30;

/// Computes the full stats bundle for one request.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if any sub-computation's query fails.
pub async fn compute_stats(
    source: &dyn DataSource,
    params: &BTreeMap<String, String>,
) -> Result<StatsBundle, AnalyticsError> {
    let filter = build_filter(params);

    let (year_stats, country_stats, topics_stats, region_stats, city_stats, scatter, heatmap_stats) =
        try_join!(
            year_series(source, &filter),
            country_ranking(source, &filter),
            topic_ranking(source, &filter),
            region_ranking(source, &filter),
            city_ranking(source, &filter),
            scatter_sample(source, &filter),
            heatmap(source, &filter),
        )?;

    Ok(StatsBundle {
        year_stats,
        country_stats,
        topics_stats,
        region_stats,
        city_stats,
        scatter,
        heatmap_stats,
    })
}

/// Running average over the values actually present in a group.
///
/// A group where no member carried the metric yields `None`, never zero.
#[derive(Debug, Default)]
struct Average {
    sum: f64,
    count: u32,
}

impl Average {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

async fn fetch_all(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<Record>, AnalyticsError> {
    Ok(source.find(filter, Projection::All, 0, 0).await?)
}

/// Group label for a record field: present, non-empty values only.
fn group_key(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .filter(|value| has_value(value))
        .map(display_string)
}

fn metric(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(numeric)
}

/// Descending count, with lexicographic group order preserved on ties by
/// the stable sort.
fn sort_by_count_desc<T>(rows: &mut [T], count: impl Fn(&T) -> u64) {
    rows.sort_by(|a, b| count(b).cmp(&count(a)));
}

async fn year_series(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<YearStat>, AnalyticsError> {
    #[derive(Default)]
    struct Group {
        count: u64,
        intensity: Average,
        likelihood: Average,
        relevance: Average,
    }

    let mut groups: BTreeMap<i64, Group> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        let Some(year) = derived_year(&record) else {
            continue;
        };
        let group = groups.entry(year).or_default();
        group.count += 1;
        group.intensity.push(metric(&record, "intensity"));
        group.likelihood.push(metric(&record, "likelihood"));
        group.relevance.push(metric(&record, "relevance"));
    }

    Ok(groups
        .into_iter()
        .map(|(year, group)| YearStat {
            id: YearKey { year },
            count: group.count,
            avg_intensity: group.intensity.value(),
            avg_likelihood: group.likelihood.value(),
            avg_relevance: group.relevance.value(),
        })
        .collect())
}

async fn country_ranking(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<CountryStat>, AnalyticsError> {
    #[derive(Default)]
    struct Group {
        count: u64,
        intensity: Average,
    }

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        let Some(country) = group_key(&record, "country") else {
            continue;
        };
        let group = groups.entry(country).or_default();
        group.count += 1;
        group.intensity.push(metric(&record, "intensity"));
    }

    let mut stats: Vec<CountryStat> = groups
        .into_iter()
        .map(|(id, group)| CountryStat {
            id,
            count: group.count,
            avg_intensity: group.intensity.value(),
        })
        .collect();
    sort_by_count_desc(&mut stats, |s| s.count);
    stats.truncate(COUNTRY_LIMIT);
    Ok(stats)
}

/// Topic memberships for one record: the `topics` array if it is one, else
/// the scalar `topic` as a one-element list. Null and empty entries are
/// dropped; a record with N topics contributes to N groups.
fn record_topics(record: &Record) -> Vec<String> {
    match record.get("topics") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|topic| !topic.is_empty())
            .map(ToString::to_string)
            .collect(),
        _ => record
            .get("topic")
            .and_then(Value::as_str)
            .filter(|topic| !topic.is_empty())
            .map(ToString::to_string)
            .into_iter()
            .collect(),
    }
}

async fn topic_ranking(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<LabelCount>, AnalyticsError> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        for topic in record_topics(&record) {
            *counts.entry(topic).or_default() += 1;
        }
    }

    let mut stats: Vec<LabelCount> = counts
        .into_iter()
        .map(|(id, count)| LabelCount { id, count })
        .collect();
    sort_by_count_desc(&mut stats, |s| s.count);
    stats.truncate(TOPIC_LIMIT);
    Ok(stats)
}

async fn region_ranking(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<LabelCount>, AnalyticsError> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        let Some(region) = group_key(&record, "region") else {
            continue;
        };
        *counts.entry(region).or_default() += 1;
    }

    let mut stats: Vec<LabelCount> = counts
        .into_iter()
        .map(|(id, count)| LabelCount { id, count })
        .collect();
    sort_by_count_desc(&mut stats, |s| s.count);
    Ok(stats)
}

async fn city_ranking(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<CityStat>, AnalyticsError> {
    #[derive(Default)]
    struct Group {
        count: u64,
        intensity: Average,
        likelihood: Average,
        relevance: Average,
    }

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        let Some(city) = group_key(&record, "city") else {
            continue;
        };
        let group = groups.entry(city).or_default();
        group.count += 1;
        group.intensity.push(metric(&record, "intensity"));
        group.likelihood.push(metric(&record, "likelihood"));
        group.relevance.push(metric(&record, "relevance"));
    }

    let mut stats: Vec<CityStat> = groups
        .into_iter()
        .map(|(id, group)| CityStat {
            id,
            avg_intensity: group.intensity.value(),
            avg_likelihood: group.likelihood.value(),
            avg_relevance: group.relevance.value(),
            count: group.count,
        })
        .collect();

    // Descending average intensity; groups with no average sort last.
    stats.sort_by(|a, b| {
        let a_avg = a.avg_intensity.unwrap_or(f64::NEG_INFINITY);
        let b_avg = b.avg_intensity.unwrap_or(f64::NEG_INFINITY);
        b_avg.partial_cmp(&a_avg).unwrap_or(Ordering::Equal)
    });
    stats.truncate(CITY_LIMIT);
    Ok(stats)
}

async fn heatmap(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<HeatmapCell>, AnalyticsError> {
    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for record in fetch_all(source, filter).await? {
        let Some(topic) = group_key(&record, "topic") else {
            continue;
        };
        let Some(region) = group_key(&record, "region") else {
            continue;
        };
        *counts.entry((topic, region)).or_default() += 1;
    }

    let mut cells: Vec<HeatmapCell> = counts
        .into_iter()
        .map(|((topic, region), count)| HeatmapCell {
            topic,
            region,
            count,
        })
        .collect();
    sort_by_count_desc(&mut cells, |c| c.count);
    Ok(cells)
}

async fn scatter_sample(
    source: &dyn DataSource,
    filter: &FilterExpression,
) -> Result<Vec<Record>, AnalyticsError> {
    Ok(source
        .find(filter, Projection::Fields(SCATTER_FIELDS), 0, SCATTER_LIMIT)
        .await?)
}
