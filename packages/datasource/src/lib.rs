#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Document-store access seam for insight records.
//!
//! [`DataSource`] is the only path from the read API to record storage. The
//! handle is constructed once at startup and injected into every component,
//! which keeps the rest of the system free of ambient state and lets tests
//! substitute fixtures or failing doubles. [`MemorySource`] is the shipped
//! implementation, seeded from a JSON dump of the collection.

use std::path::Path;

use async_trait::async_trait;
use insight_map_query::FilterExpression;
use insight_map_record_models::{ID_FIELD, Record};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading the record collection.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data file is not valid JSON.
    #[error("Malformed data file: {0}")]
    Json(#[from] serde_json::Error),

    /// The data file parsed, but not to an array of records.
    #[error("Data file must contain a JSON array of records")]
    NotAnArray,

    /// A query against the collection failed.
    #[error("Query failed: {message}")]
    Query {
        /// Description of what went wrong.
        message: String,
    },
}

/// Field projection applied by [`DataSource::find`].
///
/// The internal identifier is excluded either way.
#[derive(Debug, Clone, Copy, Default)]
pub enum Projection {
    /// Every field except the internal identifier.
    #[default]
    All,
    /// Only the named fields, in the given order.
    Fields(&'static [&'static str]),
}

/// Read-only handle to the record collection.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches records matching `filter` in collection order.
    ///
    /// `skip` applies before `limit`; a non-positive `limit` disables the
    /// cap. The internal identifier never appears in the output.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the underlying query fails.
    async fn find(
        &self,
        filter: &FilterExpression,
        projection: Projection,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Record>, SourceError>;

    /// Returns the distinct values of `field` across the whole collection.
    ///
    /// Array-valued fields contribute their elements rather than the array
    /// itself; explicit `null` values are included and left for the caller
    /// to drop.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the underlying query fails.
    async fn distinct(&self, field: &str) -> Result<Vec<Value>, SourceError>;
}

/// In-memory record collection.
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Creates a source over the given records.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Loads a collection from a JSON file containing an array of objects.
    ///
    /// Non-object entries are skipped with a warning so one bad row cannot
    /// block startup.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read, is not valid
    /// JSON, or is not a JSON array.
    pub fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&text)?;
        let Value::Array(entries) = parsed else {
            return Err(SourceError::NotAnArray);
        };

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::Object(record) => records.push(record),
                other => log::warn!("Skipping non-object entry in data file: {other}"),
            }
        }

        log::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    /// Number of records in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn project(record: &Record, projection: Projection) -> Record {
    match projection {
        Projection::All => record
            .iter()
            .filter(|(key, _)| key.as_str() != ID_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        Projection::Fields(fields) => fields
            .iter()
            .filter_map(|&field| {
                record
                    .get(field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect(),
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn find(
        &self,
        filter: &FilterExpression,
        projection: Projection,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Record>, SourceError> {
        let skip = usize::try_from(skip).unwrap_or(0);
        let matching = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .skip(skip);

        let rows = if limit > 0 {
            let cap = usize::try_from(limit).unwrap_or(usize::MAX);
            matching
                .take(cap)
                .map(|record| project(record, projection))
                .collect()
        } else {
            matching.map(|record| project(record, projection)).collect()
        };

        Ok(rows)
    }

    async fn distinct(&self, field: &str) -> Result<Vec<Value>, SourceError> {
        let mut seen: Vec<Value> = Vec::new();
        for record in &self.records {
            let Some(value) = record.get(field) else {
                continue;
            };
            match value {
                Value::Array(items) => {
                    for item in items {
                        if !seen.contains(item) {
                            seen.push(item.clone());
                        }
                    }
                }
                other => {
                    if !seen.contains(other) {
                        seen.push(other.clone());
                    }
                }
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use insight_map_query::build_filter;
    use serde_json::json;

    use super::*;

    fn fixture() -> MemorySource {
        let records = [
            json!({"_id": "a", "country": "India", "intensity": 6, "topics": ["gas", "oil"]}),
            json!({"_id": "b", "country": "USA", "intensity": 2, "topics": ["gas"]}),
            json!({"_id": "c", "country": "India", "intensity": 9, "topic": "war"}),
            json!({"_id": "d", "intensity": 1}),
        ]
        .into_iter()
        .map(|value| value.as_object().cloned().unwrap())
        .collect();
        MemorySource::new(records)
    }

    fn empty_filter() -> FilterExpression {
        build_filter(&BTreeMap::new())
    }

    #[tokio::test]
    async fn find_strips_internal_id() {
        let rows = fixture()
            .find(&empty_filter(), Projection::All, 0, 0)
            .await
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| !row.contains_key(ID_FIELD)));
    }

    #[tokio::test]
    async fn find_applies_filter() {
        let params = [("country".to_string(), "India".to_string())].into();
        let rows = fixture()
            .find(&build_filter(&params), Projection::All, 0, 0)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn skip_applies_before_limit() {
        let rows = fixture()
            .find(&empty_filter(), Projection::All, 1, 2)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("country"), Some(&json!("USA")));
    }

    #[tokio::test]
    async fn negative_skip_is_harmless() {
        let rows = fixture()
            .find(&empty_filter(), Projection::All, -5, 0)
            .await
            .unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[tokio::test]
    async fn projection_keeps_only_named_fields() {
        let rows = fixture()
            .find(&empty_filter(), Projection::Fields(&["country", "intensity"]), 0, 1)
            .await
            .unwrap();
        assert_eq!(rows[0].len(), 2);
        assert!(rows[0].contains_key("country"));
        assert!(!rows[0].contains_key("topics"));
    }

    #[tokio::test]
    async fn distinct_flattens_array_fields() {
        let values = fixture().distinct("topics").await.unwrap();
        assert_eq!(values, vec![json!("gas"), json!("oil")]);
    }

    #[tokio::test]
    async fn loads_records_from_json_file() {
        let path = std::env::temp_dir().join("insight_map_datasource_test.json");
        std::fs::write(&path, r#"[{"country": "India"}, 42]"#).unwrap();

        let source = MemorySource::from_json_file(&path).unwrap();
        assert_eq!(source.len(), 1);

        let _ = std::fs::remove_file(&path);
    }
}
