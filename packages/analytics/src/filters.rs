//! Enumeration of usable filter values.

use std::collections::{BTreeMap, BTreeSet};

use insight_map_datasource::DataSource;
use insight_map_record_models::{display_string, has_value};
use serde_json::Value;

/// Fields whose distinct values are offered as filter options.
pub const FILTER_FIELDS: &[&str] = &[
    "year", "end_year", "topics", "topic", "sector", "region", "city", "country", "pestle",
    "source", "swot",
];

/// Collects the distinct filter options for every field.
///
/// Enumerates the full collection, never the currently filtered subset. A
/// failed distinct query degrades that one field to an empty list; other
/// fields are unaffected and the request still succeeds.
pub async fn filter_options(source: &dyn DataSource) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    for &field in FILTER_FIELDS {
        let options = match source.distinct(field).await {
            Ok(values) => clean_options(&values),
            Err(e) => {
                log::warn!("Distinct query failed for field '{field}': {e}");
                Vec::new()
            }
        };
        out.insert(field.to_string(), options);
    }
    out
}

/// Drops no-value entries, flattens list values, stringifies, dedupes, and
/// sorts lexicographically.
fn clean_options(values: &[Value]) -> Vec<String> {
    let mut options = BTreeSet::new();
    for value in values.iter().filter(|value| has_value(value)) {
        match value {
            Value::Array(items) => {
                for item in items.iter().filter(|item| has_value(item)) {
                    options.insert(display_string(item));
                }
            }
            other => {
                options.insert(display_string(other));
            }
        }
    }
    options.into_iter().collect()
}
