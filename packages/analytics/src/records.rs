//! Raw filtered record fetch.

use std::collections::BTreeMap;

use insight_map_datasource::{DataSource, Projection};
use insight_map_query::{build_filter, parse};
use insight_map_record_models::Record;

use crate::AnalyticsError;

/// Fetches records matching the request's filter parameters.
///
/// `limit` defaults to 100 and caps at 2000; `skip` defaults to 0 and is
/// passed through as given. Skip applies before limit. Ordering is
/// collection-native; no sort is applied.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the underlying query fails.
pub async fn fetch_records(
    source: &dyn DataSource,
    params: &BTreeMap<String, String>,
) -> Result<Vec<Record>, AnalyticsError> {
    let filter = build_filter(params);
    let limit = parse::limit(params.get("limit").map(String::as_str));
    let skip = parse::skip(params.get("skip").map(String::as_str));

    Ok(source.find(&filter, Projection::All, skip, limit).await?)
}
