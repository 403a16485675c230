//! HTTP handler functions for the insight map API.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use insight_map_analytics::filters::filter_options;
use insight_map_analytics::records::fetch_records;
use insight_map_analytics::stats::compute_stats;

use crate::AppState;

/// `GET /data`
///
/// Returns raw records matching the filter parameters, paged by `limit`
/// and `skip`.
pub async fn data(
    state: web::Data<AppState>,
    params: web::Query<BTreeMap<String, String>>,
) -> HttpResponse {
    match fetch_records(state.source.as_ref(), &params).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => {
            log::error!("Failed to fetch records: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch records"
            }))
        }
    }
}

/// `GET /filters/`
///
/// Returns the distinct values usable as filter input, per field.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(filter_options(state.source.as_ref()).await)
}

/// `GET /stats/`
///
/// Returns the aggregate stats bundle for the given filter parameters.
pub async fn stats(
    state: web::Data<AppState>,
    params: web::Query<BTreeMap<String, String>>,
) -> HttpResponse {
    match compute_stats(state.source.as_ref(), &params).await {
        Ok(bundle) => HttpResponse::Ok().json(bundle),
        Err(e) => {
            log::error!("Failed to compute stats: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to compute stats"
            }))
        }
    }
}

/// Fallback for non-GET methods on the API resources.
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use insight_map_datasource::MemorySource;
    use serde_json::{Value, json};

    use super::*;
    use crate::configure_routes;

    fn test_state() -> web::Data<AppState> {
        let records = vec![
            json!({"_id": 1, "country": "India", "topic": "gas", "intensity": 6, "year": 2018})
                .as_object()
                .cloned()
                .unwrap(),
            json!({"_id": 2, "country": "USA", "topic": "oil", "intensity": 2, "year": 2017})
                .as_object()
                .cloned()
                .unwrap(),
        ];
        web::Data::new(AppState {
            source: Arc::new(MemorySource::new(records)),
        })
    }

    #[actix_web::test]
    async fn data_returns_records_without_ids() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get().uri("/data?country=India").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("_id").is_none());
        assert_eq!(rows[0]["country"], json!("India"));
    }

    #[actix_web::test]
    async fn stats_returns_the_full_bundle() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get().uri("/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        for key in [
            "year_stats",
            "country_stats",
            "topics_stats",
            "region_stats",
            "city_stats",
            "scatter",
            "heatmap_stats",
        ] {
            assert!(body.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(body["country_stats"][0]["_id"], json!("India"));
        assert_eq!(body["year_stats"][0]["_id"]["year"], json!(2017));
    }

    #[actix_web::test]
    async fn filters_enumerate_distinct_values() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get().uri("/filters/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["country"], json!(["India", "USA"]));
        assert_eq!(body["year"], json!(["2017", "2018"]));
    }

    #[actix_web::test]
    async fn unknown_parameters_are_ignored() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get()
            .uri("/data?flavor=grape&country=USA")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn non_get_methods_are_rejected() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure_routes))
                .await;

        let req = test::TestRequest::post().uri("/data").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::METHOD_NOT_ALLOWED);
    }
}
