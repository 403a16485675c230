#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the insight dashboard.
//!
//! Serves the read-only analytics REST API over the insight record
//! collection: raw filtered rows (`/data`), the universe of filter options
//! (`/filters/`), and the aggregate stats bundle (`/stats/`). The record
//! collection is loaded from a JSON dump at startup and held in memory; all
//! components receive the collection handle by injection.

mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use insight_map_datasource::{DataSource, MemorySource};

/// Shared application state.
pub struct AppState {
    /// Record collection handle, injected into every operation.
    pub source: Arc<dyn DataSource>,
}

/// Registers the API resources.
///
/// Each resource serves GET and answers anything else with 405.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/data")
            .route(web::get().to(handlers::data))
            .default_service(web::route().to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/filters/")
            .route(web::get().to(handlers::filters))
            .default_service(web::route().to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/stats/")
            .route(web::get().to(handlers::stats))
            .default_service(web::route().to(handlers::method_not_allowed)),
    );
}

/// Starts the insight map API server.
///
/// Loads the record collection from `DATA_PATH` (default
/// `data/records.json`), then serves the API on `BIND_ADDR:PORT`. This is a
/// regular async function — the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the record data file cannot be loaded.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let data_path =
        std::env::var("DATA_PATH").unwrap_or_else(|_| "data/records.json".to_string());
    log::info!("Loading records from {data_path}...");
    let source = MemorySource::from_json_file(Path::new(&data_path))
        .expect("Failed to load record data file");
    log::info!("Serving {} records", source.len());

    let state = web::Data::new(AppState {
        source: Arc::new(source),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
