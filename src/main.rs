use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use frc_scout_backend::api;
use frc_scout_backend::config::Config;
use frc_scout_backend::metrics;
use frc_scout_backend::source::DataSource;
use frc_scout_backend::store::EventStore;

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "frc-scout-backend" }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    metrics::register_metrics();

    let config = Config::load();
    let source = DataSource::from_location(&config.data_source, config.fetch_timeout)
        .expect("Failed to initialize data source");
    tracing::info!(source = %source.describe(), "Serving event data");

    let store = Arc::new(EventStore::new(source));

    if !config.preload_events.is_empty() {
        let store = store.clone();
        let slugs = config.preload_events.clone();
        tokio::spawn(async move {
            let loaded = store.preload(&slugs).await;
            tracing::info!(loaded, requested = slugs.len(), "Preloaded events");
        });
    }

    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(api::router(store, config.asset_prefix.clone()))
        .layer(CorsLayer::permissive());

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "Serving dashboard files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Scouting backend listening on {addr}");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
