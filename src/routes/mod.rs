pub mod calendar;

use axum::{response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde_json::json;
use std::{error::Error, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::{
    handlers::calendar::{health, index},
    routes::calendar::calendar_routes,
    utils::{
        config::Config, provider::HttpScheduleProvider, state::AppState, store::CalendarStore,
    },
};

pub async fn make_app() -> Result<Router, Box<dyn Error>> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target(env!("CARGO_PKG_NAME").replace('-', "_"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();

    info!("Initializing application...");
    let config = Config::init();
    info!("Configuration loaded successfully");

    let provider = HttpScheduleProvider::new(&config.schedule_api_url);
    let store = Arc::new(CalendarStore::new(
        config.data_dir.as_str(),
        Box::new(provider),
    ));
    info!("Calendar store initialized at {}", config.data_dir);

    let state = AppState { config, store };

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(calendar_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);
    info!("Application initialized successfully");

    Ok(app)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response()
}
