use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use http::StatusCode;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::error::Error;
use crate::utils::state::AppState;

pub async fn index() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "message": "F1 Dashboard API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": [
                "/calendar",
                "/calendar/{year}",
                "/calendar/update",
                "/next-race",
                "/race/{round}",
                "/health",
            ],
        })),
    )
        .into_response()
}

pub async fn get_calendar(State(state): State<AppState>) -> impl IntoResponse {
    let calendar = state
        .store
        .get_calendar(state.config.default_year, false)
        .await;
    (StatusCode::OK, Json(calendar)).into_response()
}

pub async fn get_calendar_for_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> impl IntoResponse {
    info!("fetching calendar for year {year}");
    let calendar = state.store.get_calendar(year, false).await;
    (StatusCode::OK, Json(calendar)).into_response()
}

pub async fn update_calendar(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let year = params
        .get("year")
        .and_then(|year| year.parse::<i32>().ok())
        .unwrap_or(state.config.default_year);
    info!("forcing calendar refresh for {year}");
    let calendar = state.store.get_calendar(year, true).await;
    (StatusCode::OK, Json(calendar)).into_response()
}

pub async fn get_next_race(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let race = state.store.next_race(state.config.default_year).await?;

    if race.demo_mode.unwrap_or(false) {
        info!("returning demo race (no actual upcoming races found)");
        let mut body = serde_json::to_value(&race).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut body {
            map.insert(
                "demo_notice".to_string(),
                Value::String(
                    "This is a demonstration race as there are no upcoming races in the calendar"
                        .to_string(),
                ),
            );
        }
        return Ok((StatusCode::OK, Json(body)).into_response());
    }

    Ok((StatusCode::OK, Json(race)).into_response())
}

pub async fn get_race_by_round(
    State(state): State<AppState>,
    Path(round): Path<u32>,
) -> impl IntoResponse {
    match state
        .store
        .race_by_round(round, state.config.default_year)
        .await
    {
        Ok(race) => (StatusCode::OK, Json(race)).into_response(),
        Err(err) => {
            warn!("race lookup failed: {err}");
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Race not found", "message": err.to_string()})),
            )
                .into_response()
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.config.data_dir,
        })),
    )
        .into_response()
}
