use axum::{routing::get, Router};

use crate::{
    handlers::calendar::{
        get_calendar, get_calendar_for_year, get_next_race, get_race_by_round, update_calendar,
    },
    utils::state::AppState,
};

pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar", get(get_calendar))
        .route("/calendar/update", get(update_calendar))
        .route("/calendar/{year}", get(get_calendar_for_year))
        .route("/next-race", get(get_next_race))
        .route("/race/{round}", get(get_race_by_round))
}
