mod checkins;
mod events;
mod health;
mod persons;

use axum::routing::{get, post};
use axum::Router;

use crate::{hub, AppState};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:event_id/import", post(events::import_roster))
        .route("/events/:event_id/summary", get(events::summary))
        .route("/events/:event_id/persons", get(persons::list_persons))
        .route(
            "/events/:event_id/crew/:registration",
            get(persons::by_registration),
        )
        .route("/events/:event_id/checkins", post(checkins::check_in))
        .route("/events/:event_id/checkins/latest", get(checkins::latest))
        .route("/hub/summary", get(hub::summary_stream))
}
