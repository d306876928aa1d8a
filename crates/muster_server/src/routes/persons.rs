use axum::extract::{Path, State};
use axum::Json;
use muster_core::{EventId, Person};

use crate::error::ApiError;
use crate::AppState;

pub async fn list_persons(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.service.list_persons(event_id)?))
}

pub async fn by_registration(
    State(state): State<AppState>,
    Path((event_id, registration)): Path<(EventId, String)>,
) -> Result<Json<Person>, ApiError> {
    state
        .service
        .find_by_registration(event_id, &registration)?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "no crew member with registration `{registration}` in event {event_id}"
            ))
        })
}
