use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use muster_core::{parse_roster_csv, Event, EventId, ImportReport, RosterRow, Summary};
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct CreatedEvent {
    pub id: EventId,
}

pub async fn create_event(State(state): State<AppState>) -> Result<Json<CreatedEvent>, ApiError> {
    let id = state.service.create_event()?;
    Ok(Json(CreatedEvent { id }))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.service.list_events()?))
}

/// Accepts a JSON array of rows, or a CSV export when the body is sent as
/// `text/csv` or `text/plain`.
pub async fn import_roster(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    let rows = if is_csv(&headers) {
        let text = std::str::from_utf8(&body)
            .map_err(|_| ApiError::BadRequest("roster csv must be UTF-8".to_string()))?;
        parse_roster_csv(text)?
    } else {
        serde_json::from_slice::<Vec<RosterRow>>(&body)?
    };

    Ok(Json(state.service.import_roster(event_id, &rows)?))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(state.service.compute_summary(event_id)?))
}

fn is_csv(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/csv" || mime == "text/plain"
}
