use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use muster_core::{CheckinRequest, EventId, Person};
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct CheckinStatus {
    pub status: &'static str,
}

pub async fn check_in(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    payload: Result<Json<CheckinRequest>, JsonRejection>,
) -> Result<Json<CheckinStatus>, ApiError> {
    let Json(request) = payload?;
    state.service.mark_present(event_id, &request)?;
    Ok(Json(CheckinStatus { status: "ok" }))
}

/// Most recent person marked present, or `null`.
pub async fn latest(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Option<Person>>, ApiError> {
    Ok(Json(state.service.latest_checkin(event_id)?))
}
