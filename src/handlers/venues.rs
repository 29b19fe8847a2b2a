use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::venue;
use crate::services::availability::{self, TimeRange};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_venues() -> Response {
    success(venue::all(), "Venues retrieved")
}

pub async fn get_venue(Path(id): Path<i32>) -> Result<Response, AppError> {
    let venue =
        venue::find(id).ok_or_else(|| AppError::NotFound(format!("Venue '{}' not found", id)))?;
    Ok(success(venue, "Venue retrieved"))
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude_event_id: Option<Uuid>,
}

pub async fn venue_availability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Response, AppError> {
    let range = TimeRange::new(query.start, query.end)?;
    let result =
        availability::check_venue(&state.pool, id, range, query.exclude_event_id).await?;
    Ok(success(result, "Availability checked"))
}

pub async fn batch_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Response, AppError> {
    let range = TimeRange::new(query.start, query.end)?;
    let results =
        availability::check_all_venues(&state.pool, range, query.exclude_event_id).await;
    Ok(success(results, "Availability checked"))
}
