use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::events::EventFilter;
use crate::models::event::{EventStatus, Visibility};
use crate::services::events::{self, CreateEventInput, UpdateEventInput};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<EventStatus>,
    pub organizer_id: Option<Uuid>,
    pub venue_id: Option<i32>,
    /// "upcoming" or "past"
    pub time: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let upcoming = match query.time.as_deref() {
        Some("upcoming") => Some(true),
        Some("past") => Some(false),
        Some(other) => {
            return Err(AppError::ValidationError(format!(
                "unknown time filter: {}",
                other
            )))
        }
        None => None,
    };

    // Public listings show published public events; an organizer filter
    // switches to that organizer's view, drafts included.
    let browsing = query.organizer_id.is_none();
    let filter = EventFilter {
        status: query
            .status
            .or(browsing.then_some(EventStatus::Published)),
        organizer_id: query.organizer_id,
        venue_id: query.venue_id,
        visibility: browsing.then_some(Visibility::Public),
        upcoming,
    };

    let events = events::list(&state.pool, &filter).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::get(&state.pool, id).await?;
    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> Result<Response, AppError> {
    let event = events::create(&state.pool, input).await?;
    Ok(created(event, "Event created"))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEventInput>,
) -> Result<Response, AppError> {
    let event = events::update(&state.pool, id, input).await?;
    Ok(success(event, "Event updated"))
}

pub async fn publish_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::publish(&state.pool, id).await?;
    Ok(success(event, "Event published"))
}

pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::cancel(&state.pool, id).await?;
    Ok(success(event, "Event cancelled"))
}
