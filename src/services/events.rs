use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::events::{self, EventFilter, NewEvent, UpdateEvent};
use crate::models::event::{Event, EventStatus, Visibility};
use crate::models::venue;
use crate::services::availability::{self, TimeRange};
use crate::utils::error::AppError;

// Placeholder values a draft is stored with until the organizer fills them in.
const DRAFT_DESCRIPTION: &str = "Draft event - description to be added";
const DRAFT_DURATION_HOURS: i64 = 2;

#[derive(Debug, Deserialize)]
pub struct CreateEventInput {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    /// All-day schedule: the event spans this whole calendar day in its
    /// stated timezone.
    pub date: Option<NaiveDate>,
    pub timezone: Option<String>,
    pub venue_id: Option<i32>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<Decimal>,
    pub visibility: Option<Visibility>,
    pub banner_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
    pub timezone: Option<String>,
    pub venue_id: Option<i32>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<Decimal>,
    pub visibility: Option<Visibility>,
    pub banner_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub async fn create(pool: &PgPool, input: CreateEventInput) -> Result<Event, AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::ValidationError("title is required".to_string()));
    }
    if let Some(venue_id) = input.venue_id {
        if venue::find(venue_id).is_none() {
            return Err(AppError::ValidationError(format!(
                "unknown venue: {}",
                venue_id
            )));
        }
    }

    let timezone = input.timezone.clone().unwrap_or_else(|| "UTC".to_string());
    let (start, end, all_day) = resolve_new_schedule(
        input.date,
        input.start_datetime,
        input.end_datetime,
        &timezone,
        input.publish,
        Utc::now(),
    )?;

    if input.publish {
        if input.description.as_deref().unwrap_or("").trim().is_empty() {
            return Err(AppError::ValidationError(
                "description is required to publish".to_string(),
            ));
        }
        if input.capacity.unwrap_or(0) < 1 {
            return Err(AppError::ValidationError(
                "capacity must be at least 1 to publish".to_string(),
            ));
        }
    }

    let new_event = NewEvent {
        organizer_id: input.organizer_id,
        title: input.title,
        description: input
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DRAFT_DESCRIPTION.to_string()),
        short_description: input.short_description,
        start_datetime: start,
        end_datetime: end,
        timezone,
        all_day,
        venue_id: input.venue_id,
        capacity: input.capacity.unwrap_or(0),
        ticket_price: input.ticket_price.unwrap_or(Decimal::ZERO),
        status: if input.publish {
            EventStatus::Published
        } else {
            EventStatus::Draft
        },
        visibility: input.visibility.unwrap_or(Visibility::Public),
        banner_image_url: input.banner_image_url,
        tags: input.tags,
    };

    Ok(events::insert(pool, &new_event).await?)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Event, AppError> {
    events::find(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", id)))
}

pub async fn list(pool: &PgPool, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
    Ok(events::list(pool, filter).await?)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: UpdateEventInput,
) -> Result<Event, AppError> {
    let existing = get(pool, id).await?;
    if existing.status == EventStatus::Cancelled {
        return Err(AppError::ValidationError(
            "cancelled events cannot be edited".to_string(),
        ));
    }

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::ValidationError("title cannot be empty".to_string()));
        }
    }
    if let Some(venue_id) = input.venue_id {
        if venue::find(venue_id).is_none() {
            return Err(AppError::ValidationError(format!(
                "unknown venue: {}",
                venue_id
            )));
        }
    }

    let timezone = input
        .timezone
        .clone()
        .unwrap_or_else(|| existing.timezone.clone());

    let (start, end, all_day) = if let Some(date) = input.date {
        let range = availability::all_day_range(date, &timezone)?;
        (Some(range.start), Some(range.end), Some(true))
    } else {
        // Validate the merged schedule even when only one bound changes.
        let merged_start = input.start_datetime.unwrap_or(existing.start_datetime);
        let merged_end = input.end_datetime.unwrap_or(existing.end_datetime);
        TimeRange::new(merged_start, merged_end)?;

        let rescheduled = input.start_datetime.is_some() || input.end_datetime.is_some();
        (
            input.start_datetime,
            input.end_datetime,
            rescheduled.then_some(false),
        )
    };

    let changes = UpdateEvent {
        title: input.title,
        description: input.description,
        short_description: input.short_description,
        start_datetime: start,
        end_datetime: end,
        timezone: input.timezone,
        all_day,
        venue_id: input.venue_id,
        capacity: input.capacity,
        ticket_price: input.ticket_price,
        visibility: input.visibility,
        banner_image_url: input.banner_image_url,
        tags: input.tags,
    };

    events::update(pool, id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", id)))
}

/// Take a draft live. Idempotent for already-published events.
pub async fn publish(pool: &PgPool, id: Uuid) -> Result<Event, AppError> {
    let event = get(pool, id).await?;

    match event.status {
        EventStatus::Published => Ok(event),
        EventStatus::Cancelled => Err(AppError::ValidationError(
            "cancelled events cannot be published".to_string(),
        )),
        EventStatus::Draft => {
            event
                .validate_for_publish()
                .map_err(AppError::ValidationError)?;

            events::mark_published(pool, id).await?.ok_or_else(|| {
                AppError::ValidationError("event can no longer be published".to_string())
            })
        }
    }
}

pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<Event, AppError> {
    events::mark_cancelled(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", id)))
}

/// Resolve the stored schedule for a new event.
///
/// Drafts without a schedule get the placeholder window (now, +2h); published
/// events must carry one. A date-only schedule expands to the full local day.
fn resolve_new_schedule(
    date: Option<NaiveDate>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    timezone: &str,
    publish: bool,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>, bool), AppError> {
    if let Some(date) = date {
        let range = availability::all_day_range(date, timezone)?;
        return Ok((range.start, range.end, true));
    }

    match (start, end) {
        (Some(start), Some(end)) => {
            let range = TimeRange::new(start, end)?;
            Ok((range.start, range.end, false))
        }
        (None, None) if !publish => Ok((
            now,
            now + Duration::hours(DRAFT_DURATION_HOURS),
            false,
        )),
        (None, None) => Err(AppError::ValidationError(
            "start and end times are required to publish".to_string(),
        )),
        _ => Err(AppError::ValidationError(
            "both start and end times must be provided".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::from_str(s).unwrap()
    }

    #[test]
    fn test_resolve_schedule_explicit_window() {
        let start = instant("2026-09-01T18:00:00Z");
        let end = instant("2026-09-01T22:00:00Z");
        let (s, e, all_day) =
            resolve_new_schedule(None, Some(start), Some(end), "UTC", true, Utc::now()).unwrap();
        assert_eq!((s, e, all_day), (start, end, false));
    }

    #[test]
    fn test_resolve_schedule_draft_defaults() {
        let now = instant("2026-09-01T12:00:00Z");
        let (s, e, all_day) = resolve_new_schedule(None, None, None, "UTC", false, now).unwrap();
        assert_eq!(s, now);
        assert_eq!(e - s, Duration::hours(DRAFT_DURATION_HOURS));
        assert!(!all_day);
    }

    #[test]
    fn test_resolve_schedule_publish_requires_window() {
        assert!(resolve_new_schedule(None, None, None, "UTC", true, Utc::now()).is_err());
    }

    #[test]
    fn test_resolve_schedule_rejects_half_window() {
        let start = instant("2026-09-01T18:00:00Z");
        assert!(resolve_new_schedule(None, Some(start), None, "UTC", false, Utc::now()).is_err());
    }

    #[test]
    fn test_resolve_schedule_all_day_spans_local_day() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let (s, e, all_day) =
            resolve_new_schedule(Some(date), None, None, "America/New_York", true, Utc::now())
                .unwrap();
        assert!(all_day);
        assert_eq!(s, instant("2026-01-15T05:00:00Z"));
        assert_eq!(e, instant("2026-01-16T05:00:00Z"));
    }

    #[test]
    fn test_resolve_schedule_rejects_inverted_window() {
        let start = instant("2026-09-01T22:00:00Z");
        let end = instant("2026-09-01T18:00:00Z");
        assert!(
            resolve_new_schedule(None, Some(start), Some(end), "UTC", false, Utc::now()).is_err()
        );
    }
}
