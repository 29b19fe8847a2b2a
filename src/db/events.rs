use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::event::{Event, EventStatus, Visibility};

pub struct NewEvent {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub timezone: String,
    pub all_day: bool,
    pub venue_id: Option<i32>,
    pub capacity: i32,
    pub ticket_price: Decimal,
    pub status: EventStatus,
    pub visibility: Visibility,
    pub banner_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Default)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub all_day: Option<bool>,
    pub venue_id: Option<i32>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<Decimal>,
    pub visibility: Option<Visibility>,
    pub banner_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub organizer_id: Option<Uuid>,
    pub venue_id: Option<i32>,
    pub visibility: Option<Visibility>,
    /// Some(true) = upcoming only, Some(false) = past only.
    pub upcoming: Option<bool>,
}

/// Conflict-set entry returned by the availability query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConflictingEvent {
    pub id: Uuid,
    pub title: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

pub async fn insert(pool: &PgPool, new: &NewEvent) -> Result<Event, sqlx::Error> {
    let published_at = match new.status {
        EventStatus::Published => Some(Utc::now()),
        _ => None,
    };

    sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (
            organizer_id, title, description, short_description,
            start_datetime, end_datetime, timezone, all_day, venue_id,
            capacity, ticket_price, status, visibility, banner_image_url,
            tags, published_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(new.organizer_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.short_description)
    .bind(new.start_datetime)
    .bind(new.end_datetime)
    .bind(&new.timezone)
    .bind(new.all_day)
    .bind(new.venue_id)
    .bind(new.capacity)
    .bind(new.ticket_price)
    .bind(new.status)
    .bind(new.visibility)
    .bind(&new.banner_image_url)
    .bind(&new.tags)
    .bind(published_at)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, filter: &EventFilter) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT * FROM events
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR organizer_id = $2)
          AND ($3::int IS NULL OR venue_id = $3)
          AND ($4::text IS NULL OR visibility = $4)
          AND ($5::bool IS NULL
               OR CASE WHEN $5 THEN start_datetime >= now()
                       ELSE end_datetime < now() END)
        ORDER BY start_datetime ASC
        "#,
    )
    .bind(filter.status)
    .bind(filter.organizer_id)
    .bind(filter.venue_id)
    .bind(filter.visibility)
    .bind(filter.upcoming)
    .fetch_all(pool)
    .await
}

/// Partial update; absent fields keep their stored values.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UpdateEvent,
) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        UPDATE events SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            short_description = COALESCE($4, short_description),
            start_datetime = COALESCE($5, start_datetime),
            end_datetime = COALESCE($6, end_datetime),
            timezone = COALESCE($7, timezone),
            all_day = COALESCE($8, all_day),
            venue_id = COALESCE($9, venue_id),
            capacity = COALESCE($10, capacity),
            ticket_price = COALESCE($11, ticket_price),
            visibility = COALESCE($12, visibility),
            banner_image_url = COALESCE($13, banner_image_url),
            tags = COALESCE($14, tags),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(&changes.short_description)
    .bind(changes.start_datetime)
    .bind(changes.end_datetime)
    .bind(&changes.timezone)
    .bind(changes.all_day)
    .bind(changes.venue_id)
    .bind(changes.capacity)
    .bind(changes.ticket_price)
    .bind(changes.visibility)
    .bind(&changes.banner_image_url)
    .bind(&changes.tags)
    .fetch_optional(pool)
    .await
}

/// Flip a draft live. Returns None when the event does not exist or is not a
/// draft; the caller validates required fields first.
pub async fn mark_published(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET status = 'published', published_at = now(), updated_at = now()
        WHERE id = $1 AND status = 'draft'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn mark_cancelled(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET status = 'cancelled', updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Non-cancelled events at a venue whose range overlaps the proposed one.
///
/// Half-open semantics: touching endpoints do not conflict. The exclude id
/// removes the event being edited from its own conflict set.
pub async fn conflicts_at_venue(
    pool: &PgPool,
    venue_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_event_id: Option<Uuid>,
) -> Result<Vec<ConflictingEvent>, sqlx::Error> {
    sqlx::query_as::<_, ConflictingEvent>(
        r#"
        SELECT id, title, start_datetime, end_datetime
        FROM events
        WHERE venue_id = $1
          AND status <> 'cancelled'
          AND start_datetime < $3
          AND end_datetime > $2
          AND ($4::uuid IS NULL OR id <> $4)
        ORDER BY start_datetime ASC
        "#,
    )
    .bind(venue_id)
    .bind(start)
    .bind(end)
    .bind(exclude_event_id)
    .fetch_all(pool)
    .await
}

/// Capacity-guarded attendance increment. Returns false when the purchase
/// would push attendance past capacity.
pub async fn try_increment_attendance(
    conn: &mut PgConnection,
    event_id: Uuid,
    quantity: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE events
        SET current_attendance = current_attendance + $2, updated_at = now()
        WHERE id = $1 AND current_attendance + $2 <= capacity
        "#,
    )
    .bind(event_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Unconditional increment, used once the payment is already captured and the
/// guarded update refused. The resulting oversell is the caller's to log.
pub async fn force_increment_attendance(
    conn: &mut PgConnection,
    event_id: Uuid,
    quantity: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE events
        SET current_attendance = current_attendance + $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(())
}
