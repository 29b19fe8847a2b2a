use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
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
    pub current_attendance: i32,
    pub ticket_price: Decimal,
    pub status: EventStatus,
    pub visibility: Visibility,
    pub banner_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn remaining_capacity(&self) -> i32 {
        (self.capacity - self.current_attendance).max(0)
    }

    /// Whether paid tickets can currently be sold for this event.
    pub fn tickets_on_sale(&self) -> bool {
        self.status == EventStatus::Published && self.ticket_price > Decimal::ZERO
    }

    /// Fields a draft must have filled before it can go live.
    pub fn validate_for_publish(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        if self.capacity < 1 {
            return Err("capacity must be at least 1".to_string());
        }
        if self.end_datetime <= self.start_datetime {
            return Err("end time must be after start time".to_string());
        }
        Ok(())
    }
}
