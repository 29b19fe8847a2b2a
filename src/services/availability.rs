use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::db::events::{self, ConflictingEvent};
use crate::models::venue;
use crate::utils::error::AppError;

/// A proposed booking window. Construction enforces start < end.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::ValidationError(
                "start must be before end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }
}

/// Half-open interval overlap: touching endpoints do not conflict.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[derive(Debug, Serialize)]
pub struct VenueAvailability {
    pub venue_id: i32,
    pub is_available: bool,
    pub conflicting_events: Vec<ConflictingEvent>,
}

impl VenueAvailability {
    fn unavailable(venue_id: i32) -> Self {
        Self {
            venue_id,
            is_available: false,
            conflicting_events: Vec::new(),
        }
    }
}

/// Availability of one venue over a proposed range.
///
/// An unknown venue id yields "unavailable, no conflicts" rather than an
/// error: the caller renders a result for every venue it asked about.
pub async fn check_venue(
    pool: &PgPool,
    venue_id: i32,
    range: TimeRange,
    exclude_event_id: Option<Uuid>,
) -> Result<VenueAvailability, AppError> {
    if venue::find(venue_id).is_none() {
        return Ok(VenueAvailability::unavailable(venue_id));
    }

    let conflicts =
        events::conflicts_at_venue(pool, venue_id, range.start, range.end, exclude_event_id)
            .await?;

    Ok(VenueAvailability {
        venue_id,
        is_available: conflicts.is_empty(),
        conflicting_events: conflicts,
    })
}

/// Availability of every directory venue over the range, one result per venue
/// in directory order. Per-venue checks run concurrently and fail closed: a
/// check that errors reports its venue unavailable instead of aborting the
/// batch.
pub async fn check_all_venues(
    pool: &PgPool,
    range: TimeRange,
    exclude_event_id: Option<Uuid>,
) -> Vec<VenueAvailability> {
    let checks = venue::all().iter().map(|v| async move {
        match check_venue(pool, v.id, range, exclude_event_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!(venue_id = v.id, error = %e, "availability check failed, reporting venue unavailable");
                VenueAvailability::unavailable(v.id)
            }
        }
    });

    join_all(checks).await
}

/// Expand a date-only schedule to [local midnight, next local midnight) in
/// the stated IANA timezone, as UTC instants.
pub fn all_day_range(date: NaiveDate, tz_name: &str) -> Result<TimeRange, AppError> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| AppError::ValidationError(format!("unknown timezone: {}", tz_name)))?;

    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::ValidationError("date out of range".to_string()))?;

    TimeRange::new(local_midnight(date, tz)?, local_midnight(next, tz)?)
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::ValidationError(format!("midnight does not exist on {} in {}", date, tz))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::from_str(s).unwrap()
    }

    #[test]
    fn test_overlapping_ranges_conflict() {
        // b starts inside a
        assert!(overlaps(
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
            instant("2026-09-01T20:00:00Z"),
            instant("2026-09-01T23:00:00Z"),
        ));
        // b fully contains a
        assert!(overlaps(
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
            instant("2026-09-01T10:00:00Z"),
            instant("2026-09-02T10:00:00Z"),
        ));
    }

    #[test]
    fn test_touching_endpoints_do_not_conflict() {
        // a ends exactly when b starts
        assert!(!overlaps(
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T20:00:00Z"),
            instant("2026-09-01T20:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
        ));
        // and the mirror case
        assert!(!overlaps(
            instant("2026-09-01T20:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T20:00:00Z"),
        ));
    }

    #[test]
    fn test_disjoint_ranges_do_not_conflict() {
        assert!(!overlaps(
            instant("2026-09-01T08:00:00Z"),
            instant("2026-09-01T10:00:00Z"),
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T20:00:00Z"),
        ));
    }

    #[test]
    fn test_time_range_rejects_inverted_bounds() {
        let start = instant("2026-09-01T20:00:00Z");
        let end = instant("2026-09-01T18:00:00Z");
        assert!(TimeRange::new(start, end).is_err());
        assert!(TimeRange::new(start, start).is_err());
        assert!(TimeRange::new(end, start).is_ok());
    }

    #[test]
    fn test_all_day_range_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let range = all_day_range(date, "UTC").unwrap();
        assert_eq!(range.start, instant("2026-09-01T00:00:00Z"));
        assert_eq!(range.end, instant("2026-09-02T00:00:00Z"));
    }

    #[test]
    fn test_all_day_range_named_timezone() {
        // New York is UTC-5 in January
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let range = all_day_range(date, "America/New_York").unwrap();
        assert_eq!(range.start, instant("2026-01-15T05:00:00Z"));
        assert_eq!(range.end, instant("2026-01-16T05:00:00Z"));
    }

    #[test]
    fn test_all_day_range_spring_forward_is_23_hours() {
        // 2026-03-08 loses an hour in New York
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let range = all_day_range(date, "America/New_York").unwrap();
        assert_eq!((range.end - range.start).num_hours(), 23);
    }

    #[test]
    fn test_all_day_range_unknown_timezone() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(all_day_range(date, "Mars/Olympus_Mons").is_err());
    }

    #[tokio::test]
    async fn test_batch_fails_closed_per_venue() {
        // A lazy pool never connects, so every per-venue query errors out.
        // The batch must still return one fail-closed result per directory
        // venue, in directory order.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgres://localhost:1/unreachable")
            .unwrap();

        let range = TimeRange::new(
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
        )
        .unwrap();

        let results = check_all_venues(&pool, range, None).await;

        assert_eq!(results.len(), venue::all().len());
        for (result, expected) in results.iter().zip(venue::all()) {
            assert_eq!(result.venue_id, expected.id);
            assert!(!result.is_available);
            assert!(result.conflicting_events.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_venue_reports_unavailable_without_query() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgres://localhost:1/unreachable")
            .unwrap();

        let range = TimeRange::new(
            instant("2026-09-01T18:00:00Z"),
            instant("2026-09-01T22:00:00Z"),
        )
        .unwrap();

        // No such venue: renderable result, no error even though the
        // database is unreachable.
        let result = check_venue(&pool, 99, range, None).await.unwrap();
        assert_eq!(result.venue_id, 99);
        assert!(!result.is_available);
        assert!(result.conflicting_events.is_empty());
    }
}
