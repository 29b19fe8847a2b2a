use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::events;
use crate::models::booking::{self, Booking};

pub struct NewBooking {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub currency: String,
    pub application_fee_amount: Decimal,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

pub enum RecordOutcome {
    Created { booking: Booking, oversold: bool },
    /// A booking for this checkout session already exists (webhook redelivery).
    Duplicate,
}

const REFERENCE_ATTEMPTS: u32 = 3;
const REFERENCE_CONSTRAINT: &str = "bookings_booking_reference_key";

pub async fn find_by_session_id(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE stripe_session_id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Record a confirmed payment: booking insert and attendance increment commit
/// together or not at all. Redelivered callbacks hit the UNIQUE session-id
/// constraint and come back as `Duplicate` without a second booking.
pub async fn record_confirmed(
    pool: &PgPool,
    new: &NewBooking,
) -> Result<RecordOutcome, sqlx::Error> {
    for attempt in 1..=REFERENCE_ATTEMPTS {
        let reference = booking::generate_reference();
        match try_record(pool, new, &reference).await {
            Err(e) if is_reference_collision(&e) && attempt < REFERENCE_ATTEMPTS => {
                tracing::debug!(attempt, "booking reference collision, regenerating");
                continue;
            }
            other => return other,
        }
    }

    Err(sqlx::Error::Protocol(
        "exhausted booking reference attempts".into(),
    ))
}

async fn try_record(
    pool: &PgPool,
    new: &NewBooking,
    reference: &str,
) -> Result<RecordOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            booking_reference, event_id, user_id, quantity, total_amount,
            currency, application_fee_amount, stripe_session_id,
            stripe_payment_intent_id, status, contact_email, contact_phone
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'completed', $10, $11)
        ON CONFLICT (stripe_session_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(reference)
    .bind(new.event_id)
    .bind(new.user_id)
    .bind(new.quantity)
    .bind(new.total_amount)
    .bind(&new.currency)
    .bind(new.application_fee_amount)
    .bind(&new.stripe_session_id)
    .bind(&new.stripe_payment_intent_id)
    .bind(&new.contact_email)
    .bind(&new.contact_phone)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(booking) = inserted else {
        // Nothing was written; dropping the transaction rolls it back.
        return Ok(RecordOutcome::Duplicate);
    };

    let within_capacity =
        events::try_increment_attendance(&mut tx, new.event_id, new.quantity).await?;
    if !within_capacity {
        // The payment is captured; the booking must stand. The counter is
        // incremented anyway so the oversell is visible for reconciliation.
        events::force_increment_attendance(&mut tx, new.event_id, new.quantity).await?;
    }

    tx.commit().await?;

    Ok(RecordOutcome::Created {
        booking,
        oversold: !within_capacity,
    })
}

fn is_reference_collision(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.constraint() == Some(REFERENCE_CONSTRAINT),
        _ => false,
    }
}
